//! Baking canvases to still images and a new material
//!
//! Export is not transactional. Files are written in property order and
//! the first failure stops the batch; everything written before it stays
//! on disk and is listed in the error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use painter_ipc::ExportedMaterialInfo;
use tracing::{info, warn};

use crate::canvas::ParameterCanvas;
use crate::error::ExportError;
use crate::image_io::{surface_to_rgba8, ColorEncoding, ExportLayout};
use crate::layer::MaterialLayer;
use crate::material::{ReferenceMaterial, ShaderTextureProperty};
use crate::stack::LayerStack;
use crate::types::ParameterSemantic;

/// Label used for merged exports
pub const MERGED_LABEL: &str = "Merged";

pub struct MaterialExporter;

impl MaterialExporter {
    /// Write one canvas as an 8-bit image, sRGB for color semantics
    pub fn export_parameter(canvas: &ParameterCanvas, path: &Path) -> Result<(), image::ImageError> {
        canvas
            .to_still_image(canvas.semantic().is_color())
            .save(path)?;
        info!("exported {} to {}", canvas.semantic(), path.display());
        Ok(())
    }

    /// Export every bound canvas of `layer` and describe the new material
    pub fn export_layer_as_material(
        layer: &MaterialLayer,
        properties: &[ShaderTextureProperty],
        material: Option<&ReferenceMaterial>,
        directory: &Path,
    ) -> Result<ExportedMaterialInfo, ExportError> {
        let material = material.ok_or(ExportError::MissingReferenceMaterial)?;
        let sources: Vec<_> = properties
            .iter()
            .filter_map(|p| layer.canvas(p.semantic).map(|c| (p, c.to_still_image(p.semantic.is_color()))))
            .collect();
        if sources.is_empty() {
            return Err(ExportError::EmptyLayer(layer.name().to_string()));
        }
        write_material(material, layer.name(), directory, sources)
    }

    /// Export the composite of all visible layers and describe the new material
    pub fn export_merged_material(
        stack: &LayerStack,
        resolution: u32,
        properties: &[ShaderTextureProperty],
        material: Option<&ReferenceMaterial>,
        directory: &Path,
    ) -> Result<ExportedMaterialInfo, ExportError> {
        let material = material.ok_or(ExportError::MissingReferenceMaterial)?;
        let sources = properties
            .iter()
            .map(|p| (p, composed_image(stack, p.semantic, resolution)))
            .collect();
        write_material(material, MERGED_LABEL, directory, sources)
    }

    /// File name for one exported texture
    pub fn texture_file_name(material: &str, label: &str, semantic: ParameterSemantic) -> String {
        format!("{}_{}_{}.png", sanitize(material), sanitize(label), semantic.file_suffix())
    }
}

fn composed_image(stack: &LayerStack, semantic: ParameterSemantic, resolution: u32) -> RgbaImage {
    surface_to_rgba8(
        &stack.compose(semantic, resolution),
        ColorEncoding::for_color(semantic.is_color()),
        ExportLayout::for_semantic(semantic),
    )
}

fn write_material(
    material: &ReferenceMaterial,
    label: &str,
    directory: &Path,
    sources: Vec<(&ShaderTextureProperty, RgbaImage)>,
) -> Result<ExportedMaterialInfo, ExportError> {
    std::fs::create_dir_all(directory).map_err(|source| ExportError::CreateDir {
        path: directory.to_path_buf(),
        source,
    })?;

    let mut written: Vec<PathBuf> = Vec::new();
    let mut textures = BTreeMap::new();
    for (property, image) in sources {
        let path = directory.join(MaterialExporter::texture_file_name(&material.name, label, property.semantic));
        if let Err(source) = image.save(&path) {
            warn!(
                "export of '{}' stopped at {}: {} file(s) already written",
                material.name,
                property.semantic,
                written.len()
            );
            return Err(ExportError::Write {
                semantic: property.semantic,
                path,
                written,
                textures,
                source,
            });
        }
        info!("exported {} to {}", property.semantic, path.display());
        written.push(path.clone());
        textures.insert(property.property_name.clone(), path);
    }

    Ok(ExportedMaterialInfo {
        name: format!("{}_{}", material.name, label),
        shader: material.shader.clone(),
        textures,
    })
}

/// Keep file names portable
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
