//! Error types for the painting core

use std::collections::BTreeMap;
use std::path::PathBuf;

use painter_config::ConfigError;
use thiserror::Error;

use crate::types::ParameterSemantic;
use crate::validation::ValidationError;

/// Failures of painting operations
///
/// The first group are input errors the user has to fix; the second are
/// resource errors where the operation is simply skipped.
#[derive(Debug, Error)]
pub enum PaintError {
    #[error("No reference material selected")]
    NoReferenceMaterial,
    #[error("Material '{0}' exposes no paintable texture properties")]
    NoTextureProperties(String),
    #[error("Image '{name}' could not be read: {source}")]
    UnreadableImage {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("No paint target selected")]
    NoActiveTarget,
    #[error("Layer index {index} out of range (layer count {count})")]
    LayerOutOfRange { index: usize, count: usize },
    #[error("Layer '{layer}' has no {semantic} canvas")]
    MissingSemantic { layer: String, semantic: ParameterSemantic },

    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl PaintError {
    /// Input errors abort with a blocking message; the rest are warnings
    ///
    /// A missing reference material only blocks export, which reports it
    /// as [`ExportError::MissingReferenceMaterial`]; elsewhere it is a no-op.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PaintError::NoTextureProperties(_)
                | PaintError::UnreadableImage { .. }
                | PaintError::Config(_)
                | PaintError::Validation(_)
                | PaintError::Export(_)
        )
    }
}

/// Failures while baking textures
///
/// Export is not transactional: `written` lists files produced before the
/// failure, which are left on disk, and `textures` keeps the property
/// bindings made for them.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No reference material to export against")]
    MissingReferenceMaterial,
    #[error("Layer '{0}' has no canvases to export")]
    EmptyLayer(String),
    #[error("Failed to create export directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write {semantic} texture to {path}: {source}")]
    Write {
        semantic: ParameterSemantic,
        path: PathBuf,
        written: Vec<PathBuf>,
        /// Shader property name to written file
        textures: BTreeMap<String, PathBuf>,
        #[source]
        source: image::ImageError,
    },
}

impl ExportError {
    /// Files already written when the export stopped
    pub fn written(&self) -> &[PathBuf] {
        match self {
            ExportError::Write { written, .. } => written,
            _ => &[],
        }
    }

    /// Property bindings already made when the export stopped
    pub fn bound_textures(&self) -> Option<&BTreeMap<String, PathBuf>> {
        match self {
            ExportError::Write { textures, .. } => Some(textures),
            _ => None,
        }
    }
}
