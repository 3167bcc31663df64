//! Commands sent from the UI into the painting session.

use std::path::PathBuf;

use painter_config::{FillTarget, MaskMode, PaintMode, ParameterSemantic, ProjectionMode};
use serde::{Deserialize, Serialize};

/// Shader description of the material being painted.
///
/// `texture_properties` lists the shader's declared texture slots in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReferenceMaterialInfo {
    pub name: String,
    pub shader: String,
    pub texture_properties: Vec<String>,
}

/// Discrete user intents for the painting session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PainterCommand {
    /// Choose the material whose shader decides which canvases exist
    SetReferenceMaterial(ReferenceMaterialInfo),
    /// Change the working resolution of every canvas
    SetResolution { resolution: u32 },

    SetPaintMode { mode: PaintMode },
    SetProjectionMode { mode: ProjectionMode },

    /// Brush color (linear RGBA, alpha = stroke opacity)
    SetBrushColor { color: [f32; 4] },
    /// Brush radius in screen pixels
    SetBrushRadius { radius_px: f32 },
    SetBrushHardness { hardness: f32 },
    SetBrushSpacing { spacing: f32 },
    SetMaskMode { mode: MaskMode },
    /// Go back to the procedural round brush
    ClearBrushMask,

    SetFillColor { color: [f32; 4] },
    SetFillTarget { target: FillTarget },

    AddLayer { name: Option<String> },
    RemoveLayer { index: usize },
    MoveLayer { from: usize, to: usize },
    RenameLayer { index: usize, name: String },
    SetLayerVisible { index: usize, visible: bool },

    /// Make (layer, semantic) the single paint target
    SelectTarget {
        layer: usize,
        semantic: ParameterSemantic,
    },
    /// Leave paint mode
    ClearTarget,

    /// Stamp the brush directly at a UV position on the target canvas
    Stamp {
        uv: [f32; 2],
        /// Overrides the resolution-relative radius when set
        radius_uv: Option<f32>,
    },
    /// Fill the target canvas with the fill color
    Fill,
    /// Reset the target canvas to transparent
    ClearCanvas,

    ExportLayer { index: usize, directory: PathBuf },
    ExportMerged { directory: PathBuf },
}
