//! Messages from the painting session back to the UI.

use std::collections::BTreeMap;
use std::path::PathBuf;

use painter_config::ParameterSemantic;
use serde::{Deserialize, Serialize};

/// How loudly a message must be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Informational, e.g. a fallback was used
    Info,
    /// The request was ignored
    Warning,
    /// The request was rejected and needs user action
    Blocking,
}

/// User-visible message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn blocking(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Blocking,
            message: message.into(),
        }
    }
}

/// Summary of one layer for the layer list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub name: String,
    pub visible: bool,
    pub active: bool,
    pub semantics: Vec<ParameterSemantic>,
}

/// Material produced by an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedMaterialInfo {
    pub name: String,
    pub shader: String,
    /// Shader property name -> written image
    pub textures: BTreeMap<String, PathBuf>,
}

/// Messages from the painting session to the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PainterEvent {
    Notification(Notification),
    /// Layer list changed (add/remove/reorder/rename/visibility)
    LayersChanged { layers: Vec<LayerInfo> },
    /// Paint target changed; `None` means the session is idle
    TargetChanged {
        target: Option<(usize, ParameterSemantic)>,
    },
    /// Pixels of the given semantic changed and the preview should refresh
    CanvasChanged { semantic: ParameterSemantic },
    Exported(ExportedMaterialInfo),
}
