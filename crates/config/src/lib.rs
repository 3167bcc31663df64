//! Shared configuration for the material painter
//!
//! This crate provides the single source of truth for painter settings and
//! for the closed vocabulary the other crates agree on: parameter semantics,
//! paint/projection/fill modes and mask interpretation.
//!
//! Settings are plain serde documents. They can be loaded from JSON and
//! overridden from the environment (`PAINTER_RESOLUTION`, `PAINTER_PAINT_MODE`).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

mod patterns;

pub use patterns::{default_property_patterns, PropertyPattern};

/// Default working resolution for parameter canvases
pub const DEFAULT_RESOLUTION: u32 = 1024;

/// Smallest accepted working resolution
pub const MIN_RESOLUTION: u32 = 32;

/// Resolutions offered by the resolution picker
pub const PRESET_RESOLUTIONS: [u32; 3] = [1024, 2048, 4096];

/// Default brush radius in screen pixels
pub const DEFAULT_BRUSH_RADIUS: f32 = 20.0;

/// Largest brush radius in screen pixels
pub const MAX_BRUSH_RADIUS: f32 = 1024.0;

/// Physical-material role of a painted texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParameterSemantic {
    BaseColor,
    Roughness,
    Metallic,
    Occlusion,
    Emission,
    Opacity,
}

impl ParameterSemantic {
    /// Every semantic, in canonical order
    pub const ALL: [ParameterSemantic; 6] = [
        ParameterSemantic::BaseColor,
        ParameterSemantic::Roughness,
        ParameterSemantic::Metallic,
        ParameterSemantic::Occlusion,
        ParameterSemantic::Emission,
        ParameterSemantic::Opacity,
    ];

    /// Color semantics are stored and exported with sRGB encoding
    pub fn is_color(self) -> bool {
        matches!(self, ParameterSemantic::BaseColor | ParameterSemantic::Emission)
    }

    /// Short lowercase name used in file names
    pub fn file_suffix(self) -> &'static str {
        match self {
            ParameterSemantic::BaseColor => "basecolor",
            ParameterSemantic::Roughness => "roughness",
            ParameterSemantic::Metallic => "metallic",
            ParameterSemantic::Occlusion => "occlusion",
            ParameterSemantic::Emission => "emission",
            ParameterSemantic::Opacity => "opacity",
        }
    }
}

impl std::fmt::Display for ParameterSemantic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ParameterSemantic::BaseColor => "Base Color",
            ParameterSemantic::Roughness => "Roughness",
            ParameterSemantic::Metallic => "Metallic",
            ParameterSemantic::Occlusion => "Occlusion",
            ParameterSemantic::Emission => "Emission",
            ParameterSemantic::Opacity => "Opacity",
        };
        f.write_str(name)
    }
}

/// What a pointer-down does on the target surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaintMode {
    #[default]
    Brush,
    Fill,
}

/// How a brush radius given in pixels is turned into texture space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionMode {
    /// Radius stays constant in screen pixels regardless of distance or UV density
    #[default]
    ScreenProjected,
    /// Radius is relative to the texture resolution
    NormalAligned,
}

/// Region a fill applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillTarget {
    #[default]
    EntireObject,
    /// UV-island fill. Not implemented; falls back to EntireObject.
    Element,
}

/// How an imported brush mask image is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaskMode {
    /// Coverage = luminance * alpha; the brush color is written
    #[default]
    Grayscale,
    /// The mask's own RGB is written; its alpha is scaled by brush opacity
    Color,
}

/// Texel addressing for stamps that cross the raster edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AddressMode {
    /// Pixels outside the raster are dropped
    #[default]
    Clamp,
    /// Pixels outside the raster wrap around to the opposite edge
    Wrap,
}

/// Brush settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    /// Linear RGBA; alpha is the stroke opacity
    pub color: [f32; 4],
    /// Radius in screen pixels
    pub radius_px: f32,
    /// 0.0 = fully soft, 1.0 = hard disk
    pub hardness: f32,
    /// Minimum world-space distance between stamps (0 = every event)
    pub spacing: f32,
    pub mask_mode: MaskMode,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            radius_px: DEFAULT_BRUSH_RADIUS,
            hardness: 0.8,
            spacing: 0.0,
            mask_mode: MaskMode::Grayscale,
        }
    }
}

/// Fill settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FillConfig {
    pub color: [f32; 4],
    pub target: FillTarget,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            target: FillTarget::EntireObject,
        }
    }
}

/// Complete painter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PainterConfig {
    /// Square working resolution of every parameter canvas
    pub resolution: u32,
    pub paint_mode: PaintMode,
    pub projection_mode: ProjectionMode,
    pub address_mode: AddressMode,
    pub brush: BrushConfig,
    pub fill: FillConfig,
    /// Ordered name-pattern table used to resolve shader properties
    pub property_patterns: Vec<PropertyPattern>,
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            paint_mode: PaintMode::Brush,
            projection_mode: ProjectionMode::ScreenProjected,
            address_mode: AddressMode::Clamp,
            brush: BrushConfig::default(),
            fill: FillConfig::default(),
            property_patterns: default_property_patterns(),
        }
    }
}

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid resolution {0}: must be a power of two >= {min}", min = MIN_RESOLUTION)]
    InvalidResolution(u32),

    #[error("Invalid brush setting: {0}")]
    InvalidBrush(String),
}

/// Check a working resolution: a power of two no smaller than [`MIN_RESOLUTION`]
pub fn is_valid_resolution(resolution: u32) -> bool {
    resolution >= MIN_RESOLUTION && resolution.is_power_of_two()
}

impl PainterConfig {
    /// Parse a config document, then validate it
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading painter config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Apply `PAINTER_*` environment overrides
    ///
    /// Unparseable values are ignored with a warning.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var("PAINTER_RESOLUTION") {
            match value.parse::<u32>() {
                Ok(res) if is_valid_resolution(res) => self.resolution = res,
                _ => warn!("Ignoring PAINTER_RESOLUTION={value:?}"),
            }
        }
        match std::env::var("PAINTER_PAINT_MODE").as_deref() {
            Ok("brush") => self.paint_mode = PaintMode::Brush,
            Ok("fill") => self.paint_mode = PaintMode::Fill,
            Ok(other) => warn!("Ignoring PAINTER_PAINT_MODE={other:?}"),
            Err(_) => {}
        }
        self
    }

    /// Validate ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_resolution(self.resolution) {
            return Err(ConfigError::InvalidResolution(self.resolution));
        }
        if !(0.0..=1.0).contains(&self.brush.hardness) {
            return Err(ConfigError::InvalidBrush(format!(
                "hardness {} outside [0, 1]",
                self.brush.hardness
            )));
        }
        if !(self.brush.radius_px > 0.0 && self.brush.radius_px <= MAX_BRUSH_RADIUS) {
            return Err(ConfigError::InvalidBrush(format!(
                "radius {} outside (0, {MAX_BRUSH_RADIUS}]",
                self.brush.radius_px
            )));
        }
        if self.brush.spacing < 0.0 {
            return Err(ConfigError::InvalidBrush(format!(
                "spacing {} must not be negative",
                self.brush.spacing
            )));
        }
        Ok(())
    }
}
