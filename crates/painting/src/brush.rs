//! Brush settings and stroke spacing
//!
//! [`BrushEngine`] decides which pointer events of a stroke produce a
//! stamp. The first event of a stroke always stamps; later events stamp
//! only once the hit point has moved more than `spacing` (world units)
//! from the previous stamp.

use glam::Vec3;
use painter_config::BrushConfig;
use tracing::debug;

use crate::mask::{BrushMask, MaskCache};
use crate::types::MaskMode;
use crate::validation::{validate_hardness, validate_radius, validate_spacing, ValidationError};

/// Current brush parameters
#[derive(Debug, Clone)]
pub struct BrushSettings {
    /// Linear RGBA; alpha is the stroke opacity
    pub color: [f32; 4],
    /// Radius in screen pixels
    radius_px: f32,
    hardness: f32,
    spacing: f32,
    pub mask_mode: MaskMode,
    mask: Option<MaskCache>,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self::from_config(&BrushConfig::default())
    }
}

impl BrushSettings {
    /// Settings from a config section; out-of-range values are clamped
    pub fn from_config(config: &BrushConfig) -> Self {
        Self {
            color: config.color,
            radius_px: if config.radius_px > 0.0 { config.radius_px } else { 1.0 },
            hardness: config.hardness.clamp(0.0, 1.0),
            spacing: config.spacing.max(0.0),
            mask_mode: config.mask_mode,
            mask: None,
        }
    }

    #[inline]
    pub fn radius_px(&self) -> f32 {
        self.radius_px
    }

    #[inline]
    pub fn hardness(&self) -> f32 {
        self.hardness
    }

    #[inline]
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn set_radius_px(&mut self, radius_px: f32) -> Result<(), ValidationError> {
        self.radius_px = validate_radius(radius_px)?;
        Ok(())
    }

    pub fn set_hardness(&mut self, hardness: f32) -> Result<(), ValidationError> {
        self.hardness = validate_hardness(hardness)?;
        Ok(())
    }

    pub fn set_spacing(&mut self, spacing: f32) -> Result<(), ValidationError> {
        self.spacing = validate_spacing(spacing)?;
        Ok(())
    }

    pub fn set_mask(&mut self, mask: Option<MaskCache>) {
        self.mask = mask;
    }

    pub fn has_mask(&self) -> bool {
        self.mask.is_some()
    }

    /// Mask grid for a stamp of `radius_px` texture pixels, if a mask image is set
    pub fn mask_for_radius(&mut self, radius_px: f32) -> Option<&BrushMask> {
        let mode = self.mask_mode;
        self.mask.as_mut().map(|cache| cache.mask_for_radius(radius_px, mode))
    }
}

/// Spacing state of the stroke in progress
#[derive(Debug, Clone, Default)]
pub struct BrushEngine {
    spacing: f32,
    /// Position of the last stamp; `None` before the first stamp of a stroke
    last_stamp: Option<Vec3>,
}

impl BrushEngine {
    pub fn new(spacing: f32) -> Self {
        Self {
            spacing: spacing.max(0.0),
            last_stamp: None,
        }
    }

    pub fn set_spacing(&mut self, spacing: f32) {
        self.spacing = spacing.max(0.0);
    }

    /// Start a stroke; the next event stamps unconditionally
    pub fn begin_stroke(&mut self) {
        self.last_stamp = None;
    }

    /// Feed one stroke event; returns true if it should stamp
    pub fn stroke_to(&mut self, position: Vec3) -> bool {
        let stamp = match self.last_stamp {
            None => true,
            Some(_) if self.spacing <= 0.0 => true,
            Some(last) => last.distance(position) > self.spacing,
        };
        if stamp {
            self.last_stamp = Some(position);
        } else {
            debug!("BrushEngine::stroke_to: within spacing {:.4}, skipped", self.spacing);
        }
        stamp
    }

    pub fn end_stroke(&mut self) {
        self.last_stamp = None;
    }

    pub fn in_stroke(&self) -> bool {
        self.last_stamp.is_some()
    }
}
