use glam::Vec2;
use painter_config::{is_valid_resolution, MAX_BRUSH_RADIUS, MIN_RESOLUTION};

use crate::constants::MAX_RADIUS_UV;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Resolution must be non-zero")]
    ZeroResolution,
    #[error("Invalid resolution {0}: must be a power of two >= {min}", min = MIN_RESOLUTION)]
    InvalidResolution(u32),
    #[error("Hardness {0} outside [0, 1]")]
    HardnessOutOfRange(f32),
    #[error("Brush radius {0} outside (0, {max}]", max = MAX_BRUSH_RADIUS)]
    InvalidRadius(f32),
    #[error("Texture-space radius {0} outside (0, {max}]", max = MAX_RADIUS_UV)]
    InvalidUvRadius(f32),
    #[error("Spacing {0} must not be negative")]
    NegativeSpacing(f32),
    #[error("Image has no pixels")]
    EmptyImage,
    #[error("Non-finite texture coordinate ({}, {})", .0.x, .0.y)]
    NonFiniteUv(Vec2),
}

/// Raster size for a canvas: anything non-zero
pub fn validate_canvas_resolution(resolution: u32) -> Result<u32, ValidationError> {
    if resolution == 0 {
        return Err(ValidationError::ZeroResolution);
    }
    Ok(resolution)
}

/// Working resolution chosen by the user: power of two, at least 32
pub fn validate_working_resolution(resolution: u32) -> Result<u32, ValidationError> {
    validate_canvas_resolution(resolution)?;
    if !is_valid_resolution(resolution) {
        return Err(ValidationError::InvalidResolution(resolution));
    }
    Ok(resolution)
}

pub fn validate_hardness(hardness: f32) -> Result<f32, ValidationError> {
    if !(0.0..=1.0).contains(&hardness) {
        return Err(ValidationError::HardnessOutOfRange(hardness));
    }
    Ok(hardness)
}

/// Brush radius in screen pixels
pub fn validate_radius(radius: f32) -> Result<f32, ValidationError> {
    if !(radius > 0.0 && radius <= MAX_BRUSH_RADIUS) {
        return Err(ValidationError::InvalidRadius(radius));
    }
    Ok(radius)
}

/// Brush radius as a fraction of the texture width
pub fn validate_radius_uv(radius_uv: f32) -> Result<f32, ValidationError> {
    if !(radius_uv > 0.0 && radius_uv <= MAX_RADIUS_UV) {
        return Err(ValidationError::InvalidUvRadius(radius_uv));
    }
    Ok(radius_uv)
}

pub fn validate_spacing(spacing: f32) -> Result<f32, ValidationError> {
    if spacing.is_nan() || spacing < 0.0 {
        return Err(ValidationError::NegativeSpacing(spacing));
    }
    Ok(spacing)
}

pub fn validate_uv(uv: Vec2) -> Result<Vec2, ValidationError> {
    if !uv.is_finite() {
        return Err(ValidationError::NonFiniteUv(uv));
    }
    Ok(uv)
}
