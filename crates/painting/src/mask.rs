//! Brush coverage masks
//!
//! A [`BrushMask`] is a square grid of coverage values in [0, 1], optionally
//! carrying its own RGB (color-mode masks). Masks are either procedural
//! (radial falloff from radius and hardness) or resampled from an imported
//! image.
//!
//! Imported masks go through a fallback chain so that an unreadable asset
//! never aborts painting:
//! 1. readable pixels
//! 2. raw encoded bytes decoded independently
//! 3. a synthetic round alpha mask

use tracing::{debug, warn};

use crate::color::luminance;
use crate::constants::{FALLBACK_MASK_SIZE, MAX_MASK_SIZE};
use crate::image_io::{decode_image, ColorEncoding, SourceImage};
use crate::surface::CpuSurface;
use crate::types::MaskMode;

/// Hardness of the synthetic fallback mask
const FALLBACK_MASK_HARDNESS: f32 = 0.5;

/// Radial coverage at `distance` from the brush center
///
/// Full coverage inside `radius * hardness`, zero at and beyond `radius`,
/// linear in between.
#[inline]
pub fn radial_falloff(distance: f32, radius: f32, hardness: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    let r_in = radius * hardness.clamp(0.0, 1.0);
    if distance <= r_in {
        1.0
    } else if distance >= radius {
        0.0
    } else {
        (radius - distance) / (radius - r_in)
    }
}

/// Square coverage grid for one stamp
#[derive(Debug, Clone, PartialEq)]
pub struct BrushMask {
    size: u32,
    coverage: Vec<f32>,
    /// Per-cell RGB for color-mode masks
    tint: Option<Vec<[f32; 3]>>,
}

impl BrushMask {
    /// Build a mask for a brush of `radius_px`
    ///
    /// Uses the imported image when given, otherwise the procedural falloff.
    pub fn get_mask(radius_px: f32, hardness: f32, imported: Option<(&SourceImage, MaskMode)>) -> Self {
        let size = Self::size_for_radius(radius_px);
        match imported {
            Some((image, mode)) => Self::from_image(image, size, mode),
            None => Self::procedural(radius_px, hardness),
        }
    }

    /// Grid edge length covering a brush of `radius_px`, at most [`MAX_MASK_SIZE`]
    pub fn size_for_radius(radius_px: f32) -> u32 {
        ((radius_px * 2.0).ceil().min(MAX_MASK_SIZE as f32) as u32).max(1)
    }

    /// Procedural round mask
    pub fn procedural(radius_px: f32, hardness: f32) -> Self {
        let size = Self::size_for_radius(radius_px);
        let center = size as f32 / 2.0;
        let mut coverage = Vec::with_capacity((size * size) as usize);
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 + 0.5 - center;
                let dy = y as f32 + 0.5 - center;
                coverage.push(radial_falloff((dx * dx + dy * dy).sqrt(), radius_px, hardness));
            }
        }
        Self { size, coverage, tint: None }
    }

    /// Resample an imported image to `size` x `size` and read it as a mask
    pub fn from_image(image: &SourceImage, size: u32, mode: MaskMode) -> Self {
        let size = size.max(1);
        let resized = image.resampled(size, size);
        let coverage = resized
            .pixels()
            .iter()
            .map(|p| match mode {
                MaskMode::Grayscale => (luminance([p[0], p[1], p[2]]) * p[3]).clamp(0.0, 1.0),
                MaskMode::Color => p[3].clamp(0.0, 1.0),
            })
            .collect();
        let tint = match mode {
            MaskMode::Grayscale => None,
            MaskMode::Color => Some(resized.pixels().iter().map(|p| [p[0], p[1], p[2]]).collect()),
        };
        Self { size, coverage, tint }
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Coverage at grid cell (x, y); 0 outside the grid
    #[inline]
    pub fn coverage_at(&self, x: u32, y: u32) -> f32 {
        if x >= self.size || y >= self.size {
            return 0.0;
        }
        self.coverage[(y * self.size + x) as usize]
    }

    /// Mask color at grid cell (x, y), color-mode masks only
    #[inline]
    pub fn tint_at(&self, x: u32, y: u32) -> Option<[f32; 3]> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.tint.as_ref().map(|t| t[(y * self.size + x) as usize])
    }

    pub fn is_color(&self) -> bool {
        self.tint.is_some()
    }

    /// True if every cell has zero coverage
    pub fn is_empty(&self) -> bool {
        self.coverage.iter().all(|&c| c <= 0.0)
    }
}

/// Where a resolved mask image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskOrigin {
    Pixels,
    DecodedBytes,
    Synthetic,
}

/// Mask image after the fallback chain
#[derive(Debug, Clone)]
pub struct ResolvedMask {
    pub image: SourceImage,
    pub origin: MaskOrigin,
}

impl ResolvedMask {
    /// Whether a fallback was needed
    pub fn is_degraded(&self) -> bool {
        self.origin != MaskOrigin::Pixels
    }
}

/// A brush mask as handed over by the host
///
/// `pixels` is `None` when the host could not read the asset's pixels
/// directly; `encoded` carries the raw file bytes when available.
#[derive(Debug, Clone, Default)]
pub struct MaskAsset {
    pub name: String,
    pub pixels: Option<SourceImage>,
    pub encoded: Option<Vec<u8>>,
}

impl MaskAsset {
    pub fn from_pixels(name: impl Into<String>, image: SourceImage) -> Self {
        Self {
            name: name.into(),
            pixels: Some(image),
            encoded: None,
        }
    }

    pub fn from_encoded(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            pixels: None,
            encoded: Some(bytes),
        }
    }

    /// Resolve to a usable image; never fails
    pub fn resolve(&self) -> ResolvedMask {
        if let Some(image) = self.pixels.as_ref().filter(|i| i.pixel_count() > 0) {
            return ResolvedMask {
                image: image.clone(),
                origin: MaskOrigin::Pixels,
            };
        }

        if let Some(bytes) = &self.encoded {
            match decode_image(bytes, ColorEncoding::Linear) {
                Ok(image) if image.pixel_count() > 0 => {
                    debug!("mask '{}' read from encoded bytes", self.name);
                    return ResolvedMask {
                        image,
                        origin: MaskOrigin::DecodedBytes,
                    };
                }
                Ok(_) => warn!("mask '{}' decoded to an empty image", self.name),
                Err(err) => warn!("mask '{}' could not be decoded: {}", self.name, err),
            }
        }

        warn!("mask '{}' is unreadable, using synthetic round mask", self.name);
        ResolvedMask {
            image: synthetic_mask_image(),
            origin: MaskOrigin::Synthetic,
        }
    }
}

/// White image with a round soft alpha falloff
pub fn synthetic_mask_image() -> SourceImage {
    let size = FALLBACK_MASK_SIZE;
    let radius = size as f32 / 2.0;
    let mut image = CpuSurface::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - radius;
            let dy = y as f32 + 0.5 - radius;
            let alpha = radial_falloff((dx * dx + dy * dy).sqrt(), radius, FALLBACK_MASK_HARDNESS);
            image.set_pixel(x, y, [1.0, 1.0, 1.0, alpha]);
        }
    }
    image
}

/// Imported mask plus the last resampled grid
///
/// Strokes stamp at a constant pixel size most of the time, so the grid is
/// rebuilt only when the size or mode changes.
#[derive(Debug, Clone)]
pub struct MaskCache {
    image: SourceImage,
    cached: Option<(u32, MaskMode, BrushMask)>,
}

impl MaskCache {
    pub fn new(image: SourceImage) -> Self {
        Self { image, cached: None }
    }

    pub fn image(&self) -> &SourceImage {
        &self.image
    }

    /// Grid for a brush of `radius_px`, resampled on demand
    pub fn mask_for_radius(&mut self, radius_px: f32, mode: MaskMode) -> &BrushMask {
        let size = BrushMask::size_for_radius(radius_px);
        let stale = !matches!(&self.cached, Some((s, m, _)) if *s == size && *m == mode);
        if stale {
            self.cached = None;
        }
        let image = &self.image;
        let (_, _, mask) = self
            .cached
            .get_or_insert_with(|| (size, mode, BrushMask::from_image(image, size, mode)));
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radial_falloff_hard() {
        assert_eq!(radial_falloff(0.0, 10.0, 1.0), 1.0);
        assert_eq!(radial_falloff(9.99, 10.0, 1.0), 1.0);
        assert_eq!(radial_falloff(10.0, 10.0, 1.0), 1.0);
        assert_eq!(radial_falloff(10.01, 10.0, 1.0), 0.0);
    }

    #[test]
    fn test_radial_falloff_soft() {
        assert_eq!(radial_falloff(0.0, 10.0, 0.0), 1.0);
        assert!((radial_falloff(5.0, 10.0, 0.0) - 0.5).abs() < 1e-6);
        assert_eq!(radial_falloff(10.0, 10.0, 0.0), 0.0);
    }

    #[test]
    fn test_radial_falloff_medium() {
        // Inner radius 5, outer 10
        assert_eq!(radial_falloff(4.0, 10.0, 0.5), 1.0);
        assert!((radial_falloff(7.5, 10.0, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_procedural_mask_shape() {
        let mask = BrushMask::procedural(4.0, 1.0);
        assert_eq!(mask.size(), 8);
        assert_eq!(mask.coverage_at(4, 4), 1.0);
        // Corner cell center is ~4.95 px from the center
        assert_eq!(mask.coverage_at(0, 0), 0.0);
        assert_eq!(mask.coverage_at(99, 0), 0.0);
        assert!(!mask.is_color());
    }

    #[test]
    fn test_grayscale_mask_uses_luminance_times_alpha() {
        let mut image = CpuSurface::new(2, 2);
        image.clear([1.0, 1.0, 1.0, 0.5]);
        let mask = BrushMask::from_image(&image, 2, MaskMode::Grayscale);
        assert!((mask.coverage_at(1, 1) - 0.5).abs() < 1e-6);

        image.clear([0.0, 0.0, 0.0, 1.0]);
        let mask = BrushMask::from_image(&image, 2, MaskMode::Grayscale);
        assert!(mask.is_empty());
    }

    #[test]
    fn test_color_mask_keeps_rgb() {
        let mut image = CpuSurface::new(1, 1);
        image.clear([1.0, 0.0, 0.0, 0.25]);
        let mask = BrushMask::from_image(&image, 4, MaskMode::Color);
        assert_eq!(mask.size(), 4);
        assert_eq!(mask.tint_at(2, 2), Some([1.0, 0.0, 0.0]));
        assert!((mask.coverage_at(2, 2) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_get_mask_prefers_imported() {
        let mut image = CpuSurface::new(4, 4);
        image.clear([1.0, 1.0, 1.0, 1.0]);
        let mask = BrushMask::get_mask(2.0, 0.0, Some((&image, MaskMode::Grayscale)));
        assert_eq!(mask.size(), 4);
        // Imported square mask covers the corners, the round one would not
        assert!((mask.coverage_at(0, 0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_resolve_prefers_pixels() {
        let asset = MaskAsset::from_pixels("dots", CpuSurface::new(2, 2));
        let resolved = asset.resolve();
        assert_eq!(resolved.origin, MaskOrigin::Pixels);
        assert!(!resolved.is_degraded());
    }

    #[test]
    fn test_resolve_falls_back_to_synthetic() {
        let asset = MaskAsset::from_encoded("broken", b"garbage".to_vec());
        let resolved = asset.resolve();
        assert_eq!(resolved.origin, MaskOrigin::Synthetic);
        assert_eq!(resolved.image.width, FALLBACK_MASK_SIZE);
        // Center opaque, corner transparent
        let c = FALLBACK_MASK_SIZE / 2;
        assert_eq!(resolved.image.get_pixel(c, c).unwrap()[3], 1.0);
        assert_eq!(resolved.image.get_pixel(0, 0).unwrap()[3], 0.0);
    }

    #[test]
    fn test_resolve_with_nothing_is_synthetic() {
        let resolved = MaskAsset::default().resolve();
        assert_eq!(resolved.origin, MaskOrigin::Synthetic);
    }

    #[test]
    fn test_mask_cache_reuses_grid() {
        let mut image = CpuSurface::new(8, 8);
        image.clear([1.0; 4]);
        let mut cache = MaskCache::new(image);
        let first = cache.mask_for_radius(3.0, MaskMode::Grayscale).clone();
        let second = cache.mask_for_radius(3.0, MaskMode::Grayscale).clone();
        assert_eq!(first, second);
        assert_eq!(cache.mask_for_radius(5.0, MaskMode::Grayscale).size(), 10);
    }

    #[test]
    fn test_mask_size_saturates() {
        assert_eq!(BrushMask::size_for_radius(0.0), 1);
        assert_eq!(BrushMask::size_for_radius(2.5), 5);
        assert_eq!(BrushMask::size_for_radius(1e12), MAX_MASK_SIZE);
        assert_eq!(BrushMask::size_for_radius(f32::INFINITY), MAX_MASK_SIZE);
    }
}
