//! Working texture for one (layer, semantic) pair
//!
//! The raster is allocated lazily on first use and recreated whenever the
//! configured resolution changes. An imported base texture is remembered so
//! the canvas can be re-seeded after such a recreate.

use glam::Vec2;
use image::RgbaImage;
use tracing::{debug, info};

use crate::channel::ChannelPolicy;
use crate::image_io::{surface_to_rgba8, ColorEncoding, ExportLayout, SourceImage};
use crate::mask::BrushMask;
use crate::surface::CpuSurface;
use crate::tiles::{Stamp, TileCoord, TiledSurface};
use crate::types::{AddressMode, ChannelMask, ParameterSemantic, PixelRect};
use crate::validation::{validate_canvas_resolution, validate_uv, ValidationError};

/// Pixels changed since the last readback
#[derive(Debug, Clone, PartialEq)]
pub struct DirtyRegion {
    /// (x, y, width, height)
    pub rect: PixelRect,
    /// Row-major, `width * height` entries
    pub pixels: Vec<[f32; 4]>,
}

#[derive(Debug, Clone)]
pub struct ParameterCanvas {
    semantic: ParameterSemantic,
    /// Configured square resolution; the raster follows on the next access
    resolution: u32,
    address_mode: AddressMode,
    surface: Option<TiledSurface>,
    base_texture: Option<SourceImage>,
    is_modified: bool,
}

impl ParameterCanvas {
    /// Create an unallocated canvas
    pub fn new(semantic: ParameterSemantic, resolution: u32) -> Result<Self, ValidationError> {
        Ok(Self {
            semantic,
            resolution: validate_canvas_resolution(resolution)?,
            address_mode: AddressMode::Clamp,
            surface: None,
            base_texture: None,
            is_modified: false,
        })
    }

    #[inline]
    pub fn semantic(&self) -> ParameterSemantic {
        self.semantic
    }

    #[inline]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    #[inline]
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.surface.is_some()
    }

    pub fn base_texture(&self) -> Option<&SourceImage> {
        self.base_texture.as_ref()
    }

    /// Channels strokes on this canvas may write
    pub fn channel_mask(&self) -> ChannelMask {
        ChannelPolicy::channel_mask(self.semantic)
    }

    /// Change the configured resolution; the raster is rebuilt lazily
    pub fn set_resolution(&mut self, resolution: u32) -> Result<(), ValidationError> {
        self.resolution = validate_canvas_resolution(resolution)?;
        Ok(())
    }

    pub fn set_address_mode(&mut self, mode: AddressMode) {
        self.address_mode = mode;
        if let Some(surface) = &mut self.surface {
            surface.set_address_mode(mode);
        }
    }

    /// Allocate the raster if missing or of the wrong size
    ///
    /// A (re)created raster starts transparent black and is then re-seeded
    /// from the base texture, if any.
    pub fn ensure_initialized(&mut self) -> &mut TiledSurface {
        let stale = self
            .surface
            .as_ref()
            .is_some_and(|s| s.surface().width != self.resolution);
        if stale {
            debug!("{} canvas: resolution changed, recreating", self.semantic);
            self.surface = None;
        }

        let resolution = self.resolution;
        let mode = self.address_mode;
        let semantic = self.semantic;
        let base = self.base_texture.as_ref();
        self.surface.get_or_insert_with(|| {
            info!("{} canvas: allocating {}x{}", semantic, resolution, resolution);
            let mut surface =
                TiledSurface::with_default_tile_size(resolution, resolution).with_address_mode(mode);
            if let Some(base) = base {
                surface.replace_pixels(seed_pixels(base, resolution));
            }
            surface
        })
    }

    /// Replace the content with `image`, resampled to the raster size and
    /// made fully opaque
    pub fn import_from_source(&mut self, image: &SourceImage) -> Result<(), ValidationError> {
        if image.pixel_count() == 0 {
            return Err(ValidationError::EmptyImage);
        }
        let resolution = self.resolution;
        let surface = self.ensure_initialized();
        surface.replace_pixels(seed_pixels(image, resolution));
        self.base_texture = Some(image.clone());
        self.is_modified = true;
        debug!(
            "{} canvas: imported {}x{} source",
            self.semantic, image.width, image.height
        );
        Ok(())
    }

    /// Stamp a brush dab centered at `uv`
    ///
    /// `color` is normalized for this canvas's semantic. Returns the number
    /// of pixels that received paint.
    pub fn stamp_brush_at_uv(
        &mut self,
        uv: Vec2,
        color: [f32; 4],
        radius_uv: f32,
        hardness: f32,
        mask: Option<&BrushMask>,
        channels: ChannelMask,
    ) -> Result<usize, ValidationError> {
        let uv = validate_uv(uv)?;
        let semantic = self.semantic;
        let surface = self.ensure_initialized();
        let size = surface.surface().width as f32;
        let written = surface.apply_stamp(&Stamp {
            center: Vec2::new(uv.x * size, (1.0 - uv.y) * size),
            radius: radius_uv * size,
            hardness,
            color,
            mask,
            channels,
            semantic,
        });
        if written > 0 {
            self.is_modified = true;
        }
        Ok(written)
    }

    /// Blend `color` uniformly over the whole raster
    pub fn fill(&mut self, color: [f32; 4], channels: ChannelMask) {
        let factor = ChannelPolicy::blend_factor(self.semantic, 1.0, color[3]);
        let src = ChannelPolicy::normalize_color(color, self.semantic);
        let surface = self.ensure_initialized();
        if factor <= 0.0 || channels.is_empty() {
            return;
        }
        surface.surface_mut().fill_masked(src, factor, channels);
        surface.mark_all_dirty();
        self.is_modified = true;
    }

    /// Reset to transparent black; the canvas counts as unmodified again
    pub fn clear(&mut self) {
        if let Some(surface) = &mut self.surface {
            surface.surface_mut().clear([0.0; 4]);
            surface.mark_all_dirty();
        }
        self.is_modified = false;
    }

    /// Current pixels; an unallocated canvas reads as transparent black
    pub fn pixels(&self) -> CpuSurface {
        match &self.surface {
            Some(surface) if surface.surface().width == self.resolution => surface.surface().clone(),
            _ => CpuSurface::new(self.resolution, self.resolution),
        }
    }

    /// Borrow the raster, if allocated
    pub fn surface(&self) -> Option<&CpuSurface> {
        self.surface.as_ref().map(TiledSurface::surface)
    }

    pub fn tiles(&self) -> Option<&TiledSurface> {
        self.surface.as_ref()
    }

    /// Drain tiles written since the last call
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        self.surface
            .as_mut()
            .map(TiledSurface::take_dirty_tiles)
            .unwrap_or_default()
    }

    /// Drain dirty tiles and read back the rectangle enclosing them
    pub fn take_dirty_region(&mut self) -> Option<DirtyRegion> {
        let surface = self.surface.as_mut()?;
        let tiles = surface.take_dirty_tiles();
        let rect = surface.tiles_bounding_box(&tiles)?;
        let (x, y, w, h) = rect;
        Some(DirtyRegion {
            rect,
            pixels: surface.region_data(x, y, w, h),
        })
    }

    /// Read back as an 8-bit image; `srgb` encodes RGB with the sRGB curve
    pub fn to_still_image(&self, srgb: bool) -> RgbaImage {
        surface_to_rgba8(
            &self.pixels(),
            ColorEncoding::for_color(srgb),
            ExportLayout::for_semantic(self.semantic),
        )
    }

    /// Release the raster; safe to call repeatedly
    pub fn dispose(&mut self) {
        if self.surface.take().is_some() {
            debug!("{} canvas: disposed", self.semantic);
        }
    }
}

fn seed_pixels(image: &SourceImage, resolution: u32) -> CpuSurface {
    let mut pixels = image.resampled(resolution, resolution);
    pixels.force_opaque();
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(semantic: ParameterSemantic) -> ParameterCanvas {
        ParameterCanvas::new(semantic, 4).unwrap()
    }

    fn solid(size: u32, color: [f32; 4]) -> SourceImage {
        let mut image = CpuSurface::new(size, size);
        image.clear(color);
        image
    }

    #[test]
    fn test_lazy_allocation() {
        let mut c = canvas(ParameterSemantic::BaseColor);
        assert!(!c.is_allocated());
        c.ensure_initialized();
        assert!(c.is_allocated());
        assert!(!c.is_modified());
        assert!(c.pixels().pixels().iter().all(|p| *p == [0.0; 4]));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        assert_eq!(
            ParameterCanvas::new(ParameterSemantic::Roughness, 0).err(),
            Some(ValidationError::ZeroResolution)
        );
    }

    #[test]
    fn test_stamp_covers_small_canvas() {
        let mut c = canvas(ParameterSemantic::BaseColor);
        let written = c
            .stamp_brush_at_uv(Vec2::splat(0.5), [1.0; 4], 1.0, 1.0, None, ChannelMask::RGB)
            .unwrap();
        assert_eq!(written, 16);
        assert!(c.is_modified());
        assert!(c.pixels().pixels().iter().all(|p| *p == [1.0; 4]));
    }

    #[test]
    fn test_stamp_uv_orientation() {
        let mut c = canvas(ParameterSemantic::BaseColor);
        // Bottom-left of UV space is the bottom-left pixel
        c.stamp_brush_at_uv(Vec2::new(0.125, 0.125), [1.0; 4], 0.1, 1.0, None, ChannelMask::RGB)
            .unwrap();
        let pixels = c.pixels();
        assert_eq!(pixels.get_pixel(0, 3).unwrap()[3], 1.0);
        assert_eq!(pixels.get_pixel(0, 0).unwrap()[3], 0.0);
    }

    #[test]
    fn test_zero_coverage_is_noop() {
        let mut c = canvas(ParameterSemantic::BaseColor);
        c.import_from_source(&solid(4, [0.3, 0.2, 0.1, 1.0])).unwrap();
        let before = c.pixels();

        let empty = BrushMask::from_image(&solid(2, [0.0; 4]), 4, crate::types::MaskMode::Grayscale);
        let written = c
            .stamp_brush_at_uv(Vec2::splat(0.5), [1.0; 4], 0.5, 1.0, Some(&empty), ChannelMask::RGB)
            .unwrap();
        assert_eq!(written, 0);
        assert_eq!(c.pixels(), before);

        // Zero opacity too
        c.stamp_brush_at_uv(Vec2::splat(0.5), [1.0, 1.0, 1.0, 0.0], 0.5, 1.0, None, ChannelMask::RGB)
            .unwrap();
        assert_eq!(c.pixels(), before);
    }

    #[test]
    fn test_base_color_stamp_keeps_alpha_of_opaque_canvas() {
        let mut c = canvas(ParameterSemantic::BaseColor);
        c.import_from_source(&solid(4, [0.0, 0.0, 0.0, 1.0])).unwrap();
        c.stamp_brush_at_uv(Vec2::splat(0.5), [1.0, 0.5, 0.0, 0.4], 1.0, 0.3, None, ChannelMask::RGB)
            .unwrap();
        assert!(c.pixels().pixels().iter().all(|p| p[3] == 1.0));
    }

    #[test]
    fn test_roughness_stamp_writes_luminance_to_red() {
        let mut c = canvas(ParameterSemantic::Roughness);
        c.import_from_source(&solid(4, [0.1, 0.3, 0.7, 1.0])).unwrap();
        c.stamp_brush_at_uv(
            Vec2::splat(0.5),
            [0.2, 0.8, 0.5, 1.0],
            1.0,
            1.0,
            None,
            c.channel_mask(),
        )
        .unwrap();

        for p in c.pixels().pixels() {
            assert!((p[0] - 0.5864).abs() < 1e-4);
            assert!((p[1] - 0.3).abs() < 1e-6);
            assert!((p[2] - 0.7).abs() < 1e-6);
            assert_eq!(p[3], 1.0);
        }
    }

    #[test]
    fn test_opacity_paints_alpha_only() {
        let mut c = canvas(ParameterSemantic::Opacity);
        c.import_from_source(&solid(4, [0.4, 0.5, 0.6, 1.0])).unwrap();
        c.fill([1.0, 1.0, 1.0, 0.25], c.channel_mask());
        for p in c.pixels().pixels() {
            assert_eq!([p[0], p[1], p[2]], [0.4, 0.5, 0.6]);
            assert!((p[3] - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn test_fill_and_clear() {
        let mut c = canvas(ParameterSemantic::Emission);
        c.fill([0.0, 1.0, 0.0, 1.0], ChannelMask::RGB);
        assert!(c.is_modified());
        assert!(c.pixels().pixels().iter().all(|p| *p == [0.0, 1.0, 0.0, 1.0]));

        c.clear();
        assert!(!c.is_modified());
        assert!(c.pixels().pixels().iter().all(|p| *p == [0.0; 4]));
    }

    #[test]
    fn test_import_upsamples_and_forces_opaque() {
        let mut c = ParameterCanvas::new(ParameterSemantic::BaseColor, 1024).unwrap();
        let mut source = solid(512, [0.2, 0.4, 0.6, 0.3]);
        source.set_pixel(0, 0, [1.0, 1.0, 1.0, 0.0]);
        c.import_from_source(&source).unwrap();

        let pixels = c.pixels();
        assert_eq!((pixels.width, pixels.height), (1024, 1024));
        assert!(pixels.pixels().iter().all(|p| p[3] == 1.0));
        assert_eq!(pixels, {
            let mut expected = source.resampled(1024, 1024);
            expected.force_opaque();
            expected
        });
        assert!(c.base_texture().is_some());
    }

    #[test]
    fn test_import_empty_image_rejected() {
        let mut c = canvas(ParameterSemantic::BaseColor);
        assert_eq!(
            c.import_from_source(&CpuSurface::new(0, 0)),
            Err(ValidationError::EmptyImage)
        );
        assert!(!c.is_modified());
    }

    #[test]
    fn test_resolution_change_reseeds_from_base() {
        let mut c = canvas(ParameterSemantic::BaseColor);
        c.import_from_source(&solid(2, [0.5, 0.5, 0.5, 1.0])).unwrap();
        c.set_resolution(8).unwrap();
        c.ensure_initialized();

        let pixels = c.pixels();
        assert_eq!(pixels.width, 8);
        for p in pixels.pixels() {
            assert!((p[0] - 0.5).abs() < 1e-6);
            assert_eq!(p[3], 1.0);
        }
    }

    #[test]
    fn test_resolution_change_without_base_clears() {
        let mut c = canvas(ParameterSemantic::Metallic);
        c.fill([1.0; 4], c.channel_mask());
        c.set_resolution(8).unwrap();
        c.ensure_initialized();
        assert!(c.pixels().pixels().iter().all(|p| *p == [0.0; 4]));
    }

    #[test]
    fn test_dirty_tiles_after_stamp() {
        let mut c = canvas(ParameterSemantic::BaseColor);
        c.ensure_initialized();
        assert!(c.take_dirty_tiles().is_empty());
        c.stamp_brush_at_uv(Vec2::splat(0.5), [1.0; 4], 0.2, 1.0, None, ChannelMask::RGB)
            .unwrap();
        assert_eq!(c.take_dirty_tiles(), vec![TileCoord { x: 0, y: 0 }]);
    }

    #[test]
    fn test_dirty_region_readback() {
        let mut c = ParameterCanvas::new(ParameterSemantic::BaseColor, 256).unwrap();
        assert_eq!(c.take_dirty_region(), None);
        // uv (0.75, 0.75) lands at pixel (192, 64), inside tile (1, 0)
        c.stamp_brush_at_uv(Vec2::new(0.75, 0.75), [1.0; 4], 0.02, 1.0, None, ChannelMask::RGB)
            .unwrap();
        let region = c.take_dirty_region().unwrap();
        assert_eq!(region.rect, (128, 0, 128, 128));
        assert_eq!(region.pixels.len(), 128 * 128);
        // (192, 64) relative to the region origin
        assert_eq!(region.pixels[64 * 128 + 64][3], 1.0);
        assert_eq!(c.take_dirty_region(), None);
    }

    #[test]
    fn test_still_image_encoding() {
        let mut c = canvas(ParameterSemantic::BaseColor);
        c.fill([0.5, 0.5, 0.5, 1.0], ChannelMask::RGB);
        assert_eq!(c.to_still_image(false).get_pixel(0, 0).0, [128, 128, 128, 255]);
        assert_eq!(c.to_still_image(true).get_pixel(0, 0).0, [188, 188, 188, 255]);
    }

    #[test]
    fn test_dispose_is_repeatable() {
        let mut c = canvas(ParameterSemantic::BaseColor);
        c.ensure_initialized();
        c.dispose();
        c.dispose();
        assert!(!c.is_allocated());
        assert_eq!(c.take_dirty_tiles(), Vec::new());
    }
}
