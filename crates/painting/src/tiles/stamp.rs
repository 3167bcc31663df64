//! Brush stamp application

use std::ops::Range;

use glam::Vec2;
use tracing::debug;

use super::TiledSurface;
use crate::channel::ChannelPolicy;
use crate::mask::{radial_falloff, BrushMask};
use crate::surface::blend_masked;
use crate::types::{AddressMode, ChannelMask, ParameterSemantic};

/// One stamp in raster pixel space
#[derive(Debug, Clone, Copy)]
pub struct Stamp<'a> {
    /// Center in pixel coordinates (pixel centers sit at +0.5)
    pub center: Vec2,
    /// Radius in pixels; ignored for coverage when `mask` is set
    pub radius: f32,
    pub hardness: f32,
    /// Input color before normalization; alpha is the stroke opacity
    pub color: [f32; 4],
    /// Imported mask grid, placed 1:1 on pixels around `center`
    pub mask: Option<&'a BrushMask>,
    pub channels: ChannelMask,
    /// Semantic of the target raster, drives color normalization
    pub semantic: ParameterSemantic,
}

impl TiledSurface {
    /// Blend a stamp into the raster
    ///
    /// Returns the number of pixels that received a non-zero blend factor.
    /// Pixels outside the raster are dropped in `Clamp` mode and wrap
    /// around in `Wrap` mode.
    pub fn apply_stamp(&mut self, stamp: &Stamp<'_>) -> usize {
        if stamp.channels.is_empty() || !stamp.center.is_finite() {
            return 0;
        }
        let opacity = ChannelPolicy::blend_factor(stamp.semantic, 1.0, stamp.color[3]);
        if opacity <= 0.0 {
            return 0;
        }
        let written = match stamp.mask {
            Some(mask) => self.stamp_mask(stamp, mask, opacity),
            None => self.stamp_procedural(stamp, opacity),
        };
        debug!(
            "apply_stamp: center=({:.1}, {:.1}) radius={:.2} {} -> {} px",
            stamp.center.x, stamp.center.y, stamp.radius, stamp.semantic, written
        );
        written
    }

    fn stamp_procedural(&mut self, stamp: &Stamp<'_>, opacity: f32) -> usize {
        if stamp.radius <= 0.0 {
            return 0;
        }
        let src = ChannelPolicy::normalize_color(stamp.color, stamp.semantic);
        let xs = self.span(
            (stamp.center.x - stamp.radius).floor() as i64,
            (stamp.center.x + stamp.radius).ceil() as i64,
            stamp.center.x,
            self.surface.width,
        );
        let ys = self.span(
            (stamp.center.y - stamp.radius).floor() as i64,
            (stamp.center.y + stamp.radius).ceil() as i64,
            stamp.center.y,
            self.surface.height,
        );

        let mut written = 0;
        for py in ys {
            for px in xs.clone() {
                let d = Vec2::new(px as f32 + 0.5, py as f32 + 0.5).distance(stamp.center);
                let coverage = radial_falloff(d, stamp.radius, stamp.hardness);
                if self.blend_at(px, py, src, coverage * opacity, stamp.channels) {
                    written += 1;
                }
            }
        }
        written
    }

    fn stamp_mask(&mut self, stamp: &Stamp<'_>, mask: &BrushMask, opacity: f32) -> usize {
        let size = mask.size();
        let half = size as f32 / 2.0;
        let origin_x = (stamp.center.x - half).round() as i64;
        let origin_y = (stamp.center.y - half).round() as i64;
        let brush_src = ChannelPolicy::normalize_color(stamp.color, stamp.semantic);

        let xs = self.span(origin_x, origin_x + size as i64, stamp.center.x, self.surface.width);
        let ys = self.span(origin_y, origin_y + size as i64, stamp.center.y, self.surface.height);

        let mut written = 0;
        for py in ys {
            let my = (py - origin_y) as u32;
            for px in xs.clone() {
                let mx = (px - origin_x) as u32;
                let coverage = mask.coverage_at(mx, my);
                let src = match mask.tint_at(mx, my) {
                    Some([r, g, b]) => {
                        ChannelPolicy::normalize_color([r, g, b, stamp.color[3]], stamp.semantic)
                    }
                    None => brush_src,
                };
                if self.blend_at(px, py, src, coverage * opacity, stamp.channels) {
                    written += 1;
                }
            }
        }
        written
    }

    /// Part of the stamp extent `lo..hi` along one axis worth visiting
    ///
    /// `Clamp` keeps what lies on the raster. `Wrap` keeps at most one
    /// raster period, centered on the stamp, so no pixel is blended twice.
    fn span(&self, lo: i64, hi: i64, center: f32, extent: u32) -> Range<i64> {
        let extent = extent as i64;
        match self.address_mode {
            AddressMode::Clamp => lo.max(0)..hi.min(extent),
            AddressMode::Wrap if hi.saturating_sub(lo) <= extent => lo..hi,
            AddressMode::Wrap => {
                let start = (center - extent as f32 / 2.0).round() as i64;
                start.max(lo)..(start + extent).min(hi)
            }
        }
    }

    /// Blend one pixel given in unbounded coordinates
    fn blend_at(&mut self, x: i64, y: i64, src: [f32; 4], factor: f32, channels: ChannelMask) -> bool {
        if factor <= 0.0 {
            return false;
        }
        let Some((x, y)) = self.address(x, y) else {
            return false;
        };
        self.surface.blend_pixel_masked(x, y, src, factor, channels);
        self.mark_dirty(x, y);
        true
    }

    fn address(&self, x: i64, y: i64) -> Option<(u32, u32)> {
        let w = self.surface.width as i64;
        let h = self.surface.height as i64;
        if w == 0 || h == 0 {
            return None;
        }
        match self.address_mode {
            AddressMode::Clamp => {
                ((0..w).contains(&x) && (0..h).contains(&y)).then_some((x as u32, y as u32))
            }
            AddressMode::Wrap => Some((x.rem_euclid(w) as u32, y.rem_euclid(h) as u32)),
        }
    }
}
