//! CPU surface for painting - f32 RGBA storage

use crate::sampling::sample_bilinear;
use crate::types::ChannelMask;

/// A straight-alpha f32 RGBA CPU surface
/// Stores pixels as [f32; 4] in row-major order, row 0 at the top
#[derive(Debug, Clone, PartialEq)]
pub struct CpuSurface {
    /// Surface dimensions
    pub width: u32,
    pub height: u32,
    /// Pixel data in row-major order, each pixel is [r, g, b, a] as f32
    pixels: Vec<[f32; 4]>,
}

impl CpuSurface {
    /// Create a new surface with the given dimensions, initialized to transparent black
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![[0.0, 0.0, 0.0, 0.0]; pixel_count],
        }
    }

    /// Wrap existing pixel data. Returns None if the length does not match.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[f32; 4]>) -> Option<Self> {
        if pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    /// Clear the surface to a solid color
    pub fn clear(&mut self, color: [f32; 4]) {
        self.pixels.fill(color);
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Get a pixel at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Set a pixel at the given coordinates
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [f32; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Blend `color` into one pixel, restricted to the channels in `channels`
    /// Does nothing if coordinates are out of bounds or `factor <= 0`
    #[inline]
    pub fn blend_pixel_masked(
        &mut self,
        x: u32,
        y: u32,
        color: [f32; 4],
        factor: f32,
        channels: ChannelMask,
    ) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = self.index(x, y);
        self.pixels[index] = blend_masked(self.pixels[index], color, factor, channels);
    }

    /// Blend `color` into every pixel with a uniform factor
    pub fn fill_masked(&mut self, color: [f32; 4], factor: f32, channels: ChannelMask) {
        if factor <= 0.0 || channels.is_empty() {
            return;
        }
        for pixel in &mut self.pixels {
            *pixel = blend_masked(*pixel, color, factor, channels);
        }
    }

    /// Force alpha to 1 everywhere, leaving color untouched
    pub fn force_opaque(&mut self) {
        for pixel in &mut self.pixels {
            pixel[3] = 1.0;
        }
    }

    /// Bilinearly resample into a new surface of the given size
    ///
    /// Same-size requests are a plain copy.
    pub fn resampled(&self, width: u32, height: u32) -> CpuSurface {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let mut out = CpuSurface::new(width, height);
        if self.width == 0 || self.height == 0 {
            return out;
        }
        let scale_x = self.width as f32 / width as f32;
        let scale_y = self.height as f32 / height as f32;
        for y in 0..height {
            let sy = (y as f32 + 0.5) * scale_y - 0.5;
            for x in 0..width {
                let sx = (x as f32 + 0.5) * scale_x - 0.5;
                let pixel = sample_bilinear(&self.pixels, self.width, self.height, sx, sy);
                out.set_pixel(x, y, pixel);
            }
        }
        out
    }

    /// Get raw pixel data for GPU upload
    /// Returns the pixel data as a byte slice suitable for an Rgba32Float texture
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Get the total number of pixels
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Get direct access to pixel data (for advanced operations)
    #[inline]
    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    /// Get mutable access to pixel data (for advanced operations)
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [[f32; 4]] {
        &mut self.pixels
    }
}

/// Channel-restricted blend of `src` over `dst`
///
/// When alpha is a value channel (`channels.a`), every selected channel is
/// linearly interpolated toward `src` by `factor`.
///
/// Otherwise alpha is paint coverage: it accumulates as `a + (1 - a) * factor`
/// and each selected color channel becomes the coverage-weighted average of
/// the old value and `src`. Over an opaque pixel this is the same linear
/// interpolation; over a transparent one it writes `src` without darkening.
/// Unselected channels are returned unchanged.
#[inline]
pub fn blend_masked(dst: [f32; 4], src: [f32; 4], factor: f32, channels: ChannelMask) -> [f32; 4] {
    if factor <= 0.0 || channels.is_empty() {
        return dst;
    }
    let f = factor.min(1.0);
    let mut out = dst;

    if channels.alpha_is_value() {
        for c in 0..4 {
            if channels.writes(c) {
                out[c] = dst[c] + (src[c] - dst[c]) * f;
            }
        }
        return out;
    }

    let old_weight = dst[3] * (1.0 - f);
    let new_alpha = dst[3] + (1.0 - dst[3]) * f;
    for c in 0..3 {
        if channels.writes(c) {
            out[c] = (src[c] * f + dst[c] * old_weight) / new_alpha;
        }
    }
    out[3] = new_alpha;
    out
}
