//! Bilinear sampling of f32 RGBA buffers

/// Sample `pixels` (row-major, `width` x `height`) at continuous pixel
/// coordinates where integer values land on pixel centers.
///
/// Coordinates outside the buffer clamp to the edge pixels.
pub fn sample_bilinear(pixels: &[[f32; 4]], width: u32, height: u32, x: f32, y: f32) -> [f32; 4] {
    if width == 0 || height == 0 {
        return [0.0; 4];
    }
    let max_x = (width - 1) as f32;
    let max_y = (height - 1) as f32;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let wx = x - x0 as f32;
    let wy = y - y0 as f32;

    let w = width as usize;
    let p00 = pixels[y0 as usize * w + x0 as usize];
    let p10 = pixels[y0 as usize * w + x1 as usize];
    let p01 = pixels[y1 as usize * w + x0 as usize];
    let p11 = pixels[y1 as usize * w + x1 as usize];

    let mut out = [0.0; 4];
    for c in 0..4 {
        let top = p00[c] * (1.0 - wx) + p10[c] * wx;
        let bot = p01[c] * (1.0 - wx) + p11[c] * wx;
        out[c] = top * (1.0 - wy) + bot * wy;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_at_pixel_center_is_exact() {
        let pixels = vec![[0.0; 4], [1.0; 4], [0.5; 4], [0.25; 4]];
        assert_eq!(sample_bilinear(&pixels, 2, 2, 1.0, 0.0), [1.0; 4]);
        assert_eq!(sample_bilinear(&pixels, 2, 2, 1.0, 1.0), [0.25; 4]);
    }

    #[test]
    fn test_sample_midpoint_interpolates() {
        let pixels = vec![[0.0; 4], [1.0; 4]];
        let mid = sample_bilinear(&pixels, 2, 1, 0.5, 0.0);
        assert!((mid[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sample_outside_clamps() {
        let pixels = vec![[0.0; 4], [1.0; 4]];
        assert_eq!(sample_bilinear(&pixels, 2, 1, -5.0, 3.0), [0.0; 4]);
        assert_eq!(sample_bilinear(&pixels, 2, 1, 9.0, 0.0), [1.0; 4]);
    }
}
