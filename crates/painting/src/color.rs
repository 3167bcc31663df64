//! Color helpers: luminance and sRGB transfer functions

use crate::constants::LUMA_WEIGHTS;

/// Perceptual luminance of a linear RGB triple
#[inline]
pub fn luminance(rgb: [f32; 3]) -> f32 {
    rgb[0] * LUMA_WEIGHTS[0] + rgb[1] * LUMA_WEIGHTS[1] + rgb[2] * LUMA_WEIGHTS[2]
}

/// Encode a linear channel value with the sRGB transfer curve
#[inline]
pub fn linear_to_srgb(value: f32) -> f32 {
    let v = value.clamp(0.0, 1.0);
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// Decode an sRGB-encoded channel value to linear
#[inline]
pub fn srgb_to_linear(value: f32) -> f32 {
    let v = value.clamp(0.0, 1.0);
    if v <= 0.040_45 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Quantize a [0, 1] value to 8 bits
#[inline]
pub fn to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminance_of_white_is_one() {
        assert!((luminance([1.0, 1.0, 1.0]) - 1.0).abs() < 1e-6);
        assert_eq!(luminance([0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_srgb_round_trip_midpoints() {
        for v in [0.0, 0.002, 0.18, 0.5, 1.0] {
            let back = srgb_to_linear(linear_to_srgb(v));
            assert!((back - v).abs() < 1e-4, "{v} -> {back}");
        }
    }

    #[test]
    fn test_srgb_brightens_midtones() {
        // Linear middle grey encodes to roughly 0.46
        let encoded = linear_to_srgb(0.18);
        assert!(encoded > 0.45 && encoded < 0.47);
    }

    #[test]
    fn test_to_u8_clamps() {
        assert_eq!(to_u8(-1.0), 0);
        assert_eq!(to_u8(2.0), 255);
        assert_eq!(to_u8(0.5), 128);
    }
}
