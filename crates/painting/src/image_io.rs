//! Conversions between CPU surfaces and still images

use image::{DynamicImage, RgbaImage};
use tracing::debug;

use crate::channel::ChannelPolicy;
use crate::color::{linear_to_srgb, srgb_to_linear, to_u8};
use crate::surface::CpuSurface;
use crate::types::{ChannelMask, ParameterSemantic};

/// An imported still image (base texture, brush mask) as linear f32 RGBA
pub type SourceImage = CpuSurface;

/// Transfer function of 8-bit image data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorEncoding {
    /// RGB is sRGB-encoded; alpha is always linear
    Srgb,
    /// Values are stored as-is
    Linear,
}

impl ColorEncoding {
    pub fn for_color(is_color: bool) -> Self {
        if is_color { ColorEncoding::Srgb } else { ColorEncoding::Linear }
    }
}

/// Read a decoded image into a linear surface
pub fn surface_from_image(image: &DynamicImage, encoding: ColorEncoding) -> SourceImage {
    let rgba = image.to_rgba32f();
    let (width, height) = rgba.dimensions();
    let pixels = rgba
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            match encoding {
                ColorEncoding::Srgb => [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a],
                ColorEncoding::Linear => [r, g, b, a],
            }
        })
        .collect();
    // Length always matches the decoded dimensions
    CpuSurface::from_pixels(width, height, pixels).unwrap_or_else(|| CpuSurface::new(width, height))
}

/// Decode encoded image bytes (PNG etc.) into a linear surface
pub fn decode_image(bytes: &[u8], encoding: ColorEncoding) -> Result<SourceImage, image::ImageError> {
    let image = image::load_from_memory(bytes)?;
    debug!("decoded {}x{} image from {} bytes", image.width(), image.height(), bytes.len());
    Ok(surface_from_image(&image, encoding))
}

/// Channel layout of an exported image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportLayout {
    /// RGBA written as stored
    Rgba,
    /// Red replicated into green and blue (single-channel parameters)
    RedAsGray,
    /// Alpha replicated into RGB, alpha kept (opacity)
    AlphaAsGray,
}

impl ExportLayout {
    pub fn for_semantic(semantic: ParameterSemantic) -> Self {
        match ChannelPolicy::channel_mask(semantic) {
            ChannelMask::RED => ExportLayout::RedAsGray,
            ChannelMask::ALPHA => ExportLayout::AlphaAsGray,
            _ => ExportLayout::Rgba,
        }
    }
}

/// Read a surface back into an RGBA8 image
pub fn surface_to_rgba8(surface: &CpuSurface, encoding: ColorEncoding, layout: ExportLayout) -> RgbaImage {
    let encode = |v: f32| match encoding {
        ColorEncoding::Srgb => to_u8(linear_to_srgb(v)),
        ColorEncoding::Linear => to_u8(v),
    };
    let mut out = RgbaImage::new(surface.width, surface.height);
    for (dst, src) in out.pixels_mut().zip(surface.pixels()) {
        let (r, g, b) = match layout {
            ExportLayout::Rgba => (encode(src[0]), encode(src[1]), encode(src[2])),
            ExportLayout::RedAsGray => {
                let v = encode(src[0]);
                (v, v, v)
            }
            ExportLayout::AlphaAsGray => {
                let v = to_u8(src[3]);
                (v, v, v)
            }
        };
        dst.0 = [r, g, b, to_u8(src[3])];
    }
    out
}
