//! Per-semantic channel policy
//!
//! Single-channel PBR parameters live in the red channel of an RGBA canvas
//! so that stamping, filling and compositing share one code path for every
//! semantic. Export decides later how many channels to keep.

use crate::color::luminance;
use crate::types::{ChannelMask, ParameterSemantic};

/// Which channels a semantic may write, and how input colors are collapsed
pub struct ChannelPolicy;

impl ChannelPolicy {
    /// Channels a stroke on `semantic` is allowed to write
    pub fn channel_mask(semantic: ParameterSemantic) -> ChannelMask {
        match semantic {
            ParameterSemantic::BaseColor | ParameterSemantic::Emission => ChannelMask::RGB,
            ParameterSemantic::Opacity => ChannelMask::ALPHA,
            ParameterSemantic::Roughness
            | ParameterSemantic::Metallic
            | ParameterSemantic::Occlusion => ChannelMask::RED,
        }
    }

    /// Color actually written for `input` on `semantic`
    pub fn normalize_color(input: [f32; 4], semantic: ParameterSemantic) -> [f32; 4] {
        match semantic {
            ParameterSemantic::BaseColor | ParameterSemantic::Emission => input,
            ParameterSemantic::Opacity => [0.0, 0.0, 0.0, input[3]],
            ParameterSemantic::Roughness
            | ParameterSemantic::Metallic
            | ParameterSemantic::Occlusion => {
                let gray = luminance([input[0], input[1], input[2]]);
                [gray, gray, gray, input[3]]
            }
        }
    }

    /// Blend factor for one stamp sample
    ///
    /// Coverage and stroke opacity multiply. On the opacity semantic the
    /// input alpha is the value being painted, so only coverage attenuates.
    #[inline]
    pub fn blend_factor(semantic: ParameterSemantic, coverage: f32, opacity: f32) -> f32 {
        match semantic {
            ParameterSemantic::Opacity => coverage,
            _ => coverage * opacity,
        }
    }
}
