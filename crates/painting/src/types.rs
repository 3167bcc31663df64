use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

pub use painter_config::{
    AddressMode, FillTarget, MaskMode, PaintMode, ParameterSemantic, ProjectionMode,
};

/// Subset of RGBA channels a write may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelMask {
    pub r: bool,
    pub g: bool,
    pub b: bool,
    pub a: bool,
}

impl ChannelMask {
    pub const ALL: ChannelMask = ChannelMask { r: true, g: true, b: true, a: true };
    pub const RGB: ChannelMask = ChannelMask { r: true, g: true, b: true, a: false };
    pub const RED: ChannelMask = ChannelMask { r: true, g: false, b: false, a: false };
    pub const ALPHA: ChannelMask = ChannelMask { r: false, g: false, b: false, a: true };
    pub const NONE: ChannelMask = ChannelMask { r: false, g: false, b: false, a: false };

    /// Whether channel index 0..4 (r, g, b, a) is writable
    #[inline]
    pub fn writes(&self, channel: usize) -> bool {
        match channel {
            0 => self.r,
            1 => self.g,
            2 => self.b,
            3 => self.a,
            _ => false,
        }
    }

    /// Whether alpha is a value channel rather than paint coverage
    #[inline]
    pub fn alpha_is_value(&self) -> bool {
        self.a
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.r || self.g || self.b || self.a)
    }
}

/// Result of a ray hitting a mesh
#[derive(Debug, Clone, Copy)]
pub struct MeshHit {
    /// Hit position in world space
    pub world_pos: Vec3,
    /// Triangle index
    pub face_id: u32,
    /// Barycentric coordinates (w, u, v)
    pub barycentric: Vec3,
    /// Interpolated surface normal, world space
    pub normal: Vec3,
    /// Interpolated UV, `None` if the mesh has no UVs
    pub uv: Option<Vec2>,
}

/// A paintable hit: a mesh hit that resolved to a texture coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub world_pos: Vec3,
    pub world_normal: Vec3,
    /// Texture coordinate in [0, 1]^2
    pub uv: Vec2,
    pub face_id: u32,
}

/// Pixel rectangle (x, y, width, height)
pub type PixelRect = (u32, u32, u32, u32);
