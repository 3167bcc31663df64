/// Default tile size for dirty tracking on canvases.
pub const DEFAULT_TILE_SIZE: u32 = 128;

/// Brush radii in pixels are divided by this when no screen scale is known.
/// A 20 px brush covers 20/1024 of the texture width at any resolution.
pub const REFERENCE_RESOLUTION: f32 = 1024.0;

/// Rec.601 luma weights used to collapse colors onto single-channel semantics.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// UV triangles smaller than this are treated as degenerate.
pub const MIN_UV_TRIANGLE_AREA: f32 = 1e-10;

/// Smallest usable UV-per-screen-pixel scale.
pub const MIN_UV_PER_PIXEL: f32 = 1e-7;

/// Edge length of the synthetic mask used when a mask image cannot be read.
pub const FALLBACK_MASK_SIZE: u32 = 64;

/// A one-pixel step onto another face with a UV jump this many times the
/// other axis is treated as crossing a UV seam.
pub const MAX_UV_STEP_RATIO: f32 = 4.0;

/// Largest brush radius in UV units. One texture width covers the whole
/// raster from any center.
pub const MAX_RADIUS_UV: f32 = 1.0;

/// Mask grids never exceed this edge length.
pub const MAX_MASK_SIZE: u32 = 16384;
