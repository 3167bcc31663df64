//! Tiled raster with dirty tracking
//!
//! Every canvas raster lives in a [`TiledSurface`]. Writes mark the tiles
//! they touch so a host can upload only what changed.

mod data_access;
mod dirty_tracking;
mod stamp;

use std::collections::HashSet;

use crate::constants::DEFAULT_TILE_SIZE;
use crate::surface::CpuSurface;
use crate::types::AddressMode;

pub use stamp::Stamp;

/// Tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

/// A surface split into square tiles, with the set of tiles written since
/// the last drain
#[derive(Debug, Clone)]
pub struct TiledSurface {
    pub(crate) surface: CpuSurface,
    pub(crate) tile_size: u32,
    tiles_x: u32,
    tiles_y: u32,
    pub(crate) address_mode: AddressMode,
    pub(crate) dirty_tiles: HashSet<TileCoord>,
}

impl TiledSurface {
    /// Create a transparent tiled surface
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        Self::from_surface(CpuSurface::new(width, height), tile_size)
    }

    pub fn with_default_tile_size(width: u32, height: u32) -> Self {
        Self::new(width, height, DEFAULT_TILE_SIZE)
    }

    /// Wrap existing pixels; nothing is marked dirty
    pub fn from_surface(surface: CpuSurface, tile_size: u32) -> Self {
        let tile_size = tile_size.max(1);
        let tiles_x = surface.width.div_ceil(tile_size);
        let tiles_y = surface.height.div_ceil(tile_size);
        Self {
            surface,
            tile_size,
            tiles_x,
            tiles_y,
            address_mode: AddressMode::Clamp,
            dirty_tiles: HashSet::new(),
        }
    }

    pub fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.address_mode = mode;
        self
    }

    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    #[inline]
    pub fn tiles_x(&self) -> u32 {
        self.tiles_x
    }

    #[inline]
    pub fn tiles_y(&self) -> u32 {
        self.tiles_y
    }

    #[inline]
    pub fn address_mode(&self) -> AddressMode {
        self.address_mode
    }

    pub fn set_address_mode(&mut self, mode: AddressMode) {
        self.address_mode = mode;
    }

    #[inline]
    pub fn surface(&self) -> &CpuSurface {
        &self.surface
    }

    /// Mutable pixel access; the caller is responsible for marking tiles dirty
    #[inline]
    pub fn surface_mut(&mut self) -> &mut CpuSurface {
        &mut self.surface
    }

    /// Replace the whole raster and mark every tile dirty
    ///
    /// `surface` must have the same size as the current raster; a mismatch
    /// is ignored and returns false.
    pub fn replace_pixels(&mut self, surface: CpuSurface) -> bool {
        if surface.width != self.surface.width || surface.height != self.surface.height {
            return false;
        }
        self.surface = surface;
        self.mark_all_dirty();
        true
    }
}
