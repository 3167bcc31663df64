//! Dirty tile tracking for incremental uploads

use tracing::debug;

use super::{TileCoord, TiledSurface};

impl TiledSurface {
    /// Mark the tile containing pixel (x, y) dirty
    #[inline]
    pub fn mark_dirty(&mut self, x: u32, y: u32) {
        if x >= self.surface.width || y >= self.surface.height {
            return;
        }
        self.dirty_tiles.insert(TileCoord {
            x: x / self.tile_size,
            y: y / self.tile_size,
        });
    }

    /// Mark every tile overlapping a pixel rectangle dirty
    pub fn mark_region_dirty(&mut self, x: u32, y: u32, w: u32, h: u32) {
        if w == 0 || h == 0 || x >= self.surface.width || y >= self.surface.height {
            return;
        }
        let x_end = x.saturating_add(w).min(self.surface.width);
        let y_end = y.saturating_add(h).min(self.surface.height);

        let before = self.dirty_tiles.len();
        for ty in (y / self.tile_size)..=((y_end - 1) / self.tile_size) {
            for tx in (x / self.tile_size)..=((x_end - 1) / self.tile_size) {
                self.dirty_tiles.insert(TileCoord { x: tx, y: ty });
            }
        }
        debug!(
            "mark_region_dirty: ({}, {}) {}x{} -> {} new tiles",
            x,
            y,
            w,
            h,
            self.dirty_tiles.len() - before
        );
    }

    /// Mark the whole raster dirty
    pub fn mark_all_dirty(&mut self) {
        let (w, h) = (self.surface.width, self.surface.height);
        self.mark_region_dirty(0, 0, w, h);
    }

    /// Drain the dirty set, sorted row by row
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        let mut tiles: Vec<TileCoord> = self.dirty_tiles.drain().collect();
        tiles.sort_by_key(|t| (t.y, t.x));
        tiles
    }

    #[inline]
    pub fn has_dirty_tiles(&self) -> bool {
        !self.dirty_tiles.is_empty()
    }

    #[inline]
    pub fn dirty_tile_count(&self) -> usize {
        self.dirty_tiles.len()
    }
}
