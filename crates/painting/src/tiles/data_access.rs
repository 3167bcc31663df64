//! Tile and region readback

use super::{TileCoord, TiledSurface};
use crate::types::PixelRect;

impl TiledSurface {
    /// Pixel rectangle covered by a tile; edge tiles are truncated
    pub fn tile_bounds(&self, coord: TileCoord) -> PixelRect {
        let x = coord.x * self.tile_size;
        let y = coord.y * self.tile_size;
        (
            x,
            y,
            self.tile_size.min(self.surface.width.saturating_sub(x)),
            self.tile_size.min(self.surface.height.saturating_sub(y)),
        )
    }

    /// Row-major pixels of one tile
    pub fn tile_data(&self, coord: TileCoord) -> Vec<[f32; 4]> {
        let (x, y, w, h) = self.tile_bounds(coord);
        self.region_data(x, y, w, h)
    }

    /// Row-major pixels of a rectangle, clamped to the raster
    pub fn region_data(&self, x: u32, y: u32, width: u32, height: u32) -> Vec<[f32; 4]> {
        let x_end = x.saturating_add(width).min(self.surface.width);
        let y_end = y.saturating_add(height).min(self.surface.height);
        if x >= x_end || y >= y_end {
            return Vec::new();
        }

        let stride = self.surface.width as usize;
        let pixels = self.surface.pixels();
        let mut data = Vec::with_capacity(((x_end - x) * (y_end - y)) as usize);
        for row in y..y_end {
            let start = row as usize * stride;
            data.extend_from_slice(&pixels[start + x as usize..start + x_end as usize]);
        }
        data
    }

    /// Smallest rectangle containing all `tiles`
    pub fn tiles_bounding_box(&self, tiles: &[TileCoord]) -> Option<PixelRect> {
        let (min_x, min_y, max_x, max_y) = tiles.iter().fold(
            (u32::MAX, u32::MAX, 0u32, 0u32),
            |(min_x, min_y, max_x, max_y), tile| {
                let (x, y, w, h) = self.tile_bounds(*tile);
                (min_x.min(x), min_y.min(y), max_x.max(x + w), max_y.max(y + h))
            },
        );
        (max_x > min_x && max_y > min_y).then(|| (min_x, min_y, max_x - min_x, max_y - min_y))
    }
}
