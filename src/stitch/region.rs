//! Region math for the overlapping tile grid
//!
//! Every cell of a `tiles_x` by `tiles_y` grid is built in a joined frame
//! whose origin is the cell's own tile origin. With tile size `S` and
//! overlap margin `M`, the cell shows its own tile over `[M, S+M]` on each
//! axis and borrows bands of width `2M` from the tiles to its right and top.

use glam::Vec2;

use crate::core::types::{Aabb2, TileCoord};

/// Region of the cell's own tile that this cell is responsible for.
///
/// Cells on the low grid edges also claim the `[-M, M]` band, since no
/// neighbour to their left or bottom covers it.
pub fn tile_region(coord: TileCoord, tile_size: f32, overlap: f32) -> Aabb2 {
    let mut region = Aabb2::new(Vec2::splat(overlap), Vec2::splat(tile_size + overlap));
    if coord.x == 0 {
        region.include_point(Vec2::new(-overlap, overlap));
    }
    if coord.y == 0 {
        region.include_point(Vec2::new(overlap, -overlap));
    }
    region
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighbor {
    Right,
    Top,
    TopRight,
}

impl Neighbor {
    pub const ALL: [Neighbor; 3] = [Neighbor::Right, Neighbor::Top, Neighbor::TopRight];

    /// Grid coordinate of this neighbour, if it lies inside the grid
    pub fn coord(self, coord: TileCoord, tiles_x: u32, tiles_y: u32) -> Option<TileCoord> {
        let has_right = coord.x + 1 < tiles_x;
        let has_top = coord.y + 1 < tiles_y;
        match self {
            Neighbor::Right if has_right => Some(TileCoord::new(coord.x + 1, coord.y)),
            Neighbor::Top if has_top => Some(TileCoord::new(coord.x, coord.y + 1)),
            Neighbor::TopRight if has_right && has_top => Some(TileCoord::new(coord.x + 1, coord.y + 1)),
            _ => None,
        }
    }
}

/// A band borrowed from another tile: the region in that tile's frame and
/// the translation into the joined frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CopyRegion {
    pub region: Aabb2,
    pub offset: Vec2,
}

impl CopyRegion {
    /// Box instances are read from. Extends past the visible region on the
    /// max sides so whole footprints straddling the edge are picked up.
    pub fn source_box(&self, overlap: f32) -> Aabb2 {
        Aabb2::new(self.region.min, self.region.max + Vec2::splat(overlap))
    }
}

/// Band a neighbour contributes, given the cell's own region `inner`
pub fn neighbor_region(neighbor: Neighbor, inner: Aabb2, tile_size: f32, overlap: f32) -> CopyRegion {
    match neighbor {
        Neighbor::Right => CopyRegion {
            region: Aabb2::new(Vec2::new(-overlap, inner.min.y), Vec2::new(overlap, inner.max.y)),
            offset: Vec2::new(tile_size, 0.0),
        },
        Neighbor::Top => CopyRegion {
            region: Aabb2::new(Vec2::new(inner.min.x, -overlap), Vec2::new(inner.max.x, overlap)),
            offset: Vec2::new(0.0, tile_size),
        },
        Neighbor::TopRight => CopyRegion {
            region: Aabb2::new(Vec2::splat(-overlap), Vec2::splat(overlap)),
            offset: Vec2::splat(tile_size),
        },
    }
}
