//! Builds the joined tile for one grid cell
//!
//! Each cell borrows border bands from its right, top and top-right
//! neighbours so instances near a seam are resolved against the instances
//! they would collide with across it. Borrowed instances the cell does not
//! own are inserted as blockers.

use glam::Vec2;

use crate::core::error::Result;
use crate::core::types::{Aabb2, TileCoord};
use crate::growth::Ecosystem;
use crate::stitch::region::{neighbor_region, tile_region, CopyRegion, Neighbor};
use crate::tile::Tile;

/// Provides the simulated tile shown at a grid coordinate
pub trait TileSource: Sync {
    fn tile_at(&self, coord: TileCoord) -> &Tile;
}

pub struct TileStitcher<'a, S: TileSource + ?Sized> {
    source: &'a S,
    ecosystem: &'a Ecosystem,
    tiles_x: u32,
    tiles_y: u32,
    overlap: f32,
}

impl<'a, S: TileSource + ?Sized> TileStitcher<'a, S> {
    pub fn new(source: &'a S, ecosystem: &'a Ecosystem, tiles_x: u32, tiles_y: u32, overlap: f32) -> Self {
        Self {
            source,
            ecosystem,
            tiles_x,
            tiles_y,
            overlap,
        }
    }

    /// Joined, finalized tile for `coord`, in the cell's local frame
    pub fn stitch_cell(&self, coord: TileCoord) -> Result<Tile> {
        let tile_size = self.ecosystem.tile_size;
        let inner = tile_region(coord, tile_size, self.overlap);

        let mut joined = Tile::new();
        joined.init_simulation(self.ecosystem, 0)?;

        for neighbor in Neighbor::ALL {
            let Some(neighbor_coord) = neighbor.coord(coord, self.tiles_x, self.tiles_y) else {
                continue;
            };
            let copy = neighbor_region(neighbor, inner, tile_size, self.overlap);
            copy_tile_instances(self.source.tile_at(neighbor_coord), &mut joined, copy, self.overlap)?;
        }

        let own = CopyRegion { region: inner, offset: Vec2::ZERO };
        copy_tile_instances(self.source.tile_at(coord), &mut joined, own, self.overlap)?;

        joined.instances_to_array();
        tracing::debug!(
            x = coord.x,
            y = coord.y,
            placed = joined.instances().len(),
            "stitched cell"
        );
        Ok(joined)
    }
}

/// Copy `from`'s instances centred in the copy's source box into `to`.
///
/// Selection is by centre so that every instance owned by a cell is read by
/// that cell, whatever its footprint; the disk only decides what it collides
/// with once copied.
pub fn copy_tile_instances(from: &Tile, to: &mut Tile, copy: CopyRegion, overlap: f32) -> Result<()> {
    let source: Aabb2 = copy.source_box(overlap);
    let instances: Vec<_> = from
        .instances_in_box(source, true)
        .into_iter()
        .filter(|inst| source.contains_point(inst.location_2d()))
        .collect();
    to.add_instances(&instances, copy.offset, copy.region)
}
