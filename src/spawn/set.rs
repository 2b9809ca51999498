//! Pool of pre-simulated tiles shared by every cell of a grid

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::core::config::SetConfig;
use crate::core::error::Result;
use crate::core::types::TileCoord;
use crate::growth::Ecosystem;
use crate::stitch::TileSource;
use crate::tile::Tile;

/// Species mix plus `num_unique_tiles` finished simulations.
///
/// Grid cells do not get their own simulation: each picks a pool tile by
/// hashing its coordinate, so neighbouring cells of any grid are always
/// backed by the same tiles for the same seed.
pub struct FoliageSet {
    ecosystem: Ecosystem,
    random_seed: u64,
    tiles: Vec<Tile>,
}

impl FoliageSet {
    /// Validate and simulate the whole pool, one tile per rayon task
    pub fn new(ecosystem: Ecosystem, config: &SetConfig) -> Result<Self> {
        config.validate()?;
        ecosystem.validate()?;

        let max_steps = config.step_cap();
        let tiles = (0..config.num_unique_tiles as u64)
            .into_par_iter()
            .map(|i| -> Result<Tile> {
                let mut tile = Tile::new();
                tile.simulate(&ecosystem, config.random_seed.wrapping_add(i), max_steps)?;
                Ok(tile)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            tiles = tiles.len(),
            species = ecosystem.species.len(),
            tile_size = ecosystem.tile_size,
            instances = tiles.iter().map(|t| t.instances().len()).sum::<usize>(),
            "simulated foliage set"
        );

        Ok(Self {
            ecosystem,
            random_seed: config.random_seed,
            tiles,
        })
    }

    pub fn ecosystem(&self) -> &Ecosystem {
        &self.ecosystem
    }

    pub fn tile_size(&self) -> f32 {
        self.ecosystem.tile_size
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Pool index shown at `coord`; stable for a given seed and pool size
    pub fn random_tile_index(&self, coord: TileCoord) -> usize {
        let key = ((coord.x as u64) << 32) | coord.y as u64;
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_seed ^ key);
        rng.gen_range(0..self.tiles.len().max(1))
    }

    pub fn random_tile(&self, coord: TileCoord) -> &Tile {
        &self.tiles[self.random_tile_index(coord)]
    }
}

impl TileSource for FoliageSet {
    fn tile_at(&self, coord: TileCoord) -> &Tile {
        self.random_tile(coord)
    }
}
