//! The species mix a tile is simulated with

use std::sync::Arc;

use crate::core::error::{FoliageError, Result};
use crate::growth::species::GrowthModel;

/// Tile edge length plus the species growing on it
#[derive(Debug, Clone)]
pub struct Ecosystem {
    pub tile_size: f32,
    pub species: Vec<Arc<GrowthModel>>,
}

impl Ecosystem {
    pub fn new(tile_size: f32, species: Vec<GrowthModel>) -> Self {
        Self {
            tile_size,
            species: species.into_iter().map(Arc::new).collect(),
        }
    }

    /// Steps needed for every species to use up its growth budget
    pub fn total_steps(&self) -> u32 {
        self.species
            .iter()
            .map(|s| s.num_steps + 1)
            .max()
            .unwrap_or(0)
    }

    /// Largest footprint any instance can reach
    pub fn largest_radius(&self) -> f32 {
        self.species
            .iter()
            .map(|s| s.max_radius() * s.scale_max.max(s.scale_min))
            .fold(0.0, f32::max)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tile_size > 0.0 && self.tile_size.is_finite()) {
            return Err(FoliageError::InvalidConfig(format!(
                "tile_size ({}) must be positive",
                self.tile_size
            )));
        }
        for species in &self.species {
            species.validate()?;
        }
        Ok(())
    }
}
