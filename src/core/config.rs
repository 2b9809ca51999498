//! Run configuration loaded from TOML
//!
//! ```toml
//! [set]
//! tile_size = 1000.0
//! num_unique_tiles = 4
//! random_seed = 42
//!
//! [spawn]
//! tiles_x = 3
//! tiles_y = 3
//! overlap = 150.0
//!
//! [[species]]
//! name = "oak"
//! collision_radius = 40.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{FoliageError, Result};
use crate::growth::{Ecosystem, GrowthModel};
use crate::projection::SyntheticTerrain;

/// The foliage set: tile pool parameters shared by every spawner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetConfig {
    /// Edge length of one simulated tile (world units)
    pub tile_size: f32,

    /// Number of distinct tiles simulated up front
    ///
    /// Grid cells pick one of these by hashing their coordinate, so a
    /// small pool repeats visibly over large grids.
    pub num_unique_tiles: u32,

    /// Seed of the first pool tile; tile `i` is seeded with `random_seed + i`
    pub random_seed: u64,

    /// Stop every tile after this many steps. Negative values are rejected.
    pub max_steps: Option<i64>,
}

impl Default for SetConfig {
    fn default() -> Self {
        Self {
            tile_size: 1000.0,
            num_unique_tiles: 10,
            random_seed: 42,
            max_steps: None,
        }
    }
}

impl SetConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.tile_size > 0.0 && self.tile_size.is_finite()) {
            return Err(FoliageError::InvalidConfig(format!(
                "tile_size ({}) must be positive",
                self.tile_size
            )));
        }
        if self.num_unique_tiles == 0 {
            return Err(FoliageError::InvalidConfig("num_unique_tiles must be at least 1".into()));
        }
        if let Some(steps) = self.max_steps {
            if steps < 0 || steps > u32::MAX as i64 {
                return Err(FoliageError::InvalidConfig(format!(
                    "max_steps ({}) must be between 0 and {}",
                    steps,
                    u32::MAX
                )));
            }
        }
        Ok(())
    }

    /// Step cap, once validated
    pub fn step_cap(&self) -> Option<u32> {
        self.max_steps.and_then(|s| u32::try_from(s).ok())
    }
}

/// Grid layout and world placement of one spawner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub tiles_x: u32,
    pub tiles_y: u32,

    /// Width of the band cells borrow from their neighbours
    ///
    /// Should be at least the largest instance radius, otherwise instances
    /// can overlap across seams.
    pub overlap: f32,

    /// Half the vertical extent of the projection sweep
    pub half_height: f32,

    /// World position of the grid's corner
    pub origin: [f32; 3],

    /// Grid yaw about +Z, degrees
    pub yaw: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            tiles_x: 1,
            tiles_y: 1,
            overlap: 0.0,
            half_height: 10000.0,
            origin: [0.0; 3],
            yaw: 0.0,
        }
    }
}

impl SpawnConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tiles_x == 0 || self.tiles_y == 0 {
            return Err(FoliageError::InvalidConfig(format!(
                "grid must have at least one tile, got {}x{}",
                self.tiles_x, self.tiles_y
            )));
        }
        if !(self.overlap >= 0.0 && self.overlap.is_finite()) {
            return Err(FoliageError::InvalidConfig(format!(
                "overlap ({}) must be a non-negative number",
                self.overlap
            )));
        }
        if !(self.half_height > 0.0 && self.half_height.is_finite()) {
            return Err(FoliageError::InvalidConfig(format!(
                "half_height ({}) must be positive",
                self.half_height
            )));
        }
        if self.origin.iter().any(|v| !v.is_finite()) || !self.yaw.is_finite() {
            return Err(FoliageError::InvalidConfig("spawn transform must be finite".into()));
        }
        Ok(())
    }
}

/// Complete configuration of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoliageConfig {
    pub set: SetConfig,
    pub spawn: SpawnConfig,
    pub species: Vec<GrowthModel>,
    pub terrain: SyntheticTerrain,
}

impl FoliageConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: FoliageConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.set.validate()?;
        self.spawn.validate()?;
        self.terrain.validate()?;
        for species in &self.species {
            species.validate()?;
        }
        Ok(())
    }

    pub fn ecosystem(&self) -> Ecosystem {
        Ecosystem::new(self.set.tile_size, self.species.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(FoliageConfig::default().validate().is_ok());
    }

    #[test]
    fn test_parse_full_document() {
        let config = FoliageConfig::from_toml(
            r#"
            [set]
            tile_size = 500.0
            num_unique_tiles = 2
            random_seed = 7
            max_steps = 3

            [spawn]
            tiles_x = 2
            tiles_y = 3
            overlap = 60.0
            origin = [100.0, 0.0, 0.0]

            [[species]]
            name = "oak"
            collision_radius = 40.0
            shade_radius = 60.0

            [[species]]
            name = "fern"
            can_grow_in_shade = true
            scale_curve = { kind = "ease_out" }

            [terrain]
            amplitude = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(config.set.tile_size, 500.0);
        assert_eq!(config.set.step_cap(), Some(3));
        assert_eq!(config.spawn.tiles_y, 3);
        assert_eq!(config.spawn.half_height, 10000.0);
        assert_eq!(config.species.len(), 2);
        assert_eq!(config.species[0].shade_radius, 60.0);
        assert!(config.species[1].can_grow_in_shade);
        assert_eq!(config.terrain.amplitude, 0.0);

        let eco = config.ecosystem();
        assert_eq!(eco.tile_size, 500.0);
        assert_eq!(eco.species.len(), 2);
    }

    #[test]
    fn test_negative_max_steps_rejected() {
        let err = FoliageConfig::from_toml("[set]\nmax_steps = -1\n").unwrap_err();
        assert!(matches!(err, FoliageError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_grid_rejected() {
        let err = FoliageConfig::from_toml("[spawn]\ntiles_x = 0\n").unwrap_err();
        assert!(matches!(err, FoliageError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_unique_tiles_rejected() {
        let set = SetConfig { num_unique_tiles: 0, ..SetConfig::default() };
        assert!(set.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_typed_error() {
        let err = FoliageConfig::from_toml("[set\n").unwrap_err();
        assert!(matches!(err, FoliageError::TomlError(_)));
    }

    #[test]
    fn test_negative_overlap_rejected() {
        let spawn = SpawnConfig { overlap: -1.0, ..SpawnConfig::default() };
        assert!(spawn.validate().is_err());
    }
}
