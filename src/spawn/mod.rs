//! Tile pool and grid spawning

pub mod set;
pub mod spawner;

pub use set::FoliageSet;
pub use spawner::{FoliageSpawner, ProgressSink};
