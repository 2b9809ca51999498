pub mod config;
pub mod error;
pub mod types;

pub use config::{FoliageConfig, SetConfig, SpawnConfig};
pub use error::{FoliageError, Result};
pub use types::{Aabb2, TileCoord};
