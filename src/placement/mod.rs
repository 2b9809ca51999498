//! Placement output: records, stores and the JSON file format

pub mod file;
pub mod record;
pub mod store;

pub use file::{PlacementFile, PlacementMetadata, PLACEMENT_FILE_VERSION};
pub use record::{PlacementRecord, SpawnBatchId};
pub use store::{InMemoryPlacementStore, PlacementStore};
