//! Tile simulation: instance storage, overlap rules and the step loop

pub mod arena;
pub mod instance;
pub mod overlap;
pub mod simulation;

pub use arena::{InstanceArena, InstanceHandle};
pub use instance::Instance;
pub use overlap::{domination, Side};
pub use simulation::{Tile, TileState};
