//! Projecting simulated instances onto world geometry

pub mod geometry;
pub mod projector;
pub mod terrain;

pub use geometry::{ActorKind, ComponentId, HitActor, SurfaceHit, WorldGeometry};
pub use projector::{SurfaceProjector, TileTransform};
pub use terrain::{BlockingVolume, SyntheticTerrain};
