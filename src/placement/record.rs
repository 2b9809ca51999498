//! Placement records handed to the external instancing layer

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::projection::ComponentId;

/// Token tagging every record produced by one spawner, so a respawn can
/// clear the previous batch first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpawnBatchId(pub Uuid);

impl SpawnBatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SpawnBatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SpawnBatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One instance ready to spawn, in world space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub batch: SpawnBatchId,
    /// Species name
    pub species: String,
    pub location: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    pub age: f32,
    /// Surface normal at the impact point
    pub normal: Vec3,
    /// Surface component the instance rests on
    #[serde(default)]
    pub base_component: Option<ComponentId>,
}
