//! World geometry the projector sweeps against

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifies a surface component instances can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub u32);

/// What kind of actor a sweep hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// Ordinary ground instances may rest on
    Surface,
    /// Volume that forbids procedural placement underneath it
    BlockingVolume,
    /// Actor holding already placed foliage
    FoliageManager,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitActor {
    pub id: u32,
    pub kind: ActorKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub impact_point: Vec3,
    pub impact_normal: Vec3,
    pub actor: Option<HitActor>,
    pub component: Option<ComponentId>,
}

impl SurfaceHit {
    /// Hits that must never receive procedural foliage
    pub fn is_rejected_actor(&self) -> bool {
        matches!(
            self.actor.map(|a| a.kind),
            Some(ActorKind::BlockingVolume | ActorKind::FoliageManager)
        )
    }
}

/// Read-only world queried from many cells at once
pub trait WorldGeometry: Sync {
    /// First blocking hit of a sphere of `radius` swept from `start` to `end`
    fn sweep_sphere(&self, start: Vec3, end: Vec3, radius: f32) -> Option<SurfaceHit>;
}
