//! Analytic rolling terrain with optional blocking volumes
//!
//! Stands in for a real scene when running from the command line. Sweeps
//! are resolved along the sphere's centre line.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::error::{FoliageError, Result};
use crate::core::types::Aabb2;
use crate::projection::geometry::{ActorKind, ComponentId, HitActor, SurfaceHit, WorldGeometry};

const TERRAIN_ACTOR: u32 = 0;
const TERRAIN_COMPONENT: ComponentId = ComponentId(0);

/// Footprint that rejects placement below `top`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockingVolume {
    pub min: [f32; 2],
    pub max: [f32; 2],
    pub top: f32,
}

impl BlockingVolume {
    fn area(&self) -> Aabb2 {
        Aabb2::new(Vec2::from(self.min), Vec2::from(self.max))
    }
}

/// `height(x, y) = base_height + amplitude * sin(kx) * cos(ky)` with
/// `k = 2π / wavelength`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticTerrain {
    pub base_height: f32,
    pub amplitude: f32,
    pub wavelength: f32,
    pub blocking_volumes: Vec<BlockingVolume>,
}

impl Default for SyntheticTerrain {
    fn default() -> Self {
        Self {
            base_height: 0.0,
            amplitude: 200.0,
            wavelength: 4000.0,
            blocking_volumes: Vec::new(),
        }
    }
}

impl SyntheticTerrain {
    pub fn flat(height: f32) -> Self {
        Self {
            base_height: height,
            amplitude: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.wavelength > 0.0 && self.wavelength.is_finite()) {
            return Err(FoliageError::InvalidConfig(format!(
                "terrain wavelength ({}) must be positive",
                self.wavelength
            )));
        }
        if !self.amplitude.is_finite() || !self.base_height.is_finite() {
            return Err(FoliageError::InvalidConfig("terrain heights must be finite".into()));
        }
        Ok(())
    }

    fn frequency(&self) -> f32 {
        TAU / self.wavelength
    }

    pub fn height_at(&self, x: f32, y: f32) -> f32 {
        let k = self.frequency();
        self.base_height + self.amplitude * (k * x).sin() * (k * y).cos()
    }

    pub fn normal_at(&self, x: f32, y: f32) -> Vec3 {
        let k = self.frequency();
        let dx = self.amplitude * k * (k * x).cos() * (k * y).cos();
        let dy = -self.amplitude * k * (k * x).sin() * (k * y).sin();
        Vec3::new(-dx, -dy, 1.0).normalize()
    }
}

impl WorldGeometry for SyntheticTerrain {
    fn sweep_sphere(&self, start: Vec3, end: Vec3, _radius: f32) -> Option<SurfaceHit> {
        let (high, low) = (start.z.max(end.z), start.z.min(end.z));
        let ground = self.height_at(start.x, start.y);
        let point = start.truncate();

        // Highest surface under the ray is hit first
        let volume = self
            .blocking_volumes
            .iter()
            .enumerate()
            .filter(|(_, v)| v.area().contains_point(point) && v.top > ground && v.top <= high && v.top >= low)
            .max_by(|(_, a), (_, b)| a.top.total_cmp(&b.top));

        if let Some((index, v)) = volume {
            return Some(SurfaceHit {
                impact_point: point.extend(v.top),
                impact_normal: Vec3::Z,
                actor: Some(HitActor {
                    id: index as u32 + 1,
                    kind: ActorKind::BlockingVolume,
                }),
                component: None,
            });
        }

        if ground > high || ground < low {
            return None;
        }
        Some(SurfaceHit {
            impact_point: point.extend(ground),
            impact_normal: self.normal_at(start.x, start.y),
            actor: Some(HitActor {
                id: TERRAIN_ACTOR,
                kind: ActorKind::Surface,
            }),
            component: Some(TERRAIN_COMPONENT),
        })
    }
}
