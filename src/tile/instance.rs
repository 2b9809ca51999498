//! A single simulated vegetation instance

use std::sync::Arc;

use glam::{Quat, Vec2, Vec3};

use crate::growth::GrowthModel;
use crate::spatial::BroadphaseEntry;

#[derive(Debug, Clone)]
pub struct Instance {
    /// Tile-local position; Z stays 0 until projected onto a surface
    pub location: Vec3,
    /// Yaw about +Z, radians
    pub rotation: f32,
    pub scale: f32,
    pub age: f32,
    pub species: Arc<GrowthModel>,
    pub normal: Vec3,
    pub alive: bool,
    /// Kept only to reject overlapping neighbours, never emitted
    pub blocker: bool,
}

impl Instance {
    pub fn new(
        location: Vec3,
        rotation: f32,
        scale: f32,
        age: f32,
        species: Arc<GrowthModel>,
        blocker: bool,
    ) -> Self {
        Self {
            location,
            rotation,
            scale,
            age,
            species,
            normal: Vec3::Z,
            alive: true,
            blocker,
        }
    }

    #[inline]
    pub fn location_2d(&self) -> Vec2 {
        self.location.truncate()
    }

    #[inline]
    pub fn collision_radius(&self) -> f32 {
        self.species.collision_radius * self.scale
    }

    #[inline]
    pub fn shade_radius(&self) -> f32 {
        self.species.shade_radius * self.scale
    }

    /// Outer footprint radius at the current scale
    #[inline]
    pub fn max_radius(&self) -> f32 {
        self.species.max_radius() * self.scale
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_z(self.rotation)
    }

    pub fn broadphase_entry(&self) -> BroadphaseEntry {
        BroadphaseEntry {
            location: self.location_2d(),
            collision_radius: self.collision_radius(),
            radius: self.max_radius(),
        }
    }
}
