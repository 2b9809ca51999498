//! Projects simulated 2D instances onto world surfaces
//!
//! Each instance is swept straight down through a vertical window of
//! `2 * half_height` centred on the tile plane. The instance keeps its X/Y
//! and takes the height of whatever it lands on, so projection never moves
//! instances sideways into each other.

use glam::{Quat, Vec3};

use crate::core::types::TileCoord;
use crate::placement::{PlacementRecord, SpawnBatchId};
use crate::projection::geometry::WorldGeometry;
use crate::tile::{Instance, Tile};

/// Placement of a tile's local frame in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileTransform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for TileTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl TileTransform {
    /// Transform with a yaw about +Z, in degrees
    pub fn new(translation: Vec3, yaw_deg: f32) -> Self {
        Self {
            translation,
            rotation: Quat::from_rotation_z(yaw_deg.to_radians()),
        }
    }

    /// Frame of grid cell `coord`, offset along the grid's own axes
    pub fn for_cell(&self, coord: TileCoord, tile_size: f32) -> Self {
        let local = Vec3::new(coord.x as f32 * tile_size, coord.y as f32 * tile_size, 0.0);
        Self {
            translation: self.translation + self.rotation * local,
            rotation: self.rotation,
        }
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * point
    }
}

pub struct SurfaceProjector<'a, W: WorldGeometry + ?Sized> {
    world: &'a W,
    half_height: f32,
}

impl<'a, W: WorldGeometry + ?Sized> SurfaceProjector<'a, W> {
    pub fn new(world: &'a W, half_height: f32) -> Self {
        Self { world, half_height }
    }

    /// Project one instance; `None` when it misses or the surface is unfit
    pub fn project(
        &self,
        instance: &Instance,
        transform: &TileTransform,
        batch: SpawnBatchId,
    ) -> Option<PlacementRecord> {
        let mut start = transform.transform_point(instance.location);
        start.z += self.half_height;
        let mut end = start;
        end.z -= self.half_height * 2.0;

        let hit = self.world.sweep_sphere(start, end, instance.max_radius())?;
        if hit.is_rejected_actor() {
            return None;
        }

        let species = &instance.species;
        let z = hit.impact_point.z;
        if z < species.height_min || z > species.height_max {
            return None;
        }
        if species.min_normal_z() > hit.impact_normal.z {
            return None;
        }

        Some(PlacementRecord {
            batch,
            species: species.name.clone(),
            location: Vec3::new(start.x, start.y, z),
            rotation: transform.rotation * instance.orientation(),
            scale: instance.scale,
            age: instance.age,
            normal: hit.impact_normal,
            base_component: hit.component,
        })
    }

    /// Placements for every emitted instance of a finalized tile, in order
    pub fn create_instances_to_spawn(
        &self,
        tile: &Tile,
        transform: &TileTransform,
        batch: SpawnBatchId,
    ) -> Vec<PlacementRecord> {
        tile.instances()
            .iter()
            .filter(|inst| !inst.blocker)
            .filter_map(|inst| self.project(inst, transform, batch))
            .collect()
    }
}
