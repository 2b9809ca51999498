//! Core type definitions used throughout the codebase

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Position of a tile cell within the spawn grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned 2D box in tile-local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb2 {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box centred on `center` extending `half_extent` in both axes
    pub fn around(center: Vec2, half_extent: f32) -> Self {
        let h = Vec2::splat(half_extent);
        Self { min: center - h, max: center + h }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Grow the box so that it contains `point`
    pub fn include_point(&mut self, point: Vec2) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self { min: self.min + offset, max: self.max + offset }
    }

    /// Closed containment test
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Half-open containment `[min, max)`; adjacent boxes partition the plane
    #[inline]
    pub fn contains_point_half_open(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// True when the whole disk lies inside the box (edges inclusive)
    #[inline]
    pub fn contains_disk(&self, center: Vec2, radius: f32) -> bool {
        center.x - radius >= self.min.x
            && center.x + radius <= self.max.x
            && center.y - radius >= self.min.y
            && center.y + radius <= self.max.y
    }

    /// True when the disk touches the box
    #[inline]
    pub fn intersects_disk(&self, center: Vec2, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }
}
