//! Sparse hash grid broadphase for overlap and range queries
//!
//! Entries are bucketed by the cell containing their centre. Queries scan
//! the cells covering the query area grown by the largest radius ever
//! inserted, so lookups stay proportional to local density rather than to
//! the total instance count.
//!
//! Iteration order is fixed: cells are visited row by row (ascending y, then
//! ascending x) and entries within a cell in insertion order. Overlap
//! resolution downstream is order sensitive, so this order is part of the
//! contract.

use std::hash::Hash;

use ahash::AHashMap;
use glam::Vec2;

use crate::core::types::Aabb2;

/// Footprint of an indexed instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BroadphaseEntry {
    pub location: Vec2,
    /// Hard footprint; intersecting collision disks are a collision overlap
    pub collision_radius: f32,
    /// Outer footprint (collision or shade, whichever is larger)
    pub radius: f32,
}

/// How two indexed footprints intersect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlapKind {
    /// Collision disks intersect
    Collision,
    /// Only the outer (shade) disks intersect
    Shade,
}

impl BroadphaseEntry {
    /// Classify the intersection between two footprints, if any.
    /// Disks that only touch do not overlap.
    pub fn classify(&self, other: &BroadphaseEntry) -> Option<OverlapKind> {
        let d2 = self.location.distance_squared(other.location);
        let collision = self.collision_radius + other.collision_radius;
        if d2 < collision * collision {
            return Some(OverlapKind::Collision);
        }
        let outer = self.radius + other.radius;
        if d2 < outer * outer {
            return Some(OverlapKind::Shade);
        }
        None
    }
}

/// Sparse hash grid keyed by instance handle
#[derive(Debug, Clone)]
pub struct Broadphase<K> {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<K>>,
    entries: AHashMap<K, BroadphaseEntry>,
    max_radius: f32,
}

impl<K: Copy + Eq + Hash> Broadphase<K> {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: AHashMap::new(),
            entries: AHashMap::new(),
            max_radius: 0.0,
        }
    }

    /// Broadphase for a tile of `tile_size`, bucketed near the largest
    /// instance footprint but never finer than 1/64th of the tile.
    pub fn for_tile(tile_size: f32, largest_radius: f32) -> Self {
        Self::new((largest_radius * 2.0).max(tile_size / 64.0))
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn cell_coord(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
        self.max_radius = 0.0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: K) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn get(&self, key: K) -> Option<&BroadphaseEntry> {
        self.entries.get(&key)
    }

    /// Index `key`. Callers insert each key at most once between removals.
    pub fn insert(&mut self, key: K, entry: BroadphaseEntry) {
        let coord = self.cell_coord(entry.location);
        self.cells.entry(coord).or_default().push(key);
        self.max_radius = self.max_radius.max(entry.radius);
        self.entries.insert(key, entry);
    }

    pub fn remove(&mut self, key: K) -> Option<BroadphaseEntry> {
        let entry = self.entries.remove(&key)?;
        let coord = self.cell_coord(entry.location);
        if let Some(cell) = self.cells.get_mut(&coord) {
            cell.retain(|&k| k != key);
            if cell.is_empty() {
                self.cells.remove(&coord);
            }
        }
        Some(entry)
    }

    /// Every other indexed entry intersecting `key`'s footprint.
    ///
    /// The result is an owned snapshot; the index may be mutated while the
    /// caller walks it.
    pub fn overlaps_of(&self, key: K) -> Vec<(K, OverlapKind)> {
        let Some(entry) = self.entries.get(&key) else {
            return Vec::new();
        };
        let area = Aabb2::around(entry.location, entry.radius + self.max_radius);

        let mut out = Vec::new();
        self.for_each_in_cells(area, |other_key| {
            if other_key == key {
                return;
            }
            if let Some(kind) = self.entries.get(&other_key).and_then(|other| entry.classify(other)) {
                out.push((other_key, kind));
            }
        });
        out
    }

    /// Entries whose outer disk touches `area`
    pub fn query_box(&self, area: Aabb2) -> Vec<K> {
        let grown = Aabb2::new(
            area.min - Vec2::splat(self.max_radius),
            area.max + Vec2::splat(self.max_radius),
        );
        let mut out = Vec::new();
        self.for_each_in_cells(grown, |key| {
            if let Some(entry) = self.entries.get(&key) {
                if area.intersects_disk(entry.location, entry.radius) {
                    out.push(key);
                }
            }
        });
        out
    }

    /// Visit keys bucketed in cells covering `area` in row-major cell order
    fn for_each_in_cells(&self, area: Aabb2, mut f: impl FnMut(K)) {
        if self.cells.is_empty() {
            return;
        }
        let (min_x, min_y) = self.cell_coord(area.min);
        let (max_x, max_y) = self.cell_coord(area.max);
        let span = (max_x as i64 - min_x as i64 + 1) * (max_y as i64 - min_y as i64 + 1);

        if span > self.cells.len() as i64 {
            // Sparse: walk occupied cells instead of the whole range
            let mut coords: Vec<(i32, i32)> = self
                .cells
                .keys()
                .copied()
                .filter(|&(x, y)| x >= min_x && x <= max_x && y >= min_y && y <= max_y)
                .collect();
            coords.sort_unstable_by_key(|&(x, y)| (y, x));
            for coord in coords {
                for &key in &self.cells[&coord] {
                    f(key);
                }
            }
        } else {
            for cy in min_y..=max_y {
                for cx in min_x..=max_x {
                    if let Some(cell) = self.cells.get(&(cx, cy)) {
                        for &key in cell {
                            f(key);
                        }
                    }
                }
            }
        }
    }
}
