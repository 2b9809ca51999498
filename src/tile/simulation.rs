//! Step simulation of a single foliage tile
//!
//! A tile runs strictly sequentially:
//! 1. Step 0 scatters random seeds for every species
//! 2. Every later step ages all instances, then lets them spread seeds
//! 3. Every new instance is checked against its overlaps before it is kept
//!
//! Removal is two-phase. Marking an instance detaches it from the
//! broadphase and flags it dead straight away, so later queries in the same
//! pass never see it, but it stays in the member list until the flush at the
//! end of the step.

use std::f32::consts::TAU;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::error::{FoliageError, Result};
use crate::core::types::Aabb2;
use crate::growth::{accepts_spread, seed_min_distance, seed_offset, Ecosystem, GrowthModel};
use crate::spatial::Broadphase;
use crate::tile::arena::{InstanceArena, InstanceHandle};
use crate::tile::instance::Instance;
use crate::tile::overlap::{domination, Side};

/// Lifecycle of a tile simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    Uninitialized,
    /// Initialized, the next step scatters random seeds
    Seeding,
    /// `step` steps have run
    Growing { step: u32 },
    /// Output array snapshotted
    Finalized,
}

pub struct Tile {
    ecosystem: Option<Ecosystem>,
    rng: ChaCha8Rng,
    simulation_step: u32,
    state: TileState,
    arena: InstanceArena,
    /// Instance set in creation order; this is the iteration order of a step
    members: Vec<InstanceHandle>,
    pending_removals: Vec<InstanceHandle>,
    broadphase: Broadphase<InstanceHandle>,
    output: Vec<Instance>,
}

impl Default for Tile {
    fn default() -> Self {
        Self::new()
    }
}

impl Tile {
    pub fn new() -> Self {
        Self {
            ecosystem: None,
            rng: ChaCha8Rng::seed_from_u64(0),
            simulation_step: 0,
            state: TileState::Uninitialized,
            arena: InstanceArena::new(),
            members: Vec::new(),
            pending_removals: Vec::new(),
            broadphase: Broadphase::new(1.0),
            output: Vec::new(),
        }
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn simulation_step(&self) -> u32 {
        self.simulation_step
    }

    pub fn tile_size(&self) -> Option<f32> {
        self.ecosystem.as_ref().map(|e| e.tile_size)
    }

    /// Reset the tile and prepare a fresh run seeded with `seed`
    pub fn init_simulation(&mut self, ecosystem: &Ecosystem, seed: u64) -> Result<()> {
        ecosystem.validate()?;
        self.empty();
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.simulation_step = 0;
        self.broadphase = Broadphase::for_tile(ecosystem.tile_size, ecosystem.largest_radius());
        self.ecosystem = Some(ecosystem.clone());
        self.state = TileState::Seeding;
        Ok(())
    }

    /// Run one step: seeding on step 0, aging then spreading afterwards
    pub fn step_simulation(&mut self) -> Result<()> {
        let ecosystem = match (&self.state, &self.ecosystem) {
            (TileState::Uninitialized, _) | (_, None) => return Err(FoliageError::NotInitialized),
            (_, Some(ecosystem)) => ecosystem.clone(),
        };

        if self.simulation_step == 0 {
            self.add_random_seeds(&ecosystem);
        } else {
            self.age_seeds();
            self.spread_seeds();
        }
        self.flush_pending_removals();

        self.simulation_step += 1;
        self.state = TileState::Growing { step: self.simulation_step };
        Ok(())
    }

    /// Run the whole simulation and snapshot the result.
    ///
    /// Runs until every species has used its step budget, or for
    /// `max_steps` steps if that is smaller.
    pub fn simulate(&mut self, ecosystem: &Ecosystem, seed: u64, max_steps: Option<u32>) -> Result<()> {
        self.init_simulation(ecosystem, seed)?;

        let mut steps = ecosystem.total_steps();
        if let Some(cap) = max_steps {
            steps = steps.min(cap);
        }

        for _ in 0..steps {
            self.step_simulation()?;
        }

        self.instances_to_array();
        tracing::debug!(
            seed,
            steps,
            instances = self.output.len(),
            "tile simulation complete"
        );
        Ok(())
    }

    /// Snapshot alive, non-blocker instances into the output array
    pub fn instances_to_array(&mut self) {
        self.output = self
            .members
            .iter()
            .filter_map(|&h| self.arena.get(h))
            .filter(|inst| inst.alive && !inst.blocker)
            .cloned()
            .collect();
        self.state = TileState::Finalized;
    }

    /// Output array produced by the last [`Tile::instances_to_array`]
    pub fn instances(&self) -> &[Instance] {
        &self.output
    }

    pub fn alive_instances(&self) -> impl Iterator<Item = &Instance> + '_ {
        self.members
            .iter()
            .filter_map(|&h| self.arena.get(h))
            .filter(|inst| inst.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive_instances().count()
    }

    pub fn index_len(&self) -> usize {
        self.broadphase.len()
    }

    /// Every alive member is indexed and every indexed handle is an alive member
    pub fn check_index_consistency(&self) -> bool {
        let mut alive = 0;
        for &h in &self.members {
            let Some(inst) = self.arena.get(h) else {
                return false;
            };
            if inst.alive != self.broadphase.contains(h) {
                return false;
            }
            if inst.alive {
                alive += 1;
            }
        }
        alive == self.broadphase.len()
    }

    /// Destroy every instance and return to the uninitialized state
    pub fn empty(&mut self) {
        self.broadphase.clear();
        self.arena.clear();
        self.members.clear();
        self.pending_removals.clear();
        self.output.clear();
        self.simulation_step = 0;
        self.state = TileState::Uninitialized;
    }

    /// Copies of alive instances touching `area`.
    ///
    /// With `on_border` false only instances whose whole footprint lies
    /// inside `area` are returned.
    pub fn instances_in_box(&self, area: Aabb2, on_border: bool) -> Vec<Instance> {
        self.broadphase
            .query_box(area)
            .into_iter()
            .filter_map(|h| self.arena.get(h))
            .filter(|inst| on_border || area.contains_disk(inst.location_2d(), inst.max_radius()))
            .cloned()
            .collect()
    }

    /// Copy foreign instances into this tile, translated by `offset`.
    ///
    /// `inner` is expressed in the source frame. Copies whose centre falls
    /// outside it (half-open) become blockers: they reject overlapping
    /// instances here but are never emitted, another cell owns them.
    pub fn add_instances(&mut self, instances: &[Instance], offset: Vec2, inner: Aabb2) -> Result<()> {
        if self.ecosystem.is_none() {
            return Err(FoliageError::NotInitialized);
        }
        for inst in instances {
            let blocker = !inner.contains_point_half_open(inst.location_2d());
            let location = inst.location + offset.extend(0.0);
            self.new_seed(
                location,
                inst.rotation,
                inst.scale,
                inst.species.clone(),
                inst.age,
                blocker,
            );
        }
        self.flush_pending_removals();
        Ok(())
    }

    fn random_yaw(&mut self) -> f32 {
        self.rng.gen::<f32>() * TAU
    }

    fn add_random_seeds(&mut self, ecosystem: &Ecosystem) {
        let tile_size = ecosystem.tile_size;
        for species in &ecosystem.species {
            let count = species.seeds_for_tile(tile_size);
            for _ in 0..count {
                let x = self.rng.gen::<f32>() * tile_size;
                let y = self.rng.gen::<f32>() * tile_size;
                let age = species.initial_age(&mut self.rng);
                let scale = species.scale_for_age(age);
                let rotation = self.random_yaw();
                self.new_seed(Vec3::new(x, y, 0.0), rotation, scale, species.clone(), age, false);
            }
        }
    }

    /// Aging is death and rebirth: the grown instance re-runs overlap
    /// resolution with its larger footprint.
    fn age_seeds(&mut self) {
        let snapshot = self.members.clone();
        for h in snapshot {
            let Some(inst) = self.arena.get(h) else { continue };
            if !inst.alive || self.simulation_step > inst.species.num_steps {
                continue;
            }
            let species = inst.species.clone();
            let location = inst.location;
            let rotation = inst.rotation;
            let blocker = inst.blocker;
            let age = species.next_age(inst.age, 1);
            let scale = species.scale_for_age(age);

            self.mark_pending_removal(h);
            self.new_seed(location, rotation, scale, species, age, blocker);
        }
        self.flush_pending_removals();
    }

    fn spread_seeds(&mut self) {
        let snapshot = self.members.clone();
        for h in snapshot {
            let Some(inst) = self.arena.get(h) else { continue };
            if !inst.alive || self.simulation_step > inst.species.num_steps {
                continue;
            }
            let species = inst.species.clone();
            let parent_location = inst.location;
            let parent_age = inst.age;

            for _ in 0..species.seeds_per_step {
                // A seed dropped earlier this step may have dominated its parent
                if !self.is_alive(h) {
                    break;
                }
                let age = species.initial_age(&mut self.rng);
                let scale = species.scale_for_age(age);
                let min_distance = seed_min_distance(&species, parent_age, age, self.simulation_step);
                let offset = seed_offset(&mut self.rng, &species, min_distance);

                if accepts_spread(offset, min_distance) {
                    let rotation = self.random_yaw();
                    self.new_seed(parent_location + offset, rotation, scale, species.clone(), age, false);
                }
            }
        }
    }

    fn is_alive(&self, h: InstanceHandle) -> bool {
        self.arena.get(h).map_or(false, |inst| inst.alive)
    }

    /// Insert a candidate and resolve its overlaps. A rejected candidate is
    /// already marked for removal and is destroyed by the next flush.
    fn new_seed(
        &mut self,
        location: Vec3,
        rotation: f32,
        scale: f32,
        species: Arc<GrowthModel>,
        age: f32,
        blocker: bool,
    ) -> Option<InstanceHandle> {
        let instance = Instance::new(location, rotation, scale, age, species, blocker);
        let entry = instance.broadphase_entry();
        let handle = self.arena.insert(instance);
        self.members.push(handle);
        self.broadphase.insert(handle, entry);

        self.handle_overlaps(handle).then_some(handle)
    }

    /// The new instance dies if anything it overlaps dominates it.
    /// Otherwise everything it dominates is marked for removal.
    ///
    /// Because removals are deferred, three or more mutually overlapping
    /// instances resolve in broadphase order.
    fn handle_overlaps(&mut self, handle: InstanceHandle) -> bool {
        let overlaps = self.broadphase.overlaps_of(handle);
        let Some(inst) = self.arena.get(handle) else {
            return false;
        };

        let mut rejected = false;
        let mut dominated = Vec::new();
        for (other, kind) in overlaps {
            let Some(other_inst) = self.arena.get(other) else { continue };
            match domination(inst, other_inst, kind) {
                Some(Side::A) => {
                    rejected = true;
                    break;
                }
                Some(Side::B) => dominated.push(other),
                None => {}
            }
        }

        if rejected {
            self.mark_pending_removal(handle);
            return false;
        }
        for other in dominated {
            self.mark_pending_removal(other);
        }
        true
    }

    fn mark_pending_removal(&mut self, h: InstanceHandle) {
        if let Some(inst) = self.arena.get_mut(h) {
            if inst.alive {
                inst.alive = false;
                self.broadphase.remove(h);
                self.pending_removals.push(h);
            }
        }
    }

    fn flush_pending_removals(&mut self) {
        if self.pending_removals.is_empty() {
            return;
        }
        for h in std::mem::take(&mut self.pending_removals) {
            self.arena.remove(h);
        }
        let arena = &self.arena;
        self.members.retain(|&h| arena.get(h).is_some());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::ScaleCurve;

    fn small_species() -> GrowthModel {
        GrowthModel {
            collision_radius: 1.0,
            shade_radius: 1.0,
            initial_seed_density: 2.0,
            seeds_per_step: 0,
            num_steps: 5,
            max_age: 10.0,
            scale_min: 1.0,
            scale_max: 2.0,
            ..GrowthModel::new("moss")
        }
    }

    fn one_species(model: GrowthModel) -> Ecosystem {
        Ecosystem::new(1000.0, vec![model])
    }

    #[test]
    fn test_step_before_init_fails() {
        let mut tile = Tile::new();
        assert!(matches!(tile.step_simulation(), Err(FoliageError::NotInitialized)));
    }

    #[test]
    fn test_init_rejects_invalid_tile_size() {
        let mut tile = Tile::new();
        let eco = Ecosystem::new(0.0, vec![small_species()]);
        assert!(matches!(tile.init_simulation(&eco, 1), Err(FoliageError::InvalidConfig(_))));
        assert_eq!(tile.state(), TileState::Uninitialized);
    }

    #[test]
    fn test_state_transitions() {
        let eco = one_species(small_species());
        let mut tile = Tile::new();
        tile.init_simulation(&eco, 5).unwrap();
        assert_eq!(tile.state(), TileState::Seeding);
        tile.step_simulation().unwrap();
        assert_eq!(tile.state(), TileState::Growing { step: 1 });
        tile.instances_to_array();
        assert_eq!(tile.state(), TileState::Finalized);
        tile.empty();
        assert_eq!(tile.state(), TileState::Uninitialized);
        assert_eq!(tile.alive_count(), 0);
        assert_eq!(tile.index_len(), 0);
    }

    #[test]
    fn test_seeding_only_places_expected_count() {
        let eco = one_species(small_species());
        let mut tile = Tile::new();
        tile.simulate(&eco, 42, Some(1)).unwrap();
        assert!(tile.instances().len() <= 4);
        assert!(tile.check_index_consistency());
    }

    #[test]
    fn test_aging_grows_in_place() {
        let eco = one_species(small_species());
        let mut tile = Tile::new();
        tile.init_simulation(&eco, 9).unwrap();
        tile.step_simulation().unwrap();
        let before: Vec<(Vec3, f32)> = tile.alive_instances().map(|i| (i.location, i.age)).collect();
        tile.step_simulation().unwrap();
        let after: Vec<(Vec3, f32)> = tile.alive_instances().map(|i| (i.location, i.age)).collect();

        assert_eq!(before.len(), after.len());
        for ((loc_a, age_a), (loc_b, age_b)) in before.iter().zip(after.iter()) {
            assert_eq!(loc_a, loc_b);
            assert_eq!(*age_b, age_a + 1.0);
        }
    }

    #[test]
    fn test_overlapping_newcomer_is_rejected() {
        let eco = one_species(small_species());
        let mut tile = Tile::new();
        tile.init_simulation(&eco, 1).unwrap();
        let species = eco.species[0].clone();

        let old = tile.new_seed(Vec3::new(100.0, 100.0, 0.0), 0.0, 1.0, species.clone(), 5.0, false);
        assert!(old.is_some());
        let young = tile.new_seed(Vec3::new(100.5, 100.0, 0.0), 0.0, 1.0, species.clone(), 1.0, false);
        assert!(young.is_none());
        tile.flush_pending_removals();

        assert_eq!(tile.alive_count(), 1);
        assert!(tile.check_index_consistency());
    }

    #[test]
    fn test_dominant_newcomer_evicts_neighbours() {
        let eco = one_species(small_species());
        let mut tile = Tile::new();
        tile.init_simulation(&eco, 1).unwrap();
        let species = eco.species[0].clone();

        let a = tile.new_seed(Vec3::new(10.0, 10.0, 0.0), 0.0, 1.0, species.clone(), 1.0, false).unwrap();
        let b = tile.new_seed(Vec3::new(13.5, 10.0, 0.0), 0.0, 1.0, species.clone(), 1.0, false).unwrap();
        let big = tile.new_seed(Vec3::new(11.75, 10.0, 0.0), 0.0, 1.0, species, 8.0, false);
        assert!(big.is_some());
        assert!(!tile.is_alive(a));
        assert!(!tile.is_alive(b));

        tile.flush_pending_removals();
        assert_eq!(tile.alive_count(), 1);
        assert!(tile.check_index_consistency());
    }

    fn parent_tile(model: GrowthModel, seed: u64) -> (Tile, InstanceHandle) {
        let eco = one_species(model);
        let mut tile = Tile::new();
        tile.init_simulation(&eco, seed).unwrap();
        let species = eco.species[0].clone();
        let parent = tile
            .new_seed(Vec3::new(500.0, 500.0, 0.0), 0.0, species.scale_for_age(0.0), species, 0.0, false)
            .unwrap();
        tile.simulation_step = 1;
        (tile, parent)
    }

    #[test]
    fn test_spread_children_clear_parent() {
        let (mut tile, parent) = parent_tile(
            GrowthModel {
                collision_radius: 0.1,
                shade_radius: 0.1,
                seeds_per_step: 3,
                average_spread_distance: 200.0,
                spread_variance: 0.0,
                max_initial_age: 1.0,
                ..GrowthModel::new("thistle")
            },
            21,
        );
        tile.spread_seeds();
        tile.flush_pending_removals();

        let parent_inst = tile.arena.get(parent).unwrap().clone();
        let children: Vec<&Instance> = tile
            .alive_instances()
            .filter(|i| i.location != parent_inst.location)
            .collect();
        assert_eq!(children.len(), 3);
        for child in children {
            let clearance = seed_min_distance(&child.species, parent_inst.age, child.age, 1);
            let distance = child.location_2d().distance(parent_inst.location_2d());
            assert!(distance + 1e-3 >= clearance, "{} < {}", distance, clearance);
            assert!((distance - clearance - 200.0).abs() < 1e-2, "distance {}", distance);
        }
    }

    #[test]
    fn test_dominated_parent_stops_spreading() {
        // Scale shrinks with age, so projected clearance is far below the
        // current footprints and the first (older) seed lands on its parent.
        let (mut tile, parent) = parent_tile(
            GrowthModel {
                collision_radius: 10.0,
                shade_radius: 10.0,
                seeds_per_step: 3,
                average_spread_distance: 0.0,
                spread_variance: 0.0,
                max_initial_age: 1.0,
                scale_min: 0.01,
                scale_max: 1.0,
                scale_curve: ScaleCurve::Points { points: vec![[0.0, 1.0], [1.0, 0.0]] },
                ..GrowthModel::new("nettle")
            },
            4,
        );
        tile.spread_seeds();

        assert!(!tile.is_alive(parent));
        // parent plus the single seed attempted before it died
        assert_eq!(tile.members.len(), 2);
        tile.flush_pending_removals();
        assert_eq!(tile.alive_count(), 1);
        assert!(tile.check_index_consistency());
    }

    #[test]
    fn test_instances_in_box_strict_and_border() {
        let eco = one_species(small_species());
        let mut tile = Tile::new();
        tile.init_simulation(&eco, 1).unwrap();
        let species = eco.species[0].clone();
        tile.new_seed(Vec3::new(5.0, 5.0, 0.0), 0.0, 1.0, species.clone(), 0.0, false);
        tile.new_seed(Vec3::new(9.5, 5.0, 0.0), 0.0, 1.0, species, 0.0, false);

        let area = Aabb2::new(Vec2::ZERO, Vec2::splat(10.0));
        assert_eq!(tile.instances_in_box(area, false).len(), 1);
        assert_eq!(tile.instances_in_box(area, true).len(), 2);
    }

    #[test]
    fn test_add_instances_marks_outside_as_blockers() {
        let eco = one_species(small_species());
        let species = eco.species[0].clone();
        let inside = Instance::new(Vec3::new(20.0, 20.0, 0.0), 0.3, 1.0, 2.0, species.clone(), false);
        let outside = Instance::new(Vec3::new(80.0, 20.0, 0.0), 0.6, 1.0, 2.0, species, false);

        let mut tile = Tile::new();
        tile.init_simulation(&eco, 3).unwrap();
        let inner = Aabb2::new(Vec2::ZERO, Vec2::splat(50.0));
        tile.add_instances(&[inside, outside], Vec2::new(100.0, 0.0), inner).unwrap();

        let copies: Vec<&Instance> = tile.alive_instances().collect();
        assert_eq!(copies.len(), 2);
        assert_eq!(copies[0].location, Vec3::new(120.0, 20.0, 0.0));
        assert!(!copies[0].blocker);
        assert_eq!(copies[0].rotation, 0.3);
        assert!(copies[1].blocker);

        tile.instances_to_array();
        assert_eq!(tile.instances().len(), 1);
    }
}
