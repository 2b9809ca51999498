//! Seed dispersal sampling

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::growth::species::GrowthModel;

/// Smallest value substituted for a zero uniform sample
pub const SMALL_NUMBER: f32 = 1.0e-8;

/// Z-score clip for spread distances; about 10% of samples land on the bound
pub const MAX_Z_SCORE: f32 = 1.64;

/// Standard normal sample via the Box-Muller transform
pub fn random_gaussian<R: Rng>(rng: &mut R) -> f32 {
    let u1 = rng.gen::<f32>().max(SMALL_NUMBER);
    let u2 = rng.gen::<f32>().max(SMALL_NUMBER);
    (-2.0 * u1.ln()).sqrt() * (u2 * TAU).cos()
}

/// Clearance needed between a parent and a new seed so that neither
/// intrudes on the other once both have grown to maturity.
///
/// The horizon is `max_age - simulation_step`, truncated to whole steps.
pub fn seed_min_distance(
    model: &GrowthModel,
    parent_age: f32,
    seed_age: f32,
    simulation_step: u32,
) -> f32 {
    let steps_left = model.max_age as i64 - simulation_step as i64;
    let parent_max_age = model.next_age(parent_age, steps_left);
    let seed_max_age = model.next_age(seed_age, steps_left);

    let parent_radius = model.scale_for_age(parent_max_age) * model.max_radius();
    let seed_radius = model.scale_for_age(seed_max_age) * model.max_radius();
    parent_radius + seed_radius
}

/// Samples a horizontal offset from a parent for a new seed.
///
/// The distance is `min_distance + average_spread_distance` plus a clipped
/// normal variation scaled so the clip bound maps to `spread_variance`.
pub fn seed_offset<R: Rng>(rng: &mut R, model: &GrowthModel, min_distance: f32) -> Vec3 {
    let z = random_gaussian(rng).clamp(-MAX_Z_SCORE, MAX_Z_SCORE);
    let variation = z * model.spread_variance / MAX_Z_SCORE;
    let average = min_distance + model.average_spread_distance;

    let angle = rng.gen::<f32>().max(SMALL_NUMBER) * TAU;
    Vec3::new(angle.cos(), angle.sin(), 0.0) * (average + variation)
}

/// Relative slack on the squared clearance so that an offset sampled at
/// exactly the minimum distance survives f32 rounding
const ACCEPT_TOLERANCE: f32 = 1.0e-5;

/// A spread offset is kept when it clears the minimum distance; equality
/// counts as clearing.
#[inline]
pub fn accepts_spread(offset: Vec3, min_distance: f32) -> bool {
    let min_sq = min_distance * min_distance;
    offset.truncate().length_squared() >= min_sq - ACCEPT_TOLERANCE * min_sq.max(1.0)
}
