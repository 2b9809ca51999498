//! Per-species growth parameters
//!
//! A [`GrowthModel`] is immutable for the duration of a simulation and is
//! shared read-only (through `Arc`) by every instance of that species in
//! every tile.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{FoliageError, Result};
use crate::growth::curve::ScaleCurve;

/// Growth and placement parameters for one vegetation species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthModel {
    /// Species name, carried into placement output
    pub name: String,

    // === FOOTPRINT ===
    /// Radius other instances may not intrude into (at scale 1.0)
    pub collision_radius: f32,
    /// Radius of the canopy shade (at scale 1.0)
    pub shade_radius: f32,
    /// Instances of this species survive being shaded by fitter neighbours
    pub can_grow_in_shade: bool,
    /// Higher priority wins overlaps before age and scale are compared
    pub overlap_priority: i32,

    // === POPULATION DYNAMICS ===
    /// Number of growth steps after the initial seeding step
    pub num_steps: u32,
    /// Square root of the expected seed count per 1000x1000 area
    pub initial_seed_density: f32,
    /// Mean distance a seed travels beyond the minimum clearance
    pub average_spread_distance: f32,
    /// Maximum deviation from the mean spread distance
    pub spread_variance: f32,
    /// Seeds each alive instance attempts per growth step
    pub seeds_per_step: u32,

    // === AGING ===
    /// Age at which growth stops
    pub max_age: f32,
    /// New seeds start with an age uniform in `[0, max_initial_age)`
    pub max_initial_age: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    pub scale_curve: ScaleCurve,

    // === SURFACE CONSTRAINTS ===
    pub height_min: f32,
    pub height_max: f32,
    /// Steepest accepted ground, in degrees from horizontal
    pub ground_slope: f32,
}

impl Default for GrowthModel {
    fn default() -> Self {
        Self {
            name: "foliage".to_string(),
            collision_radius: 100.0,
            shade_radius: 100.0,
            can_grow_in_shade: false,
            overlap_priority: 0,
            num_steps: 3,
            initial_seed_density: 1.0,
            average_spread_distance: 50.0,
            spread_variance: 150.0,
            seeds_per_step: 3,
            max_age: 10.0,
            max_initial_age: 0.0,
            scale_min: 1.0,
            scale_max: 3.0,
            scale_curve: ScaleCurve::Linear,
            height_min: -262_144.0,
            height_max: 262_144.0,
            ground_slope: 45.0,
        }
    }
}

impl GrowthModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Largest footprint radius at scale 1.0
    #[inline]
    pub fn max_radius(&self) -> f32 {
        self.collision_radius.max(self.shade_radius)
    }

    #[inline]
    pub fn seed_density_squared(&self) -> f32 {
        self.initial_seed_density * self.initial_seed_density
    }

    /// Number of seeds placed on a square tile of the given edge length
    pub fn seeds_for_tile(&self, tile_size: f32) -> usize {
        let area_factor = (tile_size * tile_size) / (1000.0 * 1000.0);
        let expected = self.seed_density_squared() * area_factor;
        if expected > 0.0 {
            expected.ceil() as usize
        } else {
            0
        }
    }

    /// Samples the age of a freshly dropped seed
    pub fn initial_age<R: Rng>(&self, rng: &mut R) -> f32 {
        rng.gen::<f32>() * self.max_initial_age
    }

    /// Advances `age` by up to `steps` whole years without passing `max_age`
    pub fn next_age(&self, age: f32, steps: i64) -> f32 {
        if steps <= 0 || age + 1.0 > self.max_age {
            return age;
        }
        let room = (self.max_age - age).floor() as i64;
        age + room.min(steps) as f32
    }

    pub fn scale_for_age(&self, age: f32) -> f32 {
        let t = if self.max_age == 0.0 {
            1.0
        } else {
            (age / self.max_age).clamp(0.0, 1.0)
        };
        self.scale_min + (self.scale_max - self.scale_min) * self.scale_curve.eval(t)
    }

    /// Cosine of the ground slope limit, compared against hit normal Z
    pub fn min_normal_z(&self) -> f32 {
        self.ground_slope.to_radians().cos()
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> {
            Err(FoliageError::InvalidConfig(format!("{}: {}", self.name, msg)))
        };

        if !(self.collision_radius >= 0.0 && self.shade_radius >= 0.0) {
            return invalid("radii must be non-negative".into());
        }
        if self.max_radius() <= 0.0 {
            return invalid("at least one of collision_radius/shade_radius must be positive".into());
        }
        if !(self.initial_seed_density >= 0.0) {
            return invalid(format!("initial_seed_density ({}) must be non-negative", self.initial_seed_density));
        }
        if !(self.spread_variance >= 0.0 && self.average_spread_distance >= 0.0) {
            return invalid("spread distances must be non-negative".into());
        }
        if !(self.max_age >= 0.0 && self.max_initial_age >= 0.0) {
            return invalid("ages must be non-negative".into());
        }
        if !(self.scale_min > 0.0 && self.scale_max >= self.scale_min) {
            return invalid(format!(
                "scale range ({}, {}) must be positive and ordered",
                self.scale_min, self.scale_max
            ));
        }
        if !self.scale_curve.is_well_formed() {
            return invalid("scale curve keys must be sorted and non-empty".into());
        }
        if self.height_min > self.height_max {
            return invalid(format!(
                "height_min ({}) exceeds height_max ({})",
                self.height_min, self.height_max
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_next_age_stops_at_max() {
        let model = GrowthModel { max_age: 5.0, ..GrowthModel::default() };
        assert_eq!(model.next_age(0.0, 1), 1.0);
        assert_eq!(model.next_age(0.0, 3), 3.0);
        assert_eq!(model.next_age(3.5, 10), 4.5);
        assert_eq!(model.next_age(4.5, 1), 4.5);
        assert_eq!(model.next_age(2.0, 0), 2.0);
        assert_eq!(model.next_age(2.0, -3), 2.0);
    }

    #[test]
    fn test_scale_for_age_follows_curve() {
        let model = GrowthModel {
            max_age: 10.0,
            scale_min: 1.0,
            scale_max: 3.0,
            ..GrowthModel::default()
        };
        assert_eq!(model.scale_for_age(0.0), 1.0);
        assert_eq!(model.scale_for_age(5.0), 2.0);
        assert_eq!(model.scale_for_age(50.0), 3.0);
    }

    #[test]
    fn test_scale_for_zero_max_age_is_full_grown() {
        let model = GrowthModel { max_age: 0.0, ..GrowthModel::default() };
        assert_eq!(model.scale_for_age(0.0), model.scale_max);
    }

    #[test]
    fn test_seeds_for_tile() {
        let model = GrowthModel { initial_seed_density: 2.0, ..GrowthModel::default() };
        assert_eq!(model.seeds_for_tile(1000.0), 4);
        assert_eq!(model.seeds_for_tile(500.0), 1);
        let none = GrowthModel { initial_seed_density: 0.0, ..GrowthModel::default() };
        assert_eq!(none.seeds_for_tile(1000.0), 0);
    }

    #[test]
    fn test_initial_age_in_range() {
        let model = GrowthModel { max_initial_age: 4.0, ..GrowthModel::default() };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let age = model.initial_age(&mut rng);
            assert!((0.0..4.0).contains(&age));
        }
    }

    #[test]
    fn test_validate_rejects_inverted_scale() {
        let model = GrowthModel { scale_min: 2.0, scale_max: 1.0, ..GrowthModel::default() };
        assert!(matches!(model.validate(), Err(FoliageError::InvalidConfig(_))));
        assert!(GrowthModel::default().validate().is_ok());
    }
}
