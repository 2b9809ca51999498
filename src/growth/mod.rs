//! Species growth models
//!
//! Pure functions of age and species constants: how big an instance is at a
//! given age, how it ages per step, and where its seeds land.

pub mod curve;
pub mod ecosystem;
pub mod species;
pub mod spread;

pub use curve::ScaleCurve;
pub use ecosystem::Ecosystem;
pub use species::GrowthModel;
pub use spread::{accepts_spread, seed_min_distance, seed_offset};
