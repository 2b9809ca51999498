//! Spatial indexing

pub mod broadphase;

pub use broadphase::{Broadphase, BroadphaseEntry, OverlapKind};
