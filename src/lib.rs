//! Foliage Growth - procedural vegetation simulation with seamless tile stitching

pub mod core;
pub mod growth;
pub mod placement;
pub mod projection;
pub mod spatial;
pub mod spawn;
pub mod stitch;
pub mod tile;
