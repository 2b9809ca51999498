//! Composing independently simulated tiles into a seamless grid

pub mod region;
pub mod stitcher;

pub use region::{neighbor_region, tile_region, CopyRegion, Neighbor};
pub use stitcher::{copy_tile_instances, TileSource, TileStitcher};
