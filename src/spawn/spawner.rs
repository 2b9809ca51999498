//! Grid fan-out: stitch and project every cell in parallel
//!
//! Cells are independent units of work on the rayon pool. Results are
//! collected in row-major order (y outer, x inner) regardless of which
//! cell finishes first.

use std::sync::atomic::{AtomicUsize, Ordering};

use glam::Vec3;
use rayon::prelude::*;

use crate::core::config::SpawnConfig;
use crate::core::error::Result;
use crate::core::types::TileCoord;
use crate::placement::{PlacementRecord, PlacementStore, SpawnBatchId};
use crate::projection::{SurfaceProjector, TileTransform, WorldGeometry};
use crate::spawn::set::FoliageSet;
use crate::stitch::TileStitcher;

/// Receives a tick for every finished grid cell
pub trait ProgressSink: Sync {
    fn cell_completed(&self, completed: usize, total: usize);
}

/// Places a foliage set over a `tiles_x` by `tiles_y` grid
pub struct FoliageSpawner<'a> {
    set: &'a FoliageSet,
    config: SpawnConfig,
    batch: SpawnBatchId,
    transform: TileTransform,
}

impl<'a> FoliageSpawner<'a> {
    pub fn new(set: &'a FoliageSet, config: SpawnConfig) -> Result<Self> {
        config.validate()?;

        let largest = set.ecosystem().largest_radius();
        if config.overlap < largest {
            tracing::warn!(
                overlap = config.overlap,
                largest_radius = largest,
                "overlap is smaller than the largest instance radius; seams may show overlapping instances"
            );
        }

        let transform = TileTransform::new(Vec3::from(config.origin), config.yaw);
        Ok(Self {
            set,
            config,
            batch: SpawnBatchId::new(),
            transform,
        })
    }

    /// Reuse a known batch token, e.g. to replace a batch from an earlier run
    pub fn with_batch(mut self, batch: SpawnBatchId) -> Self {
        self.batch = batch;
        self
    }

    pub fn batch(&self) -> SpawnBatchId {
        self.batch
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    /// Cells in output order
    pub fn cells(&self) -> Vec<TileCoord> {
        (0..self.config.tiles_y)
            .flat_map(|y| (0..self.config.tiles_x).map(move |x| TileCoord::new(x, y)))
            .collect()
    }

    /// Stitch and project every cell; records come back row-major
    pub fn spawn_tiles<W: WorldGeometry + ?Sized>(
        &self,
        world: &W,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<Vec<PlacementRecord>> {
        let tile_size = self.set.tile_size();
        let stitcher = TileStitcher::new(
            self.set,
            self.set.ecosystem(),
            self.config.tiles_x,
            self.config.tiles_y,
            self.config.overlap,
        );
        let projector = SurfaceProjector::new(world, self.config.half_height);
        let cells = self.cells();
        let total = cells.len();
        let completed = AtomicUsize::new(0);

        let per_cell = cells
            .par_iter()
            .map(|&coord| -> Result<Vec<PlacementRecord>> {
                let joined = stitcher.stitch_cell(coord)?;
                let cell_transform = self.transform.for_cell(coord, tile_size);
                let records = projector.create_instances_to_spawn(&joined, &cell_transform, self.batch);

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(sink) = progress {
                    sink.cell_completed(done, total);
                }
                Ok(records)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(per_cell.into_iter().flatten().collect())
    }

    /// Replace this spawner's previous batch in `store` with a fresh spawn
    pub fn spawn_procedural_content<W: WorldGeometry + ?Sized>(
        &self,
        world: &W,
        store: &mut dyn PlacementStore,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<usize> {
        self.remove_procedural_content(store);
        let records = self.spawn_tiles(world, progress)?;
        let count = records.len();
        store.add(records);

        tracing::info!(
            batch = %self.batch,
            tiles_x = self.config.tiles_x,
            tiles_y = self.config.tiles_y,
            placed = count,
            "spawned procedural foliage"
        );
        Ok(count)
    }

    /// Remove every record previously spawned under this spawner's batch
    pub fn remove_procedural_content(&self, store: &mut dyn PlacementStore) -> usize {
        let removed = store.remove_batch(self.batch);
        if removed > 0 {
            tracing::debug!(batch = %self.batch, removed, "removed previous foliage batch");
        }
        removed
    }
}
