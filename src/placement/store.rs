//! Sinks for spawned placements

use crate::placement::record::{PlacementRecord, SpawnBatchId};

/// Destination of spawned instances, with batch-tagged removal
pub trait PlacementStore {
    fn add(&mut self, records: Vec<PlacementRecord>);

    /// Remove every record of `batch`, returning how many were removed
    fn remove_batch(&mut self, batch: SpawnBatchId) -> usize;
}

/// Store keeping records in memory in insertion order
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlacementStore {
    records: Vec<PlacementRecord>,
}

impl InMemoryPlacementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[PlacementRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn batch_len(&self, batch: SpawnBatchId) -> usize {
        self.records.iter().filter(|r| r.batch == batch).count()
    }

    pub fn into_records(self) -> Vec<PlacementRecord> {
        self.records
    }
}

impl PlacementStore for InMemoryPlacementStore {
    fn add(&mut self, records: Vec<PlacementRecord>) {
        self.records.extend(records);
    }

    fn remove_batch(&mut self, batch: SpawnBatchId) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.batch != batch);
        before - self.records.len()
    }
}
