use destajo_engine::engine::{NormalizedRecord, Record};
use std::sync::Arc;
use tracing::info;

/// Immutable snapshot of the loaded deliveries.
///
/// A load replaces the whole snapshot; records are never merged or edited in
/// place. Views hold their own `Arc` to the snapshot they were computed from,
/// so a reload cannot pull records out from under them.
pub struct DatasetStore {
    snapshot: Arc<[NormalizedRecord]>,
    generation: u64,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self {
            snapshot: Arc::from(Vec::new()),
            generation: 0,
        }
    }

    /// Normalize every row and swap the result in as the new snapshot.
    ///
    /// The new snapshot is fully built before the old one is dropped.
    pub fn load(&mut self, raw_rows: Vec<Record>) {
        let snapshot: Arc<[NormalizedRecord]> = raw_rows
            .into_iter()
            .map(NormalizedRecord::from_record)
            .collect();
        let undated = snapshot
            .iter()
            .filter(|r| r.canonical_date().is_empty())
            .count();

        self.snapshot = snapshot;
        self.generation += 1;
        info!(
            records = self.snapshot.len(),
            undated,
            generation = self.generation,
            "dataset loaded"
        );
    }

    pub fn all(&self) -> &[NormalizedRecord] {
        &self.snapshot
    }

    pub fn snapshot(&self) -> Arc<[NormalizedRecord]> {
        Arc::clone(&self.snapshot)
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Number of loads so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new()
    }
}
