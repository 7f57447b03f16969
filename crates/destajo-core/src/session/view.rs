use destajo_engine::engine::{FilterState, NormalizedRecord, apply};
use std::sync::Arc;

/// The filtered, ordered subsequence of a dataset snapshot.
///
/// A view never owns records: it keeps the snapshot it was computed from and
/// the positions of the matching records. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct CurrentView {
    snapshot: Arc<[NormalizedRecord]>,
    positions: Arc<[usize]>,
}

impl CurrentView {
    pub fn compute(snapshot: Arc<[NormalizedRecord]>, filter: &FilterState) -> Self {
        let positions: Arc<[usize]> = apply(&snapshot, filter).into();
        Self {
            snapshot,
            positions,
        }
    }

    pub fn empty() -> Self {
        Self {
            snapshot: Arc::from(Vec::new()),
            positions: Arc::from(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The `index`-th record of the view.
    pub fn get(&self, index: usize) -> Option<&NormalizedRecord> {
        self.positions
            .get(index)
            .and_then(|&pos| self.snapshot.get(pos))
    }

    /// Positions of the view's records within the snapshot.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedRecord> + '_ {
        self.positions.iter().filter_map(|&pos| self.snapshot.get(pos))
    }

    /// True when both views were computed from the same snapshot.
    pub fn shares_snapshot(&self, other: &CurrentView) -> bool {
        Arc::ptr_eq(&self.snapshot, &other.snapshot)
    }
}

impl Default for CurrentView {
    fn default() -> Self {
        Self::empty()
    }
}
