use destajo_engine::engine::FilterState;
use std::time::Duration;

use super::debounce::{DEFAULT_DEBOUNCE, Debouncer};
use super::store::DatasetStore;
use super::view::CurrentView;

/// UI-agnostic session state: the dataset, the filter and the current view.
///
/// Everything the pipeline needs lives here rather than in globals. Views are
/// computed off to the side and only then swapped in, so readers always see
/// either the previous complete view or the new complete view.
pub struct Session {
    /// Source-of-truth records
    pub(crate) store: DatasetStore,
    /// Filter the current view was computed with
    pub(crate) applied: FilterState,
    /// Filter as the controls currently show it (may not have settled yet)
    pub(crate) pending: FilterState,
    /// Settles rapid filter edits before recomputing
    pub(crate) debouncer: Debouncer<FilterState>,
    /// Most recently published view
    pub(crate) view: CurrentView,
    /// Bumped on every publish so consumers can tell a new view arrived
    pub(crate) view_generation: u64,
    /// Name of the data source the dataset came from
    pub(crate) source_name: Option<String>,
}

impl Session {
    /// Create an empty session.
    ///
    /// This constructor is side-effect free: it does not touch the network or
    /// the filesystem.
    pub fn new() -> Self {
        Self::with_debounce(DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(wait: Duration) -> Self {
        Session {
            store: DatasetStore::new(),
            applied: FilterState::default(),
            pending: FilterState::default(),
            debouncer: Debouncer::new(wait),
            view: CurrentView::empty(),
            view_generation: 0,
            source_name: None,
        }
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    pub fn current_view(&self) -> &CurrentView {
        &self.view
    }

    pub fn view_generation(&self) -> u64 {
        self.view_generation
    }

    /// Filter the current view was computed with.
    pub fn filter(&self) -> &FilterState {
        &self.applied
    }

    /// Filter as last edited, possibly still waiting to settle.
    pub fn pending_filter(&self) -> &FilterState {
        &self.pending
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Recompute the view for `filter` and publish it.
    pub(crate) fn publish(&mut self, filter: FilterState) {
        let view = CurrentView::compute(self.store.snapshot(), &filter);
        tracing::debug!(
            matched = view.len(),
            total = self.store.len(),
            ?filter,
            "view recomputed"
        );
        self.view = view;
        self.applied = filter;
        self.view_generation += 1;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
