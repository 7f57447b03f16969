//! Incremental table rendering.
//!
//! Large views are painted in chunks of [`CHUNK_SIZE`] rows, one chunk per
//! scheduler tick, so the host loop can repaint and handle input in between.
//!
//! Each [`IncrementalRenderer::render`] call starts a new run and clears the
//! surface. The run's continuation is a [`RenderHandle`]; the host calls
//! [`IncrementalRenderer::paint_next_chunk`] with it until the run finishes.
//! Starting another run makes every older handle stale: painting with a stale
//! handle is a no-op, so rows from two runs can never interleave.

mod columns;
mod surface;

pub use columns::{Column, ColumnLayout};
pub use surface::{RenderSurface, RenderedCell, RenderedRow, TableSurface, summary_text};

use crate::session::CurrentView;
use destajo_engine::engine::NormalizedRecord;
use tracing::debug;

/// Rows materialized per scheduler tick.
pub const CHUNK_SIZE: usize = 200;

/// Continuation of one render run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderHandle {
    run_id: u64,
}

impl RenderHandle {
    pub fn run_id(&self) -> u64 {
        self.run_id
    }
}

/// Result of one continuation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// More chunks remain.
    Pending { painted: usize, total: usize },
    /// The whole view is painted and the summary updated.
    Finished { total: usize },
    /// The handle belongs to a superseded (or already finished) run.
    Stale,
}

struct ActiveRun {
    id: u64,
    view: CurrentView,
    next: usize,
}

pub struct IncrementalRenderer {
    layout: ColumnLayout,
    chunk_size: usize,
    last_run_id: u64,
    active: Option<ActiveRun>,
}

impl IncrementalRenderer {
    pub fn new(layout: ColumnLayout) -> Self {
        Self {
            layout,
            chunk_size: CHUNK_SIZE,
            last_run_id: 0,
            active: None,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn layout(&self) -> ColumnLayout {
        self.layout
    }

    /// Clear the surface and start painting `view`, superseding any run still
    /// in progress.
    pub fn render<S: RenderSurface>(&mut self, surface: &mut S, view: CurrentView) -> RenderHandle {
        self.last_run_id += 1;
        if let Some(old) = self.active.take() {
            debug!(run = old.id, painted = old.next, "render superseded");
        }
        debug!(run = self.last_run_id, rows = view.len(), "render started");

        surface.clear();
        self.active = Some(ActiveRun {
            id: self.last_run_id,
            view,
            next: 0,
        });
        RenderHandle {
            run_id: self.last_run_id,
        }
    }

    /// Paint the next chunk of the run behind `handle`.
    pub fn paint_next_chunk<S: RenderSurface>(
        &mut self,
        surface: &mut S,
        handle: &RenderHandle,
    ) -> ChunkOutcome {
        let layout = self.layout;
        let chunk_size = self.chunk_size;
        let Some(run) = self.active.as_mut().filter(|run| run.id == handle.run_id) else {
            return ChunkOutcome::Stale;
        };

        let total = run.view.len();
        let end = (run.next + chunk_size).min(total);
        if end > run.next {
            let rows = (run.next..end)
                .filter_map(|i| run.view.get(i))
                .map(|record| materialize(layout, record))
                .collect();
            surface.append(rows);
        }
        run.next = end;

        if end < total {
            return ChunkOutcome::Pending {
                painted: end,
                total,
            };
        }

        surface.set_summary(summary_text(total));
        debug!(run = run.id, rows = total, "render finished");
        self.active = None;
        ChunkOutcome::Finished { total }
    }

    /// Handle of the run in progress, if any.
    pub fn active_handle(&self) -> Option<RenderHandle> {
        self.active.as_ref().map(|run| RenderHandle { run_id: run.id })
    }

    pub fn is_active(&self, handle: &RenderHandle) -> bool {
        self.active.as_ref().is_some_and(|run| run.id == handle.run_id)
    }

    /// Render `view` without yielding. Returns the number of rows painted.
    pub fn render_to_completion<S: RenderSurface>(
        &mut self,
        surface: &mut S,
        view: CurrentView,
    ) -> usize {
        let handle = self.render(surface, view);
        loop {
            match self.paint_next_chunk(surface, &handle) {
                ChunkOutcome::Pending { .. } => continue,
                ChunkOutcome::Finished { total } => return total,
                ChunkOutcome::Stale => return 0,
            }
        }
    }
}

impl Default for IncrementalRenderer {
    fn default() -> Self {
        Self::new(ColumnLayout::default())
    }
}

fn materialize(layout: ColumnLayout, record: &NormalizedRecord) -> RenderedRow {
    RenderedRow {
        cells: layout
            .columns()
            .iter()
            .map(|column| RenderedCell {
                label: column.label(),
                text: column.cell_text(record),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use destajo_engine::engine::{FIELD_DATE, FIELD_DRIVER, FilterState, Record};
    use std::sync::Arc;

    fn view_with_drivers(prefix: &str, n: usize) -> CurrentView {
        let snapshot: Arc<[NormalizedRecord]> = (0..n)
            .map(|i| {
                NormalizedRecord::from_record(
                    Record::new()
                        .with(FIELD_DRIVER, format!("{}{}", prefix, i))
                        .with(FIELD_DATE, "2024-01-15"),
                )
            })
            .collect();
        CurrentView::compute(snapshot, &FilterState::default())
    }

    fn drivers(surface: &TableSurface) -> Vec<String> {
        surface
            .rows()
            .iter()
            .map(|row| row.text("Nombre del Conductor").unwrap_or("").to_string())
            .collect()
    }

    #[test]
    fn empty_view_renders_zero_rows() {
        let mut surface = TableSurface::new();
        let mut renderer = IncrementalRenderer::default();
        let painted = renderer.render_to_completion(&mut surface, CurrentView::empty());
        assert_eq!(painted, 0);
        assert!(surface.is_empty());
        assert_eq!(surface.summary(), "Mostrando 0 registros.");
    }

    #[test]
    fn single_row_summary_is_singular() {
        let mut surface = TableSurface::new();
        let mut renderer = IncrementalRenderer::default();
        renderer.render_to_completion(&mut surface, view_with_drivers("A", 1));
        assert_eq!(surface.len(), 1);
        assert_eq!(surface.summary(), "Mostrando 1 registro.");
    }

    #[test]
    fn rows_carry_labelled_cells() {
        let mut surface = TableSurface::new();
        let mut renderer = IncrementalRenderer::default();
        renderer.render_to_completion(&mut surface, view_with_drivers("A", 1));
        let row = &surface.rows()[0];
        assert_eq!(row.cells.len(), 7);
        assert_eq!(row.text("Fecha"), Some("15/01/2024"));
        assert_eq!(row.text("Nombre del Conductor"), Some("A0"));
    }

    #[test]
    fn legacy_layout_has_five_cells() {
        let mut surface = TableSurface::new();
        let mut renderer = IncrementalRenderer::new(ColumnLayout::Legacy);
        renderer.render_to_completion(&mut surface, view_with_drivers("A", 3));
        assert!(surface.rows().iter().all(|row| row.cells.len() == 5));
    }

    #[test]
    fn paints_in_chunks_of_two_hundred() {
        let mut surface = TableSurface::new();
        let mut renderer = IncrementalRenderer::default();
        let handle = renderer.render(&mut surface, view_with_drivers("A", 450));

        assert_eq!(
            renderer.paint_next_chunk(&mut surface, &handle),
            ChunkOutcome::Pending {
                painted: 200,
                total: 450
            }
        );
        assert_eq!(surface.len(), 200);
        // Summary is only written once the whole view is painted.
        assert_eq!(surface.summary(), "");

        assert_eq!(
            renderer.paint_next_chunk(&mut surface, &handle),
            ChunkOutcome::Pending {
                painted: 400,
                total: 450
            }
        );
        assert_eq!(
            renderer.paint_next_chunk(&mut surface, &handle),
            ChunkOutcome::Finished { total: 450 }
        );
        assert_eq!(surface.len(), 450);
        assert_eq!(surface.chunks(), 3);
        assert_eq!(surface.summary(), "Mostrando 450 registros.");

        // A finished run's handle is spent.
        assert_eq!(
            renderer.paint_next_chunk(&mut surface, &handle),
            ChunkOutcome::Stale
        );
    }

    #[test]
    fn newer_render_wins_over_in_flight_run() {
        let mut surface = TableSurface::new();
        let mut renderer = IncrementalRenderer::default().with_chunk_size(2);

        let old = renderer.render(&mut surface, view_with_drivers("old", 5));
        renderer.paint_next_chunk(&mut surface, &old);
        assert_eq!(surface.len(), 2);

        let new = renderer.render(&mut surface, view_with_drivers("new", 3));
        assert!(surface.is_empty());
        assert!(!renderer.is_active(&old));

        // The superseded continuation still runs but must not write anything.
        assert_eq!(renderer.paint_next_chunk(&mut surface, &old), ChunkOutcome::Stale);
        assert!(surface.is_empty());

        while let ChunkOutcome::Pending { .. } = renderer.paint_next_chunk(&mut surface, &new) {
            assert_eq!(renderer.paint_next_chunk(&mut surface, &old), ChunkOutcome::Stale);
        }
        assert_eq!(drivers(&surface), vec!["new0", "new1", "new2"]);
        assert_eq!(surface.summary(), "Mostrando 3 registros.");
        assert_eq!(renderer.active_handle(), None);
    }

    #[test]
    fn rerender_drops_previous_summary_until_finished() {
        let mut surface = TableSurface::new();
        let mut renderer = IncrementalRenderer::default().with_chunk_size(1);
        renderer.render_to_completion(&mut surface, view_with_drivers("A", 3));
        assert_eq!(surface.summary(), "Mostrando 3 registros.");

        let handle = renderer.render(&mut surface, view_with_drivers("B", 2));
        assert_eq!(surface.summary(), "");
        renderer.paint_next_chunk(&mut surface, &handle);
        assert_eq!(surface.len(), 1);
        assert_eq!(surface.summary(), "");

        assert_eq!(
            renderer.paint_next_chunk(&mut surface, &handle),
            ChunkOutcome::Finished { total: 2 }
        );
        assert_eq!(surface.summary(), "Mostrando 2 registros.");
    }

    #[test]
    fn repeated_renders_are_idempotent() {
        let mut surface = TableSurface::new();
        let mut renderer = IncrementalRenderer::default();
        renderer.render_to_completion(&mut surface, view_with_drivers("A", 250));
        let first = surface.rows().to_vec();
        renderer.render_to_completion(&mut surface, view_with_drivers("A", 250));
        assert_eq!(surface.rows(), first.as_slice());
    }

    #[test]
    fn chunk_size_is_at_least_one() {
        let mut surface = TableSurface::new();
        let mut renderer = IncrementalRenderer::default().with_chunk_size(0);
        assert_eq!(renderer.render_to_completion(&mut surface, view_with_drivers("A", 3)), 3);
        assert_eq!(surface.chunks(), 3);
    }
}
