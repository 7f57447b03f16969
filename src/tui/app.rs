//! Application state and logic.
//!
//! [`App`] wraps a [`Session`] with the terminal-side state: which filter
//! control has focus, the date being typed, the painted table and its scroll
//! offset. The event loop drives it through [`App::tick`], which applies
//! settled filter edits and paints at most one chunk of rows per call.

use crate::config::Config;
use chrono::Utc;
use destajo_core::render::{ChunkOutcome, RenderHandle};
use destajo_core::source::download_source_xlsx;
use destajo_core::{DestajoError, IncrementalRenderer, Session, SourceChain, TableSurface};
use destajo_engine::engine::{normalize_str, to_display};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// How long the loop may sleep when nothing is scheduled.
const IDLE_TICK: Duration = Duration::from_millis(250);

/// Filter control (or the table) that receives navigation keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Driver,
    Receiver,
    Date,
    Table,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Driver => Focus::Receiver,
            Focus::Receiver => Focus::Date,
            Focus::Date => Focus::Table,
            Focus::Table => Focus::Driver,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Driver => Focus::Table,
            Focus::Receiver => Focus::Driver,
            Focus::Date => Focus::Receiver,
            Focus::Table => Focus::Date,
        }
    }
}

pub struct App {
    /// Dataset, filters and the published view
    pub session: Session,
    sources: SourceChain,
    sheet_id: Option<String>,
    /// Where `x` writes exports
    pub export_dir: PathBuf,
    /// Where `d` writes the downloaded workbook
    download_path: PathBuf,
    pub renderer: IncrementalRenderer,
    /// Rows painted so far for the current view
    pub surface: TableSurface,
    render_handle: Option<RenderHandle>,
    /// Painted / total rows of the run in progress
    pub render_progress: Option<(usize, usize)>,
    rendered_generation: u64,
    pub focus: Focus,
    /// Distinct drivers, sorted
    pub driver_options: Vec<String>,
    /// Distinct receivers, sorted
    pub receiver_options: Vec<String>,
    /// Date field contents
    pub date_input: String,
    pub editing_date: bool,
    /// First table row on screen
    pub scroll: usize,
    /// Table rows that fit on screen, updated on draw
    pub visible_rows: usize,
    pub status_message: String,
    pub help_modal: bool,
    pub help_scroll: usize,
    last_load_ok: bool,
}

impl App {
    pub fn new(config: &Config, sources: SourceChain) -> Self {
        Self {
            session: Session::with_debounce(config.debounce),
            sources,
            sheet_id: config.sheet_id.clone(),
            export_dir: config.export_dir.clone(),
            download_path: config.local_file.clone(),
            renderer: IncrementalRenderer::new(config.layout),
            surface: TableSurface::new(),
            render_handle: None,
            render_progress: None,
            rendered_generation: 0,
            focus: Focus::Driver,
            driver_options: Vec::new(),
            receiver_options: Vec::new(),
            date_input: String::new(),
            editing_date: false,
            scroll: 0,
            visible_rows: 1,
            status_message: String::new(),
            help_modal: false,
            help_scroll: 0,
            last_load_ok: false,
        }
    }

    /// Fetch the dataset again. On failure the previous rows stay on screen.
    pub fn reload(&mut self) {
        match self.session.reload(&self.sources) {
            Ok(source) => {
                self.last_load_ok = true;
                self.driver_options = self.session.distinct_drivers();
                self.receiver_options = self.session.distinct_receivers();
                self.status_message = format!(
                    "Cargados {} registros desde {}",
                    self.session.store().len(),
                    source
                );
            }
            Err(e) => {
                self.last_load_ok = false;
                tracing::error!(error = %e, "load failed");
                self.status_message = format!("Error: {}", e);
            }
        }
    }

    pub fn load_succeeded(&self) -> bool {
        self.last_load_ok
    }

    /// Make the date field show the filter held by the session.
    pub fn sync_filter_controls(&mut self) {
        self.date_input = self
            .session
            .pending_filter()
            .date
            .as_deref()
            .map(to_display)
            .unwrap_or_default();
    }

    /// Driver currently selected, `None` for all.
    pub fn selected_driver(&self) -> Option<&str> {
        self.session.pending_filter().driver.as_deref()
    }

    pub fn selected_receiver(&self) -> Option<&str> {
        self.session.pending_filter().receiver.as_deref()
    }

    /// Step the driver picker by `delta`; the slot before the first option
    /// means "all drivers".
    pub fn cycle_driver(&mut self, delta: isize, now: Instant) {
        let next = step_option(&self.driver_options, self.selected_driver(), delta);
        self.session.set_driver(&next, now);
    }

    pub fn cycle_receiver(&mut self, delta: isize, now: Instant) {
        let next = step_option(&self.receiver_options, self.selected_receiver(), delta);
        self.session.set_receiver(&next, now);
    }

    pub fn begin_date_edit(&mut self) {
        self.editing_date = true;
        self.status_message.clear();
    }

    pub fn cancel_date_edit(&mut self) {
        self.editing_date = false;
        self.sync_filter_controls();
    }

    /// Accept the typed date. An empty field removes the date filter.
    pub fn commit_date(&mut self, now: Instant) {
        self.editing_date = false;
        let typed = self.date_input.trim().to_string();
        if typed.is_empty() {
            self.session.set_date("", now);
            return;
        }
        let canonical = normalize_str(&typed);
        if canonical.is_empty() {
            self.status_message = format!("Error: fecha no reconocida: {}", typed);
            self.sync_filter_controls();
            return;
        }
        self.session.set_date(&canonical, now);
        self.date_input = to_display(&canonical);
    }

    pub fn clear_filters(&mut self) {
        self.session.clear_filters();
        self.editing_date = false;
        self.date_input.clear();
        self.status_message = "Filtros borrados".to_string();
    }

    pub fn export(&mut self) {
        // Export what the controls show, not a view that is about to change.
        if self.session.has_pending_filter() {
            self.session.apply_now();
        }
        self.status_message = match self.session.export_to_dir(&self.export_dir, Utc::now()) {
            Ok(path) => format!("Exportado a {}", path.display()),
            Err(DestajoError::NothingToExport) => DestajoError::NothingToExport.to_string(),
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                format!("Error: {}", e)
            }
        };
    }

    pub fn download_source(&mut self) {
        self.status_message =
            match download_source_xlsx(self.sheet_id.as_deref(), &self.download_path) {
                Ok(bytes) => format!(
                    "Descargados {} bytes en {}",
                    bytes,
                    self.download_path.display()
                ),
                Err(e) => format!("Error: {}", e),
            };
    }

    /// Apply settled filter edits and paint one chunk. Returns true while
    /// painting work remains.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.session.poll(now);

        if self.session.view_generation() != self.rendered_generation {
            let view = self.session.current_view().clone();
            self.rendered_generation = self.session.view_generation();
            self.render_handle = Some(self.renderer.render(&mut self.surface, view));
            self.scroll = 0;
        }

        if let Some(handle) = self.render_handle {
            match self.renderer.paint_next_chunk(&mut self.surface, &handle) {
                ChunkOutcome::Pending { painted, total } => {
                    self.render_progress = Some((painted, total));
                }
                ChunkOutcome::Finished { .. } | ChunkOutcome::Stale => {
                    self.render_handle = None;
                    self.render_progress = None;
                }
            }
        }

        self.render_handle.is_some()
    }

    /// How long the loop may wait for input before the next [`App::tick`].
    pub fn next_wakeup(&self, now: Instant) -> Duration {
        if self.render_handle.is_some() {
            return Duration::ZERO;
        }
        match self.session.debounce_deadline() {
            Some(deadline) => deadline.saturating_duration_since(now).min(IDLE_TICK),
            None => IDLE_TICK,
        }
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.surface.len().saturating_sub(1);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_to_end(&mut self) {
        self.scroll = self.surface.len().saturating_sub(self.visible_rows);
    }

    pub fn open_help_modal(&mut self) {
        self.help_modal = true;
        self.help_scroll = 0;
    }

    pub fn close_help_modal(&mut self) {
        self.help_modal = false;
    }

    pub fn scroll_help_by(&mut self, delta: isize) {
        self.help_scroll = self.help_scroll.saturating_add_signed(delta);
    }
}

fn step_option(options: &[String], current: Option<&str>, delta: isize) -> String {
    // Slot 0 is "all", option i sits in slot i + 1.
    let slots = options.len() as isize + 1;
    let slot = current
        .and_then(|c| options.iter().position(|o| o == c))
        .map_or(0, |i| i as isize + 1);
    let next = (slot + delta).rem_euclid(slots);
    if next == 0 {
        String::new()
    } else {
        options[(next - 1) as usize].clone()
    }
}
