use super::Session;
use crate::error::Result;
use crate::source::{DataSource, SourceChain, load_with_fallback};
use crate::storage::{ExportFile, export_view};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

impl Session {
    /// Load from `primary`, falling back to `fallback`.
    ///
    /// On failure the session keeps its previous dataset and view untouched.
    /// Returns the name of the source that supplied the rows.
    pub fn load_from(
        &mut self,
        primary: Option<&dyn DataSource>,
        fallback: &dyn DataSource,
    ) -> Result<String> {
        let loaded = load_with_fallback(primary, fallback)?;
        self.load(loaded.rows);
        self.source_name = Some(loaded.source.clone());
        Ok(loaded.source)
    }

    /// [`Session::load_from`] over a [`SourceChain`].
    pub fn reload(&mut self, sources: &SourceChain) -> Result<String> {
        self.load_from(sources.primary(), sources.fallback())
    }

    /// Export the current view, named after the applied date filter.
    pub fn export(&self, now: DateTime<Utc>) -> Result<ExportFile> {
        export_view(&self.view, self.applied.date.as_deref(), now)
    }

    /// Export the current view into `dir`. Returns the written path.
    pub fn export_to_dir(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
        self.export(now)?.write_to(dir)
    }
}
