//! Data sources for delivery rows.
//!
//! The primary source is the Google Sheets query endpoint; the fallback is a
//! local workbook. Both return raw rows keyed by header name.

use crate::error::{DestajoError, Result};
use crate::storage::{parse_gviz, read_csv, read_xlsx};
use chrono::Utc;
use destajo_engine::engine::Record;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

/// Anything that can produce raw delivery rows.
pub trait DataSource {
    /// Short human-readable name, used in logs and the status bar.
    fn name(&self) -> &str;

    fn fetch(&self) -> Result<Vec<Record>>;
}

/// Rows fetched from a source, tagged with the source's name.
#[derive(Debug)]
pub struct Loaded {
    pub rows: Vec<Record>,
    pub source: String,
}

/// Google Sheets "gviz" query endpoint.
pub struct GvizSource {
    sheet_id: String,
    gid: String,
    name: String,
    client: reqwest::blocking::Client,
}

impl GvizSource {
    pub fn new(sheet_id: &str, gid: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self {
            sheet_id: sheet_id.to_string(),
            gid: gid.to_string(),
            name: format!("Google Sheets ({})", sheet_id),
            client,
        })
    }

    /// Query URL; `cache_buster` keeps intermediaries from serving stale rows.
    pub fn url(&self, cache_buster: i64) -> String {
        gviz_url(&self.sheet_id, &self.gid, cache_buster)
    }
}

pub fn gviz_url(sheet_id: &str, gid: &str, cache_buster: i64) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/{}/gviz/tq?gid={}&tqx=out:json&t={}",
        sheet_id, gid, cache_buster
    )
}

impl DataSource for GvizSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<Record>> {
        let url = self.url(Utc::now().timestamp_millis());
        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(DestajoError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }
        let body = response.text()?;
        parse_gviz(&body)
    }
}

/// A workbook on disk (`.xlsx`/`.xlsm` or `.csv`).
pub struct LocalFileSource {
    path: PathBuf,
    name: String,
}

impl LocalFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for LocalFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<Record>> {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" => read_xlsx(&self.path),
            "csv" => read_csv(&self.path),
            _ => Err(DestajoError::UnsupportedFormat(self.name.clone())),
        }
    }
}

/// An optional primary source backed by a mandatory fallback.
pub struct SourceChain {
    primary: Option<Box<dyn DataSource>>,
    fallback: Box<dyn DataSource>,
}

impl SourceChain {
    pub fn new(primary: Option<Box<dyn DataSource>>, fallback: Box<dyn DataSource>) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> Option<&dyn DataSource> {
        self.primary.as_deref()
    }

    pub fn fallback(&self) -> &dyn DataSource {
        self.fallback.as_ref()
    }

    pub fn load(&self) -> Result<Loaded> {
        load_with_fallback(self.primary(), self.fallback())
    }
}

/// Fetch from `primary`, falling back to `fallback` if it fails.
///
/// Only when both fail is an error returned; it names both causes.
pub fn load_with_fallback(
    primary: Option<&dyn DataSource>,
    fallback: &dyn DataSource,
) -> Result<Loaded> {
    let primary_error = match primary {
        Some(source) => match source.fetch() {
            Ok(rows) => {
                info!(source = source.name(), rows = rows.len(), "fetched rows");
                return Ok(Loaded {
                    rows,
                    source: source.name().to_string(),
                });
            }
            Err(err) => {
                warn!(source = source.name(), error = %err, "primary source failed, using local file");
                format!("{}: {}", source.name(), err)
            }
        },
        None => "no primary source configured".to_string(),
    };

    match fallback.fetch() {
        Ok(rows) => {
            info!(source = fallback.name(), rows = rows.len(), "fetched rows");
            Ok(Loaded {
                rows,
                source: fallback.name().to_string(),
            })
        }
        Err(err) => Err(DestajoError::SourceUnavailable {
            primary: primary_error,
            fallback: format!("{}: {}", fallback.name(), err),
        }),
    }
}

/// Download the source workbook itself and write it to `dest`.
/// Returns the number of bytes written.
pub fn download_source_xlsx(sheet_id: Option<&str>, dest: &Path) -> Result<u64> {
    let Some(sheet_id) = sheet_id.filter(|id| !id.is_empty()) else {
        return Err(DestajoError::NoSheetConfigured);
    };
    let url = format!(
        "https://drive.google.com/uc?export=download&id={}",
        sheet_id
    );
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()?;
    let response = client.get(&url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(DestajoError::HttpStatus {
            status: status.as_u16(),
            url,
        });
    }
    let bytes = response.bytes()?;
    std::fs::write(dest, &bytes)?;
    info!(path = %dest.display(), bytes = bytes.len(), "source workbook downloaded");
    Ok(bytes.len() as u64)
}
