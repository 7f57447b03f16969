//! Error types for Destajo core.

use thiserror::Error;

/// Errors that can occur while loading, viewing or exporting deliveries
#[derive(Error, Debug)]
pub enum DestajoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XLSX read error: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Spreadsheet has no rows")]
    EmptySheet,

    #[error("No data source available ({primary}; {fallback})")]
    SourceUnavailable { primary: String, fallback: String },

    #[error("No hay datos para exportar.")]
    NothingToExport,

    #[error("No Google Sheet id configured")]
    NoSheetConfigured,
}

pub type Result<T> = std::result::Result<T, DestajoError>;
