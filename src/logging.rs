//! Tracing subscriber setup.

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "DESTAJO_LOG";
const LOG_FILE_NAME: &str = "destajo.log";

/// Where log lines go.
pub enum LogTarget {
    /// Batch mode: the terminal is free.
    Stderr,
    /// Interactive mode: the terminal belongs to the UI.
    File(PathBuf),
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init(target: LogTarget) -> Result<()> {
    match target {
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow!("failed to install logger: {}", e)),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow!("failed to install logger: {}", e))
        }
    }
}

/// `destajo.log` in the platform data dir.
pub fn default_log_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "destajo")?;
    let mut path = proj.data_dir().to_path_buf();
    path.push(LOG_FILE_NAME);
    Some(path)
}
