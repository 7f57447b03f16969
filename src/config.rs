//! User configuration (`destajo.toml`).

use destajo_core::ColumnLayout;
use destajo_core::session::DEFAULT_DEBOUNCE;
use destajo_engine::engine::{FilterState, normalize_str};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB
const CONFIG_FILE_NAME: &str = "destajo.toml";
const DEFAULT_GID: &str = "0";
const DEFAULT_LOCAL_FILE: &str = "OBD.xlsx";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    sheet_id: Option<String>,
    sheet_gid: Option<String>,
    local_file: Option<PathBuf>,
    debounce_ms: Option<u64>,
    layout: Option<ColumnLayout>,
    export_dir: Option<PathBuf>,
    filter: Option<FilterState>,
}

/// Effective settings after applying the config file over the defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Spreadsheet id of the remote source; `None` means local file only.
    pub sheet_id: Option<String>,
    pub sheet_gid: String,
    /// Fallback workbook used when the remote source fails.
    pub local_file: PathBuf,
    pub debounce: Duration,
    pub layout: ColumnLayout,
    pub export_dir: PathBuf,
    /// Filter applied right after the first load.
    pub filter: FilterState,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet_id: None,
            sheet_gid: DEFAULT_GID.to_string(),
            local_file: PathBuf::from(DEFAULT_LOCAL_FILE),
            debounce: DEFAULT_DEBOUNCE,
            layout: ColumnLayout::default(),
            export_dir: PathBuf::from("."),
            filter: FilterState::default(),
        }
    }
}

/// Load the config from `explicit`, or from the user config dir.
///
/// Never fails: problems are reported as warnings and the defaults are used.
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let Some(path) = explicit.map(Path::to_path_buf).or_else(user_config_path) else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    let content = match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            ));
            return (Config::default(), warnings);
        }
        Ok(_) => match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                warnings.push(format!("Failed to read {}: {}", path.display(), err));
                return (Config::default(), warnings);
            }
        },
        Err(err) => {
            warnings.push(format!(
                "Failed to read metadata for {}: {}",
                path.display(),
                err
            ));
            return (Config::default(), warnings);
        }
    };

    match parse_config(&content, &mut warnings) {
        Ok(config) => (config, warnings),
        Err(err) => {
            warnings.push(format!("Failed to parse {}: {}", path.display(), err));
            (Config::default(), warnings)
        }
    }
}

fn parse_config(content: &str, warnings: &mut Vec<String>) -> Result<Config, toml::de::Error> {
    let file: ConfigFile = toml::from_str(content)?;
    let defaults = Config::default();

    let sheet_id = file
        .sheet_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    let mut filter = file.filter.unwrap_or_default();
    // An empty selection means "no filter", not "blank value".
    filter.driver = filter.driver.filter(|s| !s.is_empty());
    filter.receiver = filter.receiver.filter(|s| !s.is_empty());
    if let Some(date) = filter.date.take() {
        let canonical = normalize_str(&date);
        if canonical.is_empty() {
            warnings.push(format!("Ignoring unrecognized filter date '{}'", date));
        } else {
            filter.date = Some(canonical);
        }
    }

    Ok(Config {
        sheet_id,
        sheet_gid: file.sheet_gid.unwrap_or(defaults.sheet_gid),
        local_file: file.local_file.unwrap_or(defaults.local_file),
        debounce: file
            .debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.debounce),
        layout: file.layout.unwrap_or(defaults.layout),
        export_dir: file.export_dir.unwrap_or(defaults.export_dir),
        filter,
    })
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "destajo")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push(CONFIG_FILE_NAME);
    Some(path)
}
