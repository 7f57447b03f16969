//! Destajo - browse, filter and export delivery records

mod config;
mod logging;
#[cfg(feature = "tui")]
mod tui;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use config::{Config, load_config};
use destajo_core::render::summary_text;
use destajo_core::source::download_source_xlsx;
use destajo_core::{ColumnLayout, DataSource, GvizSource, LocalFileSource, Session, SourceChain};
use destajo_engine::engine::{FilterState, normalize_str};
use logging::LogTarget;
use std::env;
use std::path::PathBuf;
use std::time::Instant;

fn print_usage() {
    eprintln!("Usage: destajo [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                     Local workbook used when the sheet is unreachable");
    eprintln!("                             (.xlsx or .csv, default: OBD.xlsx)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --sheet <ID>               Google Sheets id of the primary source");
    eprintln!("  --gid <GID>                Sheet tab id (default: 0)");
    eprintln!("  --no-remote                Skip the remote source, read FILE only");
    eprintln!("  --config <PATH>            Config file (default: destajo.toml in config dir)");
    eprintln!("  --driver <NAME>            Filter by driver");
    eprintln!("  --receiver <NAME>          Filter by receiver");
    eprintln!("  --date <DATE>              Filter by date (any supported format)");
    eprintln!("  --legacy                   Five-column table layout");
    eprintln!("  -o, --output <DIR>         Export the filtered view to DIR (non-interactive)");
    eprintln!("  --summary                  Print the record count and exit");
    eprintln!("  --list <drivers|receivers> Print distinct values and exit");
    eprintln!("  --download-source <PATH>   Download the source workbook and exit");
    eprintln!("  -h, --help                 Print help");
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListKind {
    Drivers,
    Receivers,
}

#[derive(Default)]
struct Options {
    file_path: Option<PathBuf>,
    sheet_id: Option<String>,
    gid: Option<String>,
    no_remote: bool,
    config_path: Option<PathBuf>,
    driver: Option<String>,
    receiver: Option<String>,
    date: Option<String>,
    legacy: bool,
    output_dir: Option<PathBuf>,
    summary: bool,
    list: Option<ListKind>,
    download_source: Option<PathBuf>,
}

impl Options {
    fn is_batch(&self) -> bool {
        self.output_dir.is_some()
            || self.summary
            || self.list.is_some()
            || self.download_source.is_some()
    }
}

fn take_value(args: &[String], i: &mut usize, flag: &str, what: &str) -> String {
    *i += 1;
    if *i >= args.len() {
        eprintln!("Error: {} requires {}", flag, what);
        std::process::exit(1);
    }
    args[*i].to_string()
}

fn parse_args(args: &[String]) -> Options {
    let mut opts = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "--sheet" => opts.sheet_id = Some(take_value(args, &mut i, "--sheet", "an id")),
            "--gid" => opts.gid = Some(take_value(args, &mut i, "--gid", "a value")),
            "--no-remote" => opts.no_remote = true,
            "--config" => {
                opts.config_path = Some(PathBuf::from(take_value(
                    args,
                    &mut i,
                    "--config",
                    "a file path",
                )))
            }
            "--driver" => opts.driver = Some(take_value(args, &mut i, "--driver", "a value")),
            "--receiver" => {
                opts.receiver = Some(take_value(args, &mut i, "--receiver", "a value"))
            }
            "--date" => opts.date = Some(take_value(args, &mut i, "--date", "a value")),
            "--legacy" => opts.legacy = true,
            "-o" | "--output" => {
                opts.output_dir = Some(PathBuf::from(take_value(
                    args,
                    &mut i,
                    "--output",
                    "a directory",
                )))
            }
            "--summary" => opts.summary = true,
            "--list" => {
                let value = take_value(args, &mut i, "--list", "drivers or receivers");
                opts.list = match value.as_str() {
                    "drivers" => Some(ListKind::Drivers),
                    "receivers" => Some(ListKind::Receivers),
                    other => {
                        eprintln!("Error: --list expects drivers or receivers, got {}", other);
                        std::process::exit(1);
                    }
                };
            }
            "--download-source" => {
                opts.download_source = Some(PathBuf::from(take_value(
                    args,
                    &mut i,
                    "--download-source",
                    "a file path",
                )))
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if opts.file_path.is_none() {
                    opts.file_path = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    opts
}

/// Layer command-line flags over the config file.
fn apply_overrides(config: &mut Config, opts: &Options) -> Result<()> {
    if let Some(path) = &opts.file_path {
        config.local_file = path.clone();
    }
    if let Some(id) = &opts.sheet_id {
        config.sheet_id = Some(id.clone()).filter(|id| !id.is_empty());
    }
    if let Some(gid) = &opts.gid {
        config.sheet_gid = gid.clone();
    }
    if opts.no_remote {
        config.sheet_id = None;
    }
    if opts.legacy {
        config.layout = ColumnLayout::Legacy;
    }
    if let Some(dir) = &opts.output_dir {
        config.export_dir = dir.clone();
    }
    if let Some(driver) = &opts.driver {
        config.filter.driver = Some(driver.clone()).filter(|d| !d.is_empty());
    }
    if let Some(receiver) = &opts.receiver {
        config.filter.receiver = Some(receiver.clone()).filter(|r| !r.is_empty());
    }
    if let Some(date) = &opts.date {
        if date.trim().is_empty() {
            config.filter.date = None;
        } else {
            let canonical = normalize_str(date);
            if canonical.is_empty() {
                bail!("unrecognized date: {}", date);
            }
            config.filter.date = Some(canonical);
        }
    }
    Ok(())
}

fn build_sources(config: &Config) -> Result<SourceChain> {
    let primary: Option<Box<dyn DataSource>> = match &config.sheet_id {
        Some(id) => Some(Box::new(
            GvizSource::new(id, &config.sheet_gid).context("failed to set up HTTP client")?,
        )),
        None => None,
    };
    let fallback = Box::new(LocalFileSource::new(config.local_file.clone()));
    Ok(SourceChain::new(primary, fallback))
}

fn load_session(config: &Config, sources: &SourceChain) -> Result<Session> {
    let mut session = Session::with_debounce(config.debounce);
    session.reload(sources)?;
    apply_initial_filter(&mut session, &config.filter);
    Ok(session)
}

fn apply_initial_filter(session: &mut Session, filter: &FilterState) {
    if !filter.is_vacuous() {
        session.set_filter(filter.clone(), Instant::now());
        session.apply_now();
    }
}

fn run_batch(config: &Config, opts: &Options) -> Result<()> {
    if let Some(dest) = &opts.download_source {
        let bytes = download_source_xlsx(config.sheet_id.as_deref(), dest)?;
        println!("Downloaded {} bytes to {}", bytes, dest.display());
        return Ok(());
    }

    let sources = build_sources(config)?;
    let session = load_session(config, &sources)?;

    if let Some(kind) = opts.list {
        let values = match kind {
            ListKind::Drivers => session.distinct_drivers(),
            ListKind::Receivers => session.distinct_receivers(),
        };
        for value in values {
            println!("{}", value);
        }
    }

    if opts.summary {
        println!("{}", summary_text(session.current_view().len()));
    }

    if opts.output_dir.is_some() {
        let path = session.export_to_dir(&config.export_dir, Utc::now())?;
        println!("Exported to {}", path.display());
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_interactive(config: Config) -> Result<()> {
    let sources = build_sources(&config)?;
    let mut app = tui::App::new(&config, sources);
    app.reload();
    if app.load_succeeded() {
        apply_initial_filter(&mut app.session, &config.filter);
        app.sync_filter_controls();
    }
    tui::run(&mut app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_interactive(_config: Config) -> Result<()> {
    bail!("built without the terminal UI; use --summary, --list or --output")
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let opts = parse_args(&args);

    let (mut config, warnings) = load_config(opts.config_path.as_deref());
    for warning in &warnings {
        eprintln!("Warning: {}", warning);
    }
    if let Err(e) = apply_overrides(&mut config, &opts) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let target = if opts.is_batch() {
        Some(LogTarget::Stderr)
    } else {
        logging::default_log_path().map(LogTarget::File)
    };
    if let Some(target) = target {
        if let Err(e) = logging::init(target) {
            eprintln!("Warning: {}", e);
        }
    }

    let result = if opts.is_batch() {
        run_batch(&config, &opts)
    } else {
        run_interactive(config)
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
