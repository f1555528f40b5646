//! Binary entry point: parse flags, route logs to a file (the TUI owns the
//! terminal), build the catalog and drive the Ratatui event loop until the
//! user exits.
use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use book_catalog::config::{log_path, DEFAULT_RECOMMENDED};
use book_catalog::{run_app, App, Catalog, CatalogConfig, UserDirectory};

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "book-catalog",
    about = "Browse a rating-ranked book catalog and register readers",
    version
)]
struct Cli {
    /// Log verbosity; `RUST_LOG` takes precedence when set
    #[clap(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Start with an empty catalog instead of the demonstration books
    #[clap(long)]
    empty: bool,

    /// How many books the recommendation list shows
    #[clap(long, default_value_t = DEFAULT_RECOMMENDED)]
    top: usize,
}

/// Send tracing output to the application log file.
fn initialize_tracing(log_level: &LogLevel) -> Result<()> {
    let path = log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level)?;

    let config = CatalogConfig {
        recommended: cli.top,
        ..CatalogConfig::default()
    };
    let catalog = if cli.empty {
        Catalog::with_config(config)
    } else {
        Catalog::seeded(config).context("failed to load the demonstration catalog")?
    };
    tracing::info!(books = catalog.len(), depth = catalog.depth(), "catalog ready");

    let mut app = App::new(catalog, UserDirectory::new());
    run_app(&mut app)
}
