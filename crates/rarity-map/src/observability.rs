//! Logging setup: human-readable events on stderr, JSONL events in a log file.
//!
//! `RUST_LOG` overrides both filters. Without it, stderr shows warnings
//! (`-q` errors only, `-v` debug, `-vv` trace) and the file records the
//! configured log level.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_PATH_ENV: &str = "RARITY_MAP_LOG_PATH";
const LOG_DIR_ENV: &str = "RARITY_MAP_LOG_DIR";
const LOG_FILE_NAME: &str = "rarity-map.jsonl";

/// Where log output goes.
#[derive(Debug, Clone, Default)]
pub struct ObservabilityConfig {
    /// JSONL log file; `None` disables file logging.
    pub log_path: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Resolve the log file path.
    ///
    /// Precedence: `RARITY_MAP_LOG_PATH`, `RARITY_MAP_LOG_DIR`, the configured
    /// `log_dir`, then the platform data directory.
    pub fn from_env_with_overrides(config_log_dir: Option<PathBuf>) -> Self {
        let log_path = non_empty_env(LOG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(|| non_empty_env(LOG_DIR_ENV).map(|dir| PathBuf::from(dir).join(LOG_FILE_NAME)))
            .or_else(|| config_log_dir.map(|dir| dir.join(LOG_FILE_NAME)))
            .or_else(|| {
                rarity_map_core::config::user_data_local_dir()
                    .map(|dir| dir.join("logs").join(LOG_FILE_NAME).into_std_path_buf())
            });
        Self { log_path }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Filter for stderr output.
pub fn console_filter(quiet: bool, verbose: u8) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };
    EnvFilter::new(level)
}

/// Filter for the JSONL log file.
pub fn file_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must live until
/// the program exits. A log file that cannot be opened disables file logging
/// with a warning instead of failing the run.
pub fn init_observability(
    config: &ObservabilityConfig,
    console: EnvFilter,
    file: EnvFilter,
) -> anyhow::Result<Option<WorkerGuard>> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console);

    let (file_layer, guard, open_error) = match config.log_path.as_deref().map(open_log_file) {
        Some(Ok(log_file)) => {
            let (writer, guard) = tracing_appender::non_blocking(log_file);
            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file);
            (Some(layer), Some(guard), None)
        }
        Some(Err(err)) => (None, None, Some(err)),
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    if let Some(err) = open_error {
        tracing::warn!(error = %format!("{err:#}"), "file logging disabled");
    }
    Ok(guard)
}

fn open_log_file(path: &Path) -> anyhow::Result<fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}
