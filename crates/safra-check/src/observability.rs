//! Logging setup: human-readable events on stderr, JSONL events in a file.
//!
//! The file layer is optional. Its location comes from, in order:
//! `SAFRA_CHECK_LOG_PATH` (exact file), `SAFRA_CHECK_LOG_DIR`, the config
//! `log_dir`, then the platform data directory. If none is usable, only
//! stderr logging is installed.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_PATH_ENV: &str = "SAFRA_CHECK_LOG_PATH";
const LOG_DIR_ENV: &str = "SAFRA_CHECK_LOG_DIR";
const LOG_FILE_NAME: &str = "safra-check.jsonl";

/// Where the JSONL log file goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Directory holding the log file.
    pub log_dir: Option<PathBuf>,
    /// File name inside `log_dir`.
    pub log_file: String,
}

impl ObservabilityConfig {
    /// Resolve the log location from the environment, then `config_dir`, then defaults.
    pub fn from_env_with_overrides(config_dir: Option<PathBuf>) -> Self {
        Self::resolve(
            std::env::var_os(LOG_PATH_ENV).map(PathBuf::from),
            std::env::var_os(LOG_DIR_ENV).map(PathBuf::from),
            config_dir,
        )
    }

    fn resolve(
        log_path: Option<PathBuf>,
        env_dir: Option<PathBuf>,
        config_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(path) = log_path
            && let Some(file) = path.file_name().and_then(|f| f.to_str())
        {
            return Self {
                log_file: file.to_string(),
                log_dir: Some(
                    path.parent()
                        .filter(|p| !p.as_os_str().is_empty())
                        .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
                ),
            };
        }

        let log_dir = env_dir.or(config_dir).or_else(|| {
            safra_check_core::config::user_data_local_dir()
                .map(|dir| dir.join("logs").into_std_path_buf())
        });

        Self {
            log_dir,
            log_file: LOG_FILE_NAME.to_string(),
        }
    }
}

/// Build the event filter.
///
/// `RUST_LOG` wins when set. Otherwise `-q` limits output to errors, each
/// `-v` raises the level one step, and the config level is the baseline.
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(level_directive(quiet, verbose, default_level))
}

fn level_directive(quiet: bool, verbose: u8, default_level: &str) -> &str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => default_level,
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes the file writer.
pub fn init_observability(
    config: &ObservabilityConfig,
    filter: EnvFilter,
) -> anyhow::Result<Option<WorkerGuard>> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let (file_layer, guard) = match open_log_dir(config) {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, &config.log_file);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("tracing subscriber already installed")?;

    Ok(guard)
}

/// Create the log directory, or give up on file logging.
fn open_log_dir(config: &ObservabilityConfig) -> Option<&Path> {
    let dir = config.log_dir.as_deref()?;
    std::fs::create_dir_all(dir).ok()?;
    Some(dir)
}
