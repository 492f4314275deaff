//! Logging setup shared by configscout binaries.
//!
//! Two sinks: the console (stderr, verbosity-controlled, `RUST_LOG` aware)
//! and an append-only log file with local `%Y-%m-%d %H:%M:%S` timestamps.
//! The file sink is best-effort: if it cannot be opened, logging continues
//! on the console only.

use crate::error::{Result, ScoutError};
use crate::scan::STATUS_TARGET;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// File name of the log inside the platform temp directory.
pub const LOG_FILE_NAME: &str = "configscout.log";

/// Timestamp format used by the log file.
const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default log file location: `<temp dir>/configscout.log`.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

/// Maps CLI verbosity flags to a console level.
///
/// quiet → ERROR, 0 → INFO, 1 → DEBUG, 2+ → TRACE.
pub const fn level_for(verbose: u8, quiet: bool) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

/// Console filter: `RUST_LOG` directives when set and valid, `level`
/// otherwise. Status lines are always turned off, since the CLI prints
/// them itself.
fn console_filter(level: Level, env_directives: Option<&str>) -> Result<EnvFilter> {
    let base = env_directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(level.as_str().to_lowercase()));

    let status_off: Directive = format!("{STATUS_TARGET}=off")
        .parse()
        .map_err(|e| ScoutError::configuration(format!("Invalid status filter: {e}")))?;

    Ok(base.add_directive(status_off))
}

fn open_log_file(path: &Path) -> Option<File> {
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Initializes structured logging.
///
/// # Arguments
/// * `verbose` - Verbosity level (0=INFO, 1=DEBUG, 2+=TRACE)
/// * `quiet` - If true, only show ERROR level logs on the console
/// * `log_file` - Append-only log file; never records less than INFO
///
/// # Errors
/// Returns error if a global subscriber is already installed.
///
/// # Example
/// ```rust,no_run
/// use configscout_core::logging::{default_log_path, init_logging};
///
/// init_logging(1, false, Some(&default_log_path())).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let level = level_for(verbose, quiet);

    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let console_filter = console_filter(level, env_directives.as_deref())?;

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(console_filter);

    let file = log_file.and_then(open_log_file).map(|file| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
            .with_filter(LevelFilter::from_level(level.max(Level::INFO)))
    });

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| ScoutError::configuration(format!("Failed to initialize logging: {e}")))?;

    Ok(())
}
