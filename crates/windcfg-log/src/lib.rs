//! Structured logging for windcfg.
//!
//! Installs a `tracing` subscriber with console output and, optionally, a JSON
//! log file. `log` records emitted by `windcfg-config` are bridged into the
//! same subscriber.

use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor an explicit level is given.
pub const DEFAULT_FILTER: &str = "info";

/// File name of the JSON log written into `log_dir`.
pub const LOG_FILE_NAME: &str = "windcfg.log";

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over `level`; `level` wins over [`DEFAULT_FILTER`]. When
/// `log_dir` is given and writable, records are also written there as JSON.
///
/// # Examples
///
/// ```no_run
/// use windcfg_log::init_logging;
///
/// init_logging(None, Some("debug"));
/// ```
pub fn init_logging(log_dir: Option<&Path>, level: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for(level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Build the filter for an optional level string, falling back to [`DEFAULT_FILTER`].
pub fn filter_for(level: Option<&str>) -> EnvFilter {
    match level.filter(|l| !l.trim().is_empty()) {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        None => EnvFilter::new(DEFAULT_FILTER),
    }
}
