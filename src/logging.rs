// src/logging.rs

//! Logging setup for `sitesmith` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `SITESMITH_LOG` environment variable (full `EnvFilter` directives,
//!    e.g. "debug" or "sitesmith::submodules=trace")
//! 3. default to `info`
//!
//! Logs are sent to STDERR so that stdout stays usable for `--dry-run`
//! output and pre-command passthrough.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => EnvFilter::new(level_directive(lvl)),
        None => EnvFilter::try_from_env("SITESMITH_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info")),
    };

    // Send logs to stderr; keep stdout free.
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn level_directive(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
