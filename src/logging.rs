// src/logging.rs

//! Diagnostics for a generation run.
//!
//! Everything the generator reports (tool invocations, per-band job counts,
//! replaced colors, the final summary) goes to stderr through `tracing`.
//! Stdout carries only the `--dry-run` plan, so it can be piped or diffed.
//! Tool stdout/stderr is forwarded at `debug`, which is the level to use when
//! a Montage tool misbehaves.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Environment variable consulted when `--log-level` is not given.
pub const LOG_ENV: &str = "MONTAGE_WORKFLOW_LOG";

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// The flag wins over the environment; an unreadable value falls back to
/// `info`.
pub fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Level {
    if let Some(level) = cli_level {
        return level.into();
    }
    env_value
        .and_then(|value| match value.trim().to_ascii_lowercase().as_str() {
            "warning" => Some(Level::WARN),
            other => other.parse().ok(),
        })
        .unwrap_or(Level::INFO)
}

/// Install the global subscriber. Call once, before the first tool runs.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV).ok();
    let level = resolve_level(cli_level, env_value.as_deref());

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))
}
