//! Global subscriber setup

use crate::level::level_filter;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;
use wristkit_core::LogLevel;

/// Environment variable holding extra per-target filter directives
pub const LOG_ENV: &str = "WRISTKIT_LOG";

/// Target the diagnostics collector logs under
const DIAGNOSTIC_TARGET: &str = "wristkit::diagnostic";

/// Install the console subscriber.
///
/// `level` is the ceiling for every event. `WRISTKIT_LOG` narrows it per
/// target.
/// Diagnostics are printed by [`DiagnosticRenderer`](crate::DiagnosticRenderer)
/// and are kept out of the log unless the variable names their target.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_logging(level: LogLevel) -> bool {
    let subscriber = tracing_subscriber::registry()
        .with(level_filter(level))
        .with(env_filter(std::env::var(LOG_ENV).ok().as_deref()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }
    tracing::debug!(%level, "logging initialized");
    true
}

/// Per-target filter from the environment, or everything but diagnostics
pub(crate) fn env_filter(directives: Option<&str>) -> EnvFilter {
    let directives = match directives.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => directives.to_string(),
        None => format!("{DIAGNOSTIC_TARGET}=off"),
    };
    EnvFilter::builder()
        .with_default_directive(LevelFilter::TRACE.into())
        .parse_lossy(directives)
}

#[cfg(test)]
#[path = "layer/layer_tests.rs"]
mod layer_tests;
