//! `LogLevel` to `tracing` filter mapping

use tracing_subscriber::filter::LevelFilter;
use wristkit_core::LogLevel;

/// The ceiling filter for `level`
pub(crate) fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Off => LevelFilter::OFF,
    }
}

#[cfg(test)]
#[path = "level/level_tests.rs"]
mod level_tests;
