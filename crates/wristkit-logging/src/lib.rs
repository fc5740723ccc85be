//! wristkit-logging - Console logging for the wristkit toolchain
//!
//! This crate provides:
//! - [`init_logging`] to install the global `tracing` subscriber
//! - [`DiagnosticRenderer`] to print build diagnostics for humans

mod layer;
mod level;
mod render;

pub use layer::{LOG_ENV, init_logging};
pub use render::{DiagnosticRenderer, summary};
pub use wristkit_core::LogLevel;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{DiagnosticRenderer, LogLevel, init_logging};
}
