//! wristkit-core - Shared types for the wristkit build pipeline
//!
//! This crate provides the foundational types every pipeline stage speaks:
//! - [`FileRecord`] the unit of data flowing between stages
//! - [`Metadata`] the typed side channel attached to each record
//! - [`Diagnostic`] and [`Diagnostics`] for user-facing build messages
//! - [`BuildError`] for fatal and internal failures
//! - [`ProjectConfig`] and [`BuildTargetRegistry`] for read-only configuration

mod config;
mod diagnostic;
mod error;
mod record;

pub use config::{
    AppClusterStorage, AppType, BuildId, BuildTargetDescriptor, BuildTargetRegistry, LocaleInfo,
    PROJECT_CONFIG_FILE, ProjectConfig, SdkVersion,
};
pub use diagnostic::{Category, Diagnostic, Diagnostics, SourcePosition};
pub use error::{BuildError, BuildResult};
pub use record::{
    BundleKind, BundleTag, ByteStream, ComponentType, Contents, FileRecord, Metadata, SourceMap,
    SourceMapFile,
};

/// Log levels understood by the console logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Map a `-v` count from the command line to a level
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BuildError, BuildResult, ComponentType, Contents, Diagnostic, Diagnostics, FileRecord,
        LogLevel, Metadata, ProjectConfig,
    };
}

#[cfg(test)]
mod lib_tests;
