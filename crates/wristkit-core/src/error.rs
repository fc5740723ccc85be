//! Error types for the build pipeline

use std::io;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type BuildResult<T> = Result<T, BuildError>;

/// Error type for pipeline operations
///
/// `Fatal` covers problems with the project or its input data. Everything
/// else means the toolchain itself failed.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Project or input-data problem raised by a named stage
    #[error("{plugin}: {}{message}", .path.as_ref().map(|p| format!("{p}: ")).unwrap_or_default())]
    Fatal {
        plugin: String,
        path: Option<String>,
        message: String,
    },

    /// Project configuration is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// The external compiler reported a failure
    #[error("compile failed: {0}")]
    Compiler(String),

    /// An external tool could not be run or did not produce its output
    #[error("toolchain failure: {0}")]
    ToolUnavailable(String),

    /// I/O error while reading sources or writing outputs
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Archive container error
    #[error("archive error: {0}")]
    Archive(String),

    /// Image codec error
    #[error("image error: {0}")]
    Image(String),

    /// The pipeline was torn down before it finished
    #[error("build cancelled")]
    Cancelled,

    /// Invariant violation inside the toolchain
    #[error("internal error: {0}")]
    Internal(String),
}

impl BuildError {
    /// Create a fatal error attributed to a stage
    pub fn fatal(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        BuildError::Fatal {
            plugin: plugin.into(),
            path: None,
            message: message.into(),
        }
    }

    /// Create a fatal error attributed to a stage and a file
    pub fn fatal_at(
        plugin: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        BuildError::Fatal {
            plugin: plugin.into(),
            path: Some(path.into()),
            message: message.into(),
        }
    }

    /// Create an internal (defect) error
    pub fn internal(message: impl Into<String>) -> Self {
        BuildError::Internal(message.into())
    }

    /// True when the project itself is invalid and the failure has already
    /// been explained to the user.
    pub fn is_project_error(&self) -> bool {
        matches!(
            self,
            BuildError::Fatal { .. } | BuildError::Config(_) | BuildError::Compiler(_)
        )
    }

    /// The file this error is attributed to, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            BuildError::Fatal { path, .. } => path.as_deref(),
            _ => None,
        }
    }

    /// Process exit code: 1 for an invalid project, 2 for a toolchain failure
    pub fn exit_code(&self) -> u8 {
        if self.is_project_error() { 1 } else { 2 }
    }
}

/// Unwraps a `BuildError` that travelled through a byte stream as an
/// `io::Error`; any other I/O error becomes [`BuildError::Io`].
impl From<io::Error> for BuildError {
    fn from(error: io::Error) -> Self {
        let carries_build_error = error
            .get_ref()
            .is_some_and(|inner| inner.is::<BuildError>());
        if !carries_build_error {
            return BuildError::Io(error);
        }
        match error.into_inner().map(|inner| inner.downcast::<BuildError>()) {
            Some(Ok(inner)) => *inner,
            _ => BuildError::internal("I/O error lost its build error"),
        }
    }
}

/// Lets stream stages report a `BuildError` from inside a `ByteStream`
impl From<BuildError> for io::Error {
    fn from(error: BuildError) -> Self {
        match error {
            BuildError::Io(error) => error,
            other => io::Error::other(other),
        }
    }
}

#[cfg(test)]
#[path = "error/error_tests.rs"]
mod error_tests;
