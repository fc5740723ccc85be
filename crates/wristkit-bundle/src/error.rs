//! Error types for reading packages back.

use thiserror::Error;

/// Errors that can occur while opening or inspecting a package.
#[derive(Debug, Error)]
pub enum BundleError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIP archive error.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Manifest validation error.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// Missing required file in the package.
    #[error("Missing required file: {0}")]
    MissingFile(String),
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn BundleError___io___displays_message() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BundleError = io_err.into();

        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn BundleError___invalid_manifest___displays_message() {
        let err = BundleError::InvalidManifest("missing buildId".to_string());

        assert_eq!(err.to_string(), "Invalid manifest: missing buildId");
    }

    #[test]
    fn BundleError___missing_file___displays_path() {
        let err = BundleError::MissingFile("manifest.json".to_string());

        assert_eq!(err.to_string(), "Missing required file: manifest.json");
    }
}
