//! Error types for manifest operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a pipeline manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read the manifest file
    #[error("failed to read manifest file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the manifest document
    #[error("failed to parse pipeline manifest: {source}")]
    Parse {
        /// Underlying JSON error, with line and column.
        #[source]
        source: serde_json::Error,
    },
}

impl ManifestError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error.
    pub fn parse(source: serde_json::Error) -> Self {
        ManifestError::Parse { source }
    }
}
