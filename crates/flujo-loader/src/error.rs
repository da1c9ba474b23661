//! Error types for module loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a block module.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// No module file exists for the requested block.
    #[error("block module not found: {id} v{version} (expected at '{path}')")]
    ModuleNotFound {
        /// Requested block id.
        id: String,
        /// Requested block version.
        version: String,
        /// Where the module was expected.
        path: PathBuf,
    },

    /// The module file exists but could not be opened.
    #[error("failed to open block module '{path}': {source}")]
    OpenFailed {
        /// Path of the module.
        path: PathBuf,
        /// Underlying loader error.
        #[source]
        source: libloading::Error,
    },

    /// The module does not export a required entry point.
    #[error("block module '{path}' is missing required symbol `{symbol}`: {source}")]
    MissingSymbol {
        /// Path of the module.
        path: PathBuf,
        /// The entry point that failed to resolve.
        symbol: &'static str,
        /// Underlying loader error.
        #[source]
        source: libloading::Error,
    },

    /// The module's allocator returned null.
    #[error("block module '{path}' allocator returned null")]
    NullInstance {
        /// Path of the module.
        path: PathBuf,
    },
}

impl LoaderError {
    /// Create a module-not-found error.
    pub fn module_not_found(
        id: impl Into<String>,
        version: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        LoaderError::ModuleNotFound {
            id: id.into(),
            version: version.into(),
            path: path.into(),
        }
    }

    /// Create an open-failed error.
    pub fn open_failed(path: impl Into<PathBuf>, source: libloading::Error) -> Self {
        LoaderError::OpenFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a missing-symbol error.
    pub fn missing_symbol(
        path: impl Into<PathBuf>,
        symbol: &'static str,
        source: libloading::Error,
    ) -> Self {
        LoaderError::MissingSymbol {
            path: path.into(),
            symbol,
            source,
        }
    }

    /// Create a null-instance error.
    pub fn null_instance(path: impl Into<PathBuf>) -> Self {
        LoaderError::NullInstance { path: path.into() }
    }
}
