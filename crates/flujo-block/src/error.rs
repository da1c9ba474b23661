//! Error type for block-level failures.

use thiserror::Error;

/// Errors a block reports to the engine.
///
/// `InvalidConfig` and `MissingConfig` surface from [`initialize`] when a
/// block parses its configuration eagerly and a value fails to parse or a
/// required key is absent; the node is marked degraded for the rest of the
/// run. `Exec` surfaces from [`execute`] and is counted and logged without
/// stopping the pipeline.
///
/// [`initialize`]: crate::Block::initialize
/// [`execute`]: crate::Block::execute
#[derive(Debug, Error)]
pub enum BlockError {
    /// A configuration value was present but failed to parse.
    #[error("invalid value `{value}` for config key `{key}`: expected {expected}")]
    InvalidConfig {
        /// The offending key.
        key: String,
        /// The raw unparseable value.
        value: String,
        /// What the block expected, e.g. `"a float"`.
        expected: &'static str,
    },

    /// A configuration key the block cannot default was absent.
    #[error("missing required config key `{key}`")]
    MissingConfig {
        /// The absent key.
        key: String,
    },

    /// Initialization failed for a non-configuration reason
    /// (device unavailable, resource missing).
    #[error("initialization failed: {0}")]
    Init(String),

    /// One execution pass failed; the pipeline continues.
    #[error("execution failed: {0}")]
    Exec(String),
}

impl BlockError {
    /// Create a [`BlockError::InvalidConfig`].
    pub fn invalid_config(
        key: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
            expected,
        }
    }

    /// Create a [`BlockError::MissingConfig`].
    pub fn missing_config(key: impl Into<String>) -> Self {
        Self::MissingConfig { key: key.into() }
    }

    /// Create a [`BlockError::Init`].
    pub fn init(message: impl Into<String>) -> Self {
        Self::Init(message.into())
    }

    /// Create a [`BlockError::Exec`].
    pub fn exec(message: impl Into<String>) -> Self {
        Self::Exec(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        let err = BlockError::invalid_config("factor", "fast", "a float");
        assert_eq!(
            err.to_string(),
            "invalid value `fast` for config key `factor`: expected a float"
        );

        let err = BlockError::missing_config("device");
        assert_eq!(err.to_string(), "missing required config key `device`");

        let err = BlockError::init("i2c bus not present");
        assert_eq!(err.to_string(), "initialization failed: i2c bus not present");

        let err = BlockError::exec("read timed out");
        assert_eq!(err.to_string(), "execution failed: read timed out");
    }

    #[test]
    fn constructors_match_variants() {
        assert!(matches!(
            BlockError::invalid_config("k", "v", "a bool"),
            BlockError::InvalidConfig { .. }
        ));
        assert!(matches!(
            BlockError::missing_config("k"),
            BlockError::MissingConfig { .. }
        ));
        assert!(matches!(BlockError::init("x"), BlockError::Init(_)));
        assert!(matches!(BlockError::exec("x"), BlockError::Exec(_)));
    }
}
