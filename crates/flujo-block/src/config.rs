//! String-typed block configuration.

use std::collections::BTreeMap;

use crate::BlockError;

/// Configuration handed to a block once, at [`initialize`].
///
/// Keys and values are both strings — matching the manifest format, where
/// node configuration is stringified before it reaches the block layer.
/// Each block parses its own keys through the typed accessors and defaults
/// the missing ones. Parsing is eager and fail-closed: an unparseable value
/// is an error at initialize time, never a surprise on a later tick.
///
/// The typed accessors return `Ok(None)` for an absent key (caller picks the
/// default) and `Err` for a present-but-invalid value.
///
/// # Example
///
/// ```rust
/// use flujo_block::BlockConfig;
///
/// let config = BlockConfig::new()
///     .with("factor", "2.5")
///     .with("enabled", "true");
///
/// assert_eq!(config.float_or("factor", 1.0).unwrap(), 2.5);
/// assert!(config.boolean_or("enabled", false).unwrap());
/// assert_eq!(config.integer_or("window", 16).unwrap(), 16); // absent -> default
/// assert!(config.float("enabled").is_err()); // present but not a float
/// ```
///
/// [`initialize`]: crate::Block::initialize
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockConfig {
    entries: BTreeMap<String, String>,
}

impl BlockConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Raw string value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the configuration is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Raw string value for a key that must be present.
    pub fn require(&self, key: &str) -> Result<&str, BlockError> {
        self.get(key).ok_or_else(|| BlockError::missing_config(key))
    }

    /// Parse a key as a float. Absent keys are `Ok(None)`.
    pub fn float(&self, key: &str) -> Result<Option<f64>, BlockError> {
        self.parse_with(key, "a float", |raw| raw.parse::<f64>().ok())
    }

    /// Parse a key as a float, defaulting when absent.
    pub fn float_or(&self, key: &str, default: f64) -> Result<f64, BlockError> {
        Ok(self.float(key)?.unwrap_or(default))
    }

    /// Parse a key as an integer. Absent keys are `Ok(None)`.
    pub fn integer(&self, key: &str) -> Result<Option<i64>, BlockError> {
        self.parse_with(key, "an integer", |raw| raw.parse::<i64>().ok())
    }

    /// Parse a key as an integer, defaulting when absent.
    pub fn integer_or(&self, key: &str, default: i64) -> Result<i64, BlockError> {
        Ok(self.integer(key)?.unwrap_or(default))
    }

    /// Parse a key as a boolean. Accepts `true`/`false` (any case) and
    /// `1`/`0`. Absent keys are `Ok(None)`.
    pub fn boolean(&self, key: &str) -> Result<Option<bool>, BlockError> {
        self.parse_with(key, "a boolean", |raw| {
            match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            }
        })
    }

    /// Parse a key as a boolean, defaulting when absent.
    pub fn boolean_or(&self, key: &str, default: bool) -> Result<bool, BlockError> {
        Ok(self.boolean(key)?.unwrap_or(default))
    }

    fn parse_with<T>(
        &self,
        key: &str,
        expected: &'static str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<Option<T>, BlockError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => parse(raw.trim())
                .map(Some)
                .ok_or_else(|| BlockError::invalid_config(key, raw, expected)),
        }
    }
}

impl From<BTreeMap<String, String>> for BlockConfig {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, String)> for BlockConfig {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
