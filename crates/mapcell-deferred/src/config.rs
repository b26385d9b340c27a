//! Cell configuration
//!
//! [`CellConfig`] can be built in code or loaded from TOML:
//!
//! ```toml
//! display_name = "compilerArgs"
//! merge = "additive"
//! max_entries = 128
//! finalize_on_read = true
//! history_capacity = 32
//! ```

use mapcell_merge::MergeKind;
use serde::{Deserialize, Serialize};

/// Default number of change events retained per cell
pub const DEFAULT_HISTORY_CAPACITY: usize = 64;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML could not be parsed
    #[error("invalid cell configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed values are inconsistent
    #[error("invalid cell configuration: {0}")]
    Invalid(String),
}

/// Deferred map cell configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellConfig {
    /// Name used in errors, events and logs
    pub display_name: String,
    /// Semantics of bulk insertion
    pub merge: MergeKind,
    /// Largest mapping the cell accepts
    pub max_entries: Option<usize>,
    /// Freeze the value the first time it is resolved
    pub finalize_on_read: bool,
    /// Number of change events kept in the history
    pub history_capacity: usize,
}

impl CellConfig {
    /// Create default configuration with a display name
    #[inline]
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    /// With merge strategy
    #[inline]
    #[must_use]
    pub fn with_merge(mut self, merge: MergeKind) -> Self {
        self.merge = merge;
        self
    }

    /// With entry limit
    #[inline]
    #[must_use]
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// With finalize-on-read
    #[inline]
    #[must_use]
    pub fn with_finalize_on_read(mut self, enabled: bool) -> Self {
        self.finalize_on_read = enabled;
        self
    }

    /// With history capacity
    #[inline]
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Parse and validate configuration from TOML
    ///
    /// # Errors
    /// Returns [`ConfigError`] on malformed TOML or an empty display name.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check configuration consistency
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when the display name is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "display_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            display_name: "map".to_string(),
            merge: MergeKind::Overwrite,
            max_entries: None,
            finalize_on_read: false,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}
