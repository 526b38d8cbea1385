//! The single mutable settings record.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default idle-detection threshold in milliseconds.
pub const DEFAULT_IDLE_MS: i64 = 5_000;

/// Invalid configuration values.
///
/// Config errors are not fatal to a capture session: readers fall back to
/// the defaults with a warning. Explicit saves reject invalid values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("idle threshold must be positive, got {value}")]
    NonPositiveIdleMs { value: i64 },
}

/// The settings record, stored whole under the fixed key `"settings"`.
///
/// Saves replace the entire record; there is no partial-field merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Idle-detection threshold in milliseconds.
    pub idle_ms: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            idle_ms: DEFAULT_IDLE_MS,
        }
    }
}

impl Settings {
    /// Validates the record, for use at the save boundary.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.idle_ms <= 0 {
            return Err(ConfigError::NonPositiveIdleMs { value: self.idle_ms });
        }
        Ok(())
    }

    /// Returns the record if valid, otherwise the defaults.
    ///
    /// Used on the read path so a bad persisted value degrades the session
    /// to defaults instead of failing it.
    #[must_use]
    pub fn or_default_if_invalid(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(error) => {
                tracing::warn!(%error, "ignoring invalid settings, using defaults");
                Self::default()
            }
        }
    }
}
