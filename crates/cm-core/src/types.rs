//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The day key did not match the `YYYY-MM-DD` format.
    #[error("day key must be YYYY-MM-DD, got {value}")]
    InvalidDayKey { value: String },

    /// The timestamp could not be represented as a calendar date.
    #[error("timestamp out of range: {ts}")]
    TimestampOutOfRange { ts: i64 },
}

/// Generates a validated string newtype with common trait implementations.
macro_rules! define_validated_string {
    (
        $(#[$meta:meta])*
        $name:ident, $validate:path
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new value after validation.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                $validate(&value)?;
                Ok(Self(value))
            }

            /// Returns the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_validated_string!(
    /// The scheme+host+port string identifying the monitored page's
    /// security context (e.g., `https://example.com`).
    ///
    /// Origins must be non-empty. No further structure is enforced; the
    /// value is treated as an opaque grouping key.
    Origin, validate_non_empty_origin
);

define_validated_string!(
    /// A calendar-date bucket in `YYYY-MM-DD` form.
    ///
    /// Day keys are computed **in UTC at capture time** and stored on the
    /// event; summaries group by this stored value and never re-derive it
    /// from the event timestamp.
    DayKey, validate_day_key
);

impl DayKey {
    /// Computes the UTC day key for a millisecond epoch timestamp.
    pub fn from_ts_utc(ts_ms: i64) -> Result<Self, ValidationError> {
        let datetime = chrono::DateTime::from_timestamp_millis(ts_ms)
            .ok_or(ValidationError::TimestampOutOfRange { ts: ts_ms })?;
        Ok(Self(datetime.format("%Y-%m-%d").to_string()))
    }
}

fn validate_non_empty_origin(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field: "origin" });
    }
    Ok(())
}

fn validate_day_key(value: &str) -> Result<(), ValidationError> {
    let well_formed = value.len() == 10
        && chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
    if !well_formed {
        return Err(ValidationError::InvalidDayKey {
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_rejects_empty() {
        assert!(Origin::new("").is_err());
        assert!(Origin::new("https://example.com").is_ok());
    }

    #[test]
    fn origin_serde_roundtrip() {
        let origin = Origin::new("https://example.com").unwrap();
        let json = serde_json::to_string(&origin).unwrap();
        assert_eq!(json, "\"https://example.com\"");
        let parsed: Origin = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, origin);
    }

    #[test]
    fn origin_serde_rejects_empty() {
        let result: Result<Origin, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn day_key_accepts_calendar_dates() {
        assert!(DayKey::new("2025-01-31").is_ok());
        assert!(DayKey::new("2024-02-29").is_ok());
    }

    #[test]
    fn day_key_rejects_malformed_values() {
        assert!(DayKey::new("").is_err());
        assert!(DayKey::new("2025-1-1").is_err());
        assert!(DayKey::new("2025-13-01").is_err());
        assert!(DayKey::new("2025-02-30").is_err());
        assert!(DayKey::new("20250101").is_err());
        assert!(DayKey::new("2025-01-01T00:00").is_err());
    }

    #[test]
    fn day_key_from_ts_is_utc() {
        // 2025-06-15T23:30:00Z: still June 15th in UTC regardless of the
        // host timezone.
        let day = DayKey::from_ts_utc(1_750_030_200_000).unwrap();
        assert_eq!(day.as_str(), "2025-06-15");
    }

    #[test]
    fn day_key_from_ts_crosses_midnight() {
        let before = DayKey::from_ts_utc(1_735_689_599_999).unwrap();
        let after = DayKey::from_ts_utc(1_735_689_600_000).unwrap();
        assert_eq!(before.as_str(), "2024-12-31");
        assert_eq!(after.as_str(), "2025-01-01");
    }

    #[test]
    fn day_key_rejects_out_of_range_timestamp() {
        assert!(DayKey::from_ts_utc(i64::MAX).is_err());
    }
}
