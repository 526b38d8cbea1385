//! Telemetry events captured from a monitored page.

use serde::{Deserialize, Serialize};

use crate::types::{DayKey, Origin};

/// A single telemetry event, immutable once appended to the store.
///
/// The store assigns ids at append time; an `Event` on its own is the
/// unpersisted record handed to `append`. Serialization uses the camelCase
/// wire format of the export document (`dayKey`, `deltaMs`, `idleMs`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Capture timestamp, milliseconds since epoch.
    pub ts: i64,
    /// Origin of the page that produced the event.
    pub origin: Origin,
    /// UTC calendar-date bucket, fixed at capture time.
    pub day_key: DayKey,
    /// Kind tag plus kind-specific payload.
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Kind-specific event payload, tagged by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EventKind {
    /// A keystroke, with modifier flags and classifier output.
    Key(KeyEvent),
    /// An inactivity period at least as long as the configured threshold.
    #[serde(rename_all = "camelCase")]
    Idle {
        /// Elapsed inactivity measured at detection time.
        idle_ms: i64,
    },
    /// A click on a build-like page control.
    Compile {
        /// Visible label of the clicked control, lower-cased.
        label: String,
    },
    /// An uncaught script error on the monitored page.
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stack: Option<String>,
    },
}

impl EventKind {
    /// Stable string name of the kind, used for the store's `kind` column.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Key(_) => "key",
            Self::Idle { .. } => "idle",
            Self::Compile { .. } => "compile",
            Self::Error { .. } => "error",
        }
    }
}

/// Payload of a `key` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    /// Raw key label (e.g., `z`, `Enter`).
    pub key: String,
    /// Physical key identifier (e.g., `KeyZ`).
    pub code: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
    /// Milliseconds since the previous key event in the same capture
    /// session. Absent on the first keystroke of a session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_ms: Option<i64>,
    /// Semantic intent assigned by the shortcut classifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<KeyMeta>,
}

/// Semantic intent of a classified keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMeta {
    Undo,
    Redo,
    Compile,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(delta_ms: Option<i64>, meta: Option<KeyMeta>) -> Event {
        Event {
            ts: 1_000,
            origin: Origin::new("https://example.com").unwrap(),
            day_key: DayKey::new("2025-01-01").unwrap(),
            kind: EventKind::Key(KeyEvent {
                key: "z".into(),
                code: "KeyZ".into(),
                ctrl: true,
                meta_key: false,
                alt: false,
                shift: false,
                delta_ms,
                meta,
            }),
        }
    }

    #[test]
    fn key_event_serde_roundtrip() {
        let event = key_event(Some(120), Some(KeyMeta::Undo));
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn key_event_wire_format_is_camel_case() {
        let event = key_event(Some(120), Some(KeyMeta::Undo));
        insta::assert_snapshot!(
            serde_json::to_string_pretty(&event).unwrap(),
            @r#"
        {
          "ts": 1000,
          "origin": "https://example.com",
          "dayKey": "2025-01-01",
          "kind": "key",
          "key": "z",
          "code": "KeyZ",
          "ctrl": true,
          "metaKey": false,
          "alt": false,
          "shift": false,
          "deltaMs": 120,
          "meta": "undo"
        }
        "#
        );
    }

    #[test]
    fn first_keystroke_omits_delta() {
        let event = key_event(None, None);
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("deltaMs"));
        assert!(!json.contains("\"meta\""));
    }

    #[test]
    fn idle_event_uses_idle_ms_field() {
        let event = Event {
            ts: 9_000,
            origin: Origin::new("https://example.com").unwrap(),
            day_key: DayKey::new("2025-01-01").unwrap(),
            kind: EventKind::Idle { idle_ms: 5_000 },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"idle\""));
        assert!(json.contains("\"idleMs\":5000"));
    }

    #[test]
    fn error_event_omits_absent_stack() {
        let event = Event {
            ts: 3_000,
            origin: Origin::new("https://example.com").unwrap(),
            day_key: DayKey::new("2025-01-01").unwrap(),
            kind: EventKind::Error {
                message: "boom".into(),
                stack: None,
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("stack"));
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn event_rejects_missing_kind() {
        let json = r#"{
            "ts": 1000,
            "origin": "https://example.com",
            "dayKey": "2025-01-01"
        }"#;
        let result: Result<Event, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn event_rejects_empty_origin() {
        let json = r#"{
            "ts": 1000,
            "origin": "",
            "dayKey": "2025-01-01",
            "kind": "idle",
            "idleMs": 5000
        }"#;
        let result: Result<Event, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn kind_names_match_wire_tags() {
        assert_eq!(EventKind::Idle { idle_ms: 1 }.name(), "idle");
        assert_eq!(
            EventKind::Compile {
                label: "run".into()
            }
            .name(),
            "compile"
        );
    }
}
