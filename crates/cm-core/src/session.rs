//! Per-session capture state.
//!
//! A [`CaptureSession`] owns everything that was conceptually "page global"
//! in the capture layer: the origin, the day key fixed at session start, the
//! previous-keystroke timestamp used for `deltaMs`, and the idle detector.
//! Keeping it per-session lets multiple monitored pages coexist without
//! shared mutable state.

use serde::{Deserialize, Serialize};

use crate::classify::{BuildVocabulary, CompileTrigger, KeyPress, Platform, classify_shortcut};
use crate::event::{Event, EventKind, KeyEvent};
use crate::idle::IdleDetector;
use crate::types::{DayKey, Origin, ValidationError};

/// A raw observation delivered by the host boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Observation {
    /// A key press, classified into a `key` event.
    Key(KeyPress),
    /// A click on a page control; becomes a `compile` event when the label
    /// matches the trigger vocabulary.
    Click { label: String },
    /// Pointer movement or press. Activity only.
    Pointer,
    /// Text input. Activity only.
    Input,
    /// Page visibility change. Activity only.
    Visibility,
    /// An uncaught script error, forwarded as an `error` event.
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stack: Option<String>,
    },
}

/// Capture state for one monitored page session.
#[derive(Debug)]
pub struct CaptureSession<T = BuildVocabulary> {
    origin: Origin,
    day_key: DayKey,
    platform: Platform,
    last_key_ts: Option<i64>,
    idle: IdleDetector,
    trigger: T,
}

impl CaptureSession<BuildVocabulary> {
    /// Starts a session at `now_ms` with the default trigger vocabulary.
    ///
    /// The day key is computed in UTC from `now_ms` and stays fixed for the
    /// session lifetime, as does the idle threshold.
    pub fn new(
        origin: Origin,
        platform: Platform,
        idle_threshold_ms: i64,
        now_ms: i64,
    ) -> Result<Self, ValidationError> {
        Self::with_trigger(origin, platform, idle_threshold_ms, now_ms, BuildVocabulary)
    }
}

impl<T: CompileTrigger> CaptureSession<T> {
    /// Starts a session with a custom compile-trigger predicate.
    pub fn with_trigger(
        origin: Origin,
        platform: Platform,
        idle_threshold_ms: i64,
        now_ms: i64,
        trigger: T,
    ) -> Result<Self, ValidationError> {
        let day_key = DayKey::from_ts_utc(now_ms)?;
        Ok(Self {
            origin,
            day_key,
            platform,
            last_key_ts: None,
            idle: IdleDetector::new(idle_threshold_ms, now_ms),
            trigger,
        })
    }

    /// Processes one observation at `now_ms`, producing at most one event.
    pub fn observe(&mut self, observation: Observation, now_ms: i64) -> Option<Event> {
        match observation {
            Observation::Key(press) => Some(self.observe_key(press, now_ms)),
            Observation::Click { label } => self.observe_click(&label, now_ms),
            Observation::Pointer | Observation::Input | Observation::Visibility => {
                self.idle.mark_activity(now_ms);
                None
            }
            Observation::Error { message, stack } => {
                Some(self.make_event(now_ms, EventKind::Error { message, stack }))
            }
        }
    }

    /// Runs one idle check at `now_ms`, producing an `idle` event when the
    /// threshold has elapsed.
    pub fn tick(&mut self, now_ms: i64) -> Option<Event> {
        let idle_ms = self.idle.tick(now_ms)?;
        Some(self.make_event(now_ms, EventKind::Idle { idle_ms }))
    }

    fn observe_key(&mut self, press: KeyPress, now_ms: i64) -> Event {
        let delta_ms = self.last_key_ts.map(|last| now_ms - last);
        self.last_key_ts = Some(now_ms);
        self.idle.mark_activity(now_ms);

        let meta = classify_shortcut(&press, self.platform);
        self.make_event(
            now_ms,
            EventKind::Key(KeyEvent {
                key: press.key,
                code: press.code,
                ctrl: press.ctrl,
                meta_key: press.meta_key,
                alt: press.alt,
                shift: press.shift,
                delta_ms,
                meta,
            }),
        )
    }

    fn observe_click(&mut self, label: &str, now_ms: i64) -> Option<Event> {
        if !self.trigger.matches(label) {
            return None;
        }
        self.idle.mark_activity(now_ms);
        let label = label.trim().to_lowercase();
        Some(self.make_event(now_ms, EventKind::Compile { label }))
    }

    fn make_event(&self, ts: i64, kind: EventKind) -> Event {
        Event {
            ts,
            origin: self.origin.clone(),
            day_key: self.day_key.clone(),
            kind,
        }
    }

    /// The origin this session captures for.
    pub const fn origin(&self) -> &Origin {
        &self.origin
    }

    /// The day key fixed at session start.
    pub const fn day_key(&self) -> &DayKey {
        &self.day_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyMeta;

    // 2025-01-01T00:00:00Z
    const SESSION_START_MS: i64 = 1_735_689_600_000;

    fn session() -> CaptureSession {
        CaptureSession::new(
            Origin::new("https://example.com").unwrap(),
            Platform::Other,
            5_000,
            SESSION_START_MS,
        )
        .unwrap()
    }

    fn plain_key(key: &str) -> Observation {
        Observation::Key(KeyPress {
            key: key.into(),
            code: format!("Key{}", key.to_uppercase()),
            ctrl: false,
            meta_key: false,
            alt: false,
            shift: false,
        })
    }

    #[test]
    fn first_keystroke_has_no_delta() {
        let mut session = session();
        let event = session
            .observe(plain_key("a"), SESSION_START_MS + 100)
            .unwrap();
        let EventKind::Key(key) = event.kind else {
            panic!("expected key event");
        };
        assert_eq!(key.delta_ms, None);
    }

    #[test]
    fn delta_measures_gap_to_previous_key() {
        let mut session = session();
        session.observe(plain_key("a"), SESSION_START_MS + 100);
        let event = session
            .observe(plain_key("b"), SESSION_START_MS + 350)
            .unwrap();
        let EventKind::Key(key) = event.kind else {
            panic!("expected key event");
        };
        assert_eq!(key.delta_ms, Some(250));
    }

    #[test]
    fn day_key_is_fixed_at_session_start() {
        let mut session = session();
        // Two days later; the session still stamps its session-start day key.
        let later = SESSION_START_MS + 2 * 24 * 60 * 60 * 1_000;
        let event = session.observe(plain_key("a"), later).unwrap();
        assert_eq!(event.day_key.as_str(), "2025-01-01");
    }

    #[test]
    fn shortcut_meta_is_attached() {
        let mut session = session();
        let event = session
            .observe(
                Observation::Key(KeyPress {
                    key: "z".into(),
                    code: "KeyZ".into(),
                    ctrl: true,
                    meta_key: false,
                    alt: false,
                    shift: false,
                }),
                SESSION_START_MS + 10,
            )
            .unwrap();
        let EventKind::Key(key) = event.kind else {
            panic!("expected key event");
        };
        assert_eq!(key.meta, Some(KeyMeta::Undo));
    }

    #[test]
    fn matching_click_becomes_compile_event() {
        let mut session = session();
        let event = session
            .observe(
                Observation::Click {
                    label: "  Run Code ".into(),
                },
                SESSION_START_MS + 10,
            )
            .unwrap();
        assert_eq!(
            event.kind,
            EventKind::Compile {
                label: "run code".into()
            }
        );
    }

    #[test]
    fn unmatched_click_is_dropped() {
        let mut session = session();
        let event = session.observe(
            Observation::Click {
                label: "Submit".into(),
            },
            SESSION_START_MS + 10,
        );
        assert_eq!(event, None);
    }

    #[test]
    fn activity_observations_suppress_idle() {
        let mut session = session();
        assert_eq!(session.tick(SESSION_START_MS + 4_000), None);
        session.observe(Observation::Pointer, SESSION_START_MS + 4_500);
        assert_eq!(session.tick(SESSION_START_MS + 5_000), None);
        let event = session.tick(SESSION_START_MS + 9_500).unwrap();
        assert_eq!(event.kind, EventKind::Idle { idle_ms: 5_000 });
    }

    #[test]
    fn keystrokes_count_as_activity() {
        let mut session = session();
        session.observe(plain_key("a"), SESSION_START_MS + 4_900);
        assert_eq!(session.tick(SESSION_START_MS + 5_000), None);
    }

    #[test]
    fn error_observation_becomes_error_event() {
        let mut session = session();
        let event = session
            .observe(
                Observation::Error {
                    message: "ReferenceError: x is not defined".into(),
                    stack: Some("at <anonymous>:1:1".into()),
                },
                SESSION_START_MS + 10,
            )
            .unwrap();
        assert_eq!(
            event.kind,
            EventKind::Error {
                message: "ReferenceError: x is not defined".into(),
                stack: Some("at <anonymous>:1:1".into()),
            }
        );
    }

    #[test]
    fn observation_lines_parse_from_wire_format() {
        let obs: Observation =
            serde_json::from_str(r#"{"type":"key","key":"z","code":"KeyZ","ctrl":true}"#).unwrap();
        assert!(matches!(obs, Observation::Key(_)));

        let obs: Observation = serde_json::from_str(r#"{"type":"pointer"}"#).unwrap();
        assert_eq!(obs, Observation::Pointer);

        let obs: Observation = serde_json::from_str(r#"{"type":"click","label":"Run"}"#).unwrap();
        assert_eq!(
            obs,
            Observation::Click {
                label: "Run".into()
            }
        );
    }
}
