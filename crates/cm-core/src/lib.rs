//! Core domain logic for the code-metrics telemetry engine.
//!
//! This crate contains the pure parts of the system:
//! - Event schema: typed telemetry events with validated origin/day-key
//! - Classifiers: keystroke shortcut intents and compile-trigger labels
//! - Idle detection: the last-activity state machine
//! - Capture session: per-page state producing fully formed events
//! - Summarization: single-pass per-origin/per-day aggregates
//!
//! Persistence lives in `cm-db`; the host/transport boundary lives in the
//! `cm` binary.

pub mod classify;
pub mod event;
pub mod idle;
pub mod session;
pub mod settings;
pub mod summary;
pub mod types;

pub use classify::{BuildVocabulary, CompileTrigger, KeyPress, Platform, classify_shortcut};
pub use event::{Event, EventKind, KeyEvent, KeyMeta};
pub use idle::{IDLE_CHECK_INTERVAL_MS, IdleDetector};
pub use session::{CaptureSession, Observation};
pub use settings::{ConfigError, DEFAULT_IDLE_MS, Settings};
pub use summary::{Summary, SummaryFilter, summarize};
pub use types::{DayKey, Origin, ValidationError};
