//! Storage layer for the code-metrics telemetry engine.
//!
//! Provides the append-only event log and the single-slot settings record
//! using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`: an instance can move between threads but concurrent capture
//! sessions must serialize access, e.g. through a `Mutex<Database>`. Each
//! `append` is a single atomic INSERT, so a scan that overlaps an in-flight
//! append sees the new event fully or not at all. A `clear` racing appends
//! resolves by connection order: appends committed before the clear
//! transaction are deleted with the rest of the log, later ones survive.
//!
//! # Schema
//!
//! Event ids come from `INTEGER PRIMARY KEY AUTOINCREMENT`, so they are
//! strictly increasing in commit order and are never reused, including
//! across `clear()` (the sequence table keeps the high-water mark). The
//! `payload` column stores the kind-tagged camelCase JSON of the
//! kind-specific fields; `kind`, `origin`, and `day_key` are materialized
//! as columns for filtering.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cm_core::{DayKey, Event, EventKind, Origin, Settings};

/// Default export filename.
pub const EXPORT_FILE_NAME: &str = "code-metrics.json";

const SETTINGS_KEY: &str = "settings";

/// Storage errors. Callers must surface these, not swallow them.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// An event timestamp that cannot be a capture time.
    #[error("event timestamp must be positive, got {ts}")]
    InvalidTimestamp { ts: i64 },
    /// A stored event row whose payload or keys no longer parse.
    #[error("invalid stored event {id}: {message}")]
    InvalidEventRow { id: i64, message: String },
    /// A stored settings record that no longer parses.
    #[error("invalid settings record: {message}")]
    InvalidSettings { message: String },
    /// Failed to serialize an event payload or the export document.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// An event as read back from the store, with its assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Monotonically increasing id assigned at append time.
    pub id: i64,
    #[serde(flatten)]
    pub event: Event,
}

/// Optional exact-match restriction for [`Database::scan`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub origin: Option<Origin>,
    pub day_key: Option<DayKey>,
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// Idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            -- Append-only event log. Rows are never updated; the only
            -- deletion path is clear(), which empties the whole table.
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ts INTEGER NOT NULL,
                kind TEXT NOT NULL,
                origin TEXT NOT NULL,
                day_key TEXT NOT NULL,
                payload TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_events_origin ON events(origin);
            CREATE INDEX IF NOT EXISTS idx_events_day ON events(day_key);

            -- Single-slot key-value store; only the settings record lives
            -- here today.
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Appends one event, returning its assigned id.
    ///
    /// The write is a single atomic INSERT; a partially persisted record is
    /// never visible to readers.
    pub fn append(&mut self, event: &Event) -> Result<i64, StoreError> {
        if event.ts <= 0 {
            return Err(StoreError::InvalidTimestamp { ts: event.ts });
        }
        let payload = serde_json::to_string(&event.kind)?;
        self.conn.execute(
            "INSERT INTO events (ts, kind, origin, day_key, payload) VALUES (?, ?, ?, ?, ?)",
            params![
                event.ts,
                event.kind.name(),
                event.origin.as_str(),
                event.day_key.as_str(),
                payload,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, kind = event.kind.name(), "event appended");
        Ok(id)
    }

    /// Returns all events in id (append) order, optionally restricted by
    /// exact-match origin and/or day key.
    ///
    /// Full materialization by design: the log is local and bounded by
    /// user-controlled retention.
    pub fn scan(&self, filter: &EventFilter) -> Result<Vec<StoredEvent>, StoreError> {
        let mut sql =
            String::from("SELECT id, ts, origin, day_key, payload FROM events");
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        if let Some(origin) = &filter.origin {
            clauses.push("origin = ?");
            values.push(origin.as_str().to_string());
        }
        if let Some(day_key) = &filter.day_key {
            clauses.push("day_key = ?");
            values.push(day_key.as_str().to_string());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok(EventRow {
                id: row.get(0)?,
                ts: row.get(1)?,
                origin: row.get(2)?,
                day_key: row.get(3)?,
                payload: row.get(4)?,
            })
        })?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_stored_event()?);
        }
        Ok(events)
    }

    /// Number of events currently in the log.
    pub fn event_count(&self) -> Result<i64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Timestamp of the most recently appended event, if any.
    pub fn last_event_ts(&self) -> Result<Option<i64>, StoreError> {
        let ts = self
            .conn
            .query_row(
                "SELECT ts FROM events ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(ts)
    }

    /// Returns the settings record, or `None` if none has been saved.
    pub fn get_settings(&self) -> Result<Option<Settings>, StoreError> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?",
                [SETTINGS_KEY],
                |row| row.get(0),
            )
            .optional()?;
        match value {
            Some(value) => {
                let settings = serde_json::from_str(&value).map_err(|err| {
                    StoreError::InvalidSettings {
                        message: err.to_string(),
                    }
                })?;
                Ok(Some(settings))
            }
            None => Ok(None),
        }
    }

    /// Returns usable settings for a capture session.
    ///
    /// Missing, unparseable, or invalid records degrade to the defaults
    /// with a warning; genuine storage failures still propagate.
    pub fn settings_or_default(&self) -> Result<Settings, StoreError> {
        match self.get_settings() {
            Ok(Some(settings)) => Ok(settings.or_default_if_invalid()),
            Ok(None) => Ok(Settings::default()),
            Err(StoreError::InvalidSettings { message }) => {
                tracing::warn!(message, "unreadable settings record, using defaults");
                Ok(Settings::default())
            }
            Err(err) => Err(err),
        }
    }

    /// Replaces the settings record wholesale.
    pub fn save_settings(&mut self, settings: &Settings) -> Result<(), StoreError> {
        let value = serde_json::to_string(settings)?;
        self.conn.execute(
            "
            INSERT INTO meta (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
            params![SETTINGS_KEY, value],
        )?;
        Ok(())
    }

    /// Atomically empties the event log and the settings record.
    ///
    /// After a clear, `get_settings` returns `None` until a new save. The
    /// id sequence is preserved, so later appends never reuse old ids.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM events", [])?;
        tx.execute("DELETE FROM meta", [])?;
        tx.commit()?;
        tracing::debug!("event log and settings cleared");
        Ok(())
    }

    /// Serializes the entire event log, ignoring any filter, as a
    /// pretty-printed JSON array in store order.
    ///
    /// Byte-deterministic for a fixed log: exporting twice without
    /// intervening appends yields identical documents.
    pub fn export_all(&self) -> Result<String, StoreError> {
        let events = self.scan(&EventFilter::default())?;
        Ok(serde_json::to_string_pretty(&events)?)
    }
}

struct EventRow {
    id: i64,
    ts: i64,
    origin: String,
    day_key: String,
    payload: String,
}

impl EventRow {
    fn into_stored_event(self) -> Result<StoredEvent, StoreError> {
        let id = self.id;
        let invalid = move |message: String| StoreError::InvalidEventRow { id, message };
        let kind: EventKind =
            serde_json::from_str(&self.payload).map_err(|err| invalid(err.to_string()))?;
        let origin = Origin::new(self.origin).map_err(|err| invalid(err.to_string()))?;
        let day_key = DayKey::new(self.day_key).map_err(|err| invalid(err.to_string()))?;
        Ok(StoredEvent {
            id: self.id,
            event: Event {
                ts: self.ts,
                origin,
                day_key,
                kind,
            },
        })
    }
}
