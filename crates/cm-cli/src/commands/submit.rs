//! Append one fully formed event from JSON.

use std::io::Read;

use anyhow::{Context, Result};
use cm_core::Event;
use cm_db::Database;

/// Parses the event payload and appends it, printing the assigned id.
///
/// Malformed payloads (missing `kind`, `ts`, empty origin, bad day key)
/// are rejected at this boundary before anything touches the store.
pub fn run(db: &mut Database, json: Option<&str>) -> Result<()> {
    let raw = match json {
        Some(raw) => raw.to_string(),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read event from stdin")?;
            buffer
        }
    };
    let event: Event = serde_json::from_str(raw.trim()).context("invalid event payload")?;
    let id = db.append(&event).context("failed to append event")?;
    println!("{id}");
    Ok(())
}
