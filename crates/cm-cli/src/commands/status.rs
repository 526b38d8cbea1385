//! Show database path and log statistics.

use std::path::Path;

use anyhow::Result;
use cm_db::Database;

use super::util::format_ts;

pub fn run(db: &Database, database_path: &Path) -> Result<()> {
    println!("Database:   {}", database_path.display());
    println!("Events:     {}", db.event_count()?);
    match db.last_event_ts()? {
        Some(ts) => println!("Last event: {}", format_ts(ts)),
        None => println!("Last event: none"),
    }
    match db.get_settings()? {
        Some(settings) => println!("Idle after: {} ms", settings.idle_ms),
        None => println!(
            "Idle after: {} ms (default, no settings saved)",
            cm_core::DEFAULT_IDLE_MS
        ),
    }
    Ok(())
}
