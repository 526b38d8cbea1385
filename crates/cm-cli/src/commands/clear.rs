//! Clear the event log and settings.

use anyhow::{Context, Result};
use cm_db::Database;

/// Deletes all events and the settings record in one transaction.
pub fn run(db: &mut Database) -> Result<()> {
    db.clear().context("failed to clear event log")?;
    println!("event log and settings cleared");
    Ok(())
}
