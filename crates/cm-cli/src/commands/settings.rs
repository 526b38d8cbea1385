//! Read or replace the settings record.

use anyhow::{Context, Result};
use cm_core::Settings;
use cm_db::Database;

/// Prints the saved settings record, or a note when none exists.
pub fn get(db: &Database) -> Result<()> {
    match db.get_settings().context("failed to read settings")? {
        Some(settings) => println!("{}", serde_json::to_string_pretty(&settings)?),
        None => println!("no settings saved"),
    }
    Ok(())
}

/// Validates and saves a new settings record, replacing any previous one.
///
/// Unlike the read path, an explicit set with an invalid value fails
/// instead of degrading to defaults.
pub fn set(db: &mut Database, idle_ms: i64) -> Result<()> {
    let settings = Settings { idle_ms };
    settings.validate()?;
    db.save_settings(&settings)
        .context("failed to save settings")?;
    println!("settings saved");
    Ok(())
}
