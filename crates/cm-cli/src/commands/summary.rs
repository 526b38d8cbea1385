//! Summary command: aggregate statistics for an origin/day filter.

use std::fmt::Write;

use anyhow::{Context, Result};
use cm_core::{DayKey, Origin, Summary, SummaryFilter, summarize};
use cm_db::{Database, EventFilter};

use super::util::format_ts;

/// Computes and prints the summary. Storage or serialization failures
/// surface as errors rather than an empty result.
pub fn run(db: &Database, origin: Option<&str>, day: Option<&str>, json: bool) -> Result<()> {
    let origin = origin
        .map(Origin::new)
        .transpose()
        .context("invalid origin filter")?;
    let day_key = day
        .map(DayKey::new)
        .transpose()
        .context("invalid day filter")?;

    let scanned = db
        .scan(&EventFilter {
            origin: origin.clone(),
            day_key: day_key.clone(),
        })
        .context("summary unavailable")?;
    let summary = summarize(
        scanned.iter().map(|stored| &stored.event),
        &SummaryFilter { origin, day_key },
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render(&summary));
    }
    Ok(())
}

fn render(summary: &Summary) -> String {
    let origin = summary
        .origin
        .as_ref()
        .map_or("all origins", Origin::as_str);
    let day = summary.day_key.as_ref().map_or("all days", DayKey::as_str);

    let mut out = String::new();
    let _ = writeln!(out, "Summary for {origin} ({day})");
    if summary.first_seen.is_none() {
        let _ = writeln!(out, "  No matching events.");
        return out;
    }

    let avg = summary
        .avg_inter_key_ms
        .map_or_else(|| "n/a".to_string(), |ms| format!("{ms} ms"));
    let _ = writeln!(
        out,
        "  Keystrokes:        {} (avg inter-key {avg})",
        summary.keystrokes
    );
    let _ = writeln!(
        out,
        "  Undo / redo:       {} / {}",
        summary.undo_count, summary.redo_count
    );
    let _ = writeln!(out, "  Compile attempts:  {}", summary.compile_attempts);
    let _ = writeln!(out, "  Errors:            {}", summary.error_count);
    let _ = writeln!(
        out,
        "  Idle periods:      {} (longest {} ms)",
        summary.idle_events, summary.max_idle_ms
    );
    if let (Some(first), Some(last)) = (summary.first_seen, summary.last_seen) {
        let _ = writeln!(out, "  First seen:        {}", format_ts(first));
        let _ = writeln!(out, "  Last seen:         {}", format_ts(last));
    }
    out
}
