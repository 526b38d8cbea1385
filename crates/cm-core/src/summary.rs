//! Aggregate statistics over a scanned event set.

use serde::{Deserialize, Serialize};

use crate::event::{Event, EventKind, KeyMeta};
use crate::types::{DayKey, Origin};

/// Optional exact-match restriction on origin and/or day key.
///
/// An event is included iff every present filter field equals the event's
/// corresponding field. Both fields are independent; an empty filter
/// includes everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryFilter {
    pub origin: Option<Origin>,
    pub day_key: Option<DayKey>,
}

impl SummaryFilter {
    /// Whether the event passes both filter fields.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        self.origin.as_ref().is_none_or(|o| *o == event.origin)
            && self.day_key.as_ref().is_none_or(|d| *d == event.day_key)
    }
}

/// Per-origin/per-day aggregate statistics.
///
/// Counters default to 0 when no matching events exist; only
/// `avg_inter_key_ms`, `first_seen`, and `last_seen` use an explicit
/// no-value sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub origin: Option<Origin>,
    pub day_key: Option<DayKey>,
    pub keystrokes: u64,
    pub avg_inter_key_ms: Option<i64>,
    pub idle_events: u64,
    pub max_idle_ms: i64,
    pub undo_count: u64,
    pub redo_count: u64,
    pub compile_attempts: u64,
    pub error_count: u64,
    pub first_seen: Option<i64>,
    pub last_seen: Option<i64>,
}

/// Aggregates the filtered events in one linear scan.
///
/// Pure and order-independent: the result depends only on the multiset of
/// included events.
pub fn summarize<'a, I>(events: I, filter: &SummaryFilter) -> Summary
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut summary = Summary {
        origin: filter.origin.clone(),
        day_key: filter.day_key.clone(),
        ..Summary::default()
    };
    let mut delta_sum: i64 = 0;
    let mut delta_count: u32 = 0;

    for event in events {
        if !filter.matches(event) {
            continue;
        }
        summary.first_seen = Some(summary.first_seen.map_or(event.ts, |t| t.min(event.ts)));
        summary.last_seen = Some(summary.last_seen.map_or(event.ts, |t| t.max(event.ts)));
        match &event.kind {
            EventKind::Key(key) => {
                summary.keystrokes += 1;
                if let Some(delta_ms) = key.delta_ms {
                    delta_sum += delta_ms;
                    delta_count += 1;
                }
                match key.meta {
                    Some(KeyMeta::Undo) => summary.undo_count += 1,
                    Some(KeyMeta::Redo) => summary.redo_count += 1,
                    Some(KeyMeta::Compile) => summary.compile_attempts += 1,
                    None => {}
                }
            }
            EventKind::Idle { idle_ms } => {
                summary.idle_events += 1;
                summary.max_idle_ms = summary.max_idle_ms.max(*idle_ms);
            }
            EventKind::Compile { .. } => summary.compile_attempts += 1,
            EventKind::Error { .. } => summary.error_count += 1,
        }
    }

    if delta_count > 0 {
        summary.avg_inter_key_ms = Some(rounded_mean(delta_sum, delta_count));
    }
    summary
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    reason = "inter-key gaps are far below f64 precision limits"
)]
fn rounded_mean(sum: i64, count: u32) -> i64 {
    (sum as f64 / f64::from(count)).round() as i64
}
