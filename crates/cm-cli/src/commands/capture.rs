//! Live capture loop.
//!
//! Reads newline-delimited JSON observations from stdin on a reader thread
//! and drives the idle detector at a fixed 1-second cadence. The loop
//! reschedules its idle check unconditionally: a failed tick or append is
//! logged and the next check still runs.

use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Deserialize;

use cm_core::{CaptureSession, Event, IDLE_CHECK_INTERVAL_MS, Observation, Origin, Platform};
use cm_db::Database;

use super::util::now_ms;

/// One stdin line: an observation plus an optional capture timestamp.
/// Lines without `ts` are stamped with the arrival time.
#[derive(Debug, Deserialize)]
struct ObservationLine {
    #[serde(default)]
    ts: Option<i64>,
    #[serde(flatten)]
    observation: Observation,
}

/// Runs a capture session until stdin closes.
pub fn run(db: &mut Database, origin: &str, platform: Platform) -> Result<()> {
    let origin = Origin::new(origin).context("invalid origin")?;
    // Threshold is read once here; it is not hot-reloaded mid-session.
    let settings = db.settings_or_default()?;
    let mut session = CaptureSession::new(origin, platform, settings.idle_ms, now_ms())?;
    tracing::info!(
        origin = %session.origin(),
        day_key = %session.day_key(),
        idle_ms = settings.idle_ms,
        "capture session started"
    );

    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || forward_stdin(&sender));
    run_loop(db, &mut session, &receiver);

    tracing::info!("capture session ended");
    Ok(())
}

fn run_loop(db: &mut Database, session: &mut CaptureSession, receiver: &mpsc::Receiver<String>) {
    let interval = Duration::from_millis(IDLE_CHECK_INTERVAL_MS.unsigned_abs());
    let mut next_check = Instant::now() + interval;
    loop {
        let timeout = next_check.saturating_duration_since(Instant::now());
        match receiver.recv_timeout(timeout) {
            Ok(line) => handle_line(db, session, &line),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if let Some(event) = session.tick(now_ms()) {
                    append_logged(db, &event);
                }
                next_check += interval;
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn handle_line(db: &mut Database, session: &mut CaptureSession, line: &str) {
    let parsed: ObservationLine = match serde_json::from_str(line) {
        Ok(parsed) => parsed,
        Err(error) => {
            tracing::warn!(%error, line, "rejecting malformed observation");
            return;
        }
    };
    let ts = parsed.ts.unwrap_or_else(now_ms);
    if let Some(event) = session.observe(parsed.observation, ts) {
        append_logged(db, &event);
    }
}

fn append_logged(db: &mut Database, event: &Event) {
    match db.append(event) {
        Ok(id) => tracing::debug!(id, kind = event.kind.name(), "event captured"),
        // Surface the failure but keep the session alive; the next
        // observation or tick gets a fresh attempt.
        Err(error) => tracing::warn!(%error, "failed to append captured event"),
    }
}

fn forward_stdin(sender: &mpsc::Sender<String>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        match line {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => {
                if sender.send(line).is_err() {
                    break;
                }
            }
            Err(error) => {
                tracing::warn!(%error, "failed to read stdin");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_line_parses_with_and_without_ts() {
        let line: ObservationLine =
            serde_json::from_str(r#"{"type":"key","key":"a","code":"KeyA","ts":1000}"#).unwrap();
        assert_eq!(line.ts, Some(1_000));
        assert!(matches!(line.observation, Observation::Key(_)));

        let line: ObservationLine = serde_json::from_str(r#"{"type":"pointer"}"#).unwrap();
        assert_eq!(line.ts, None);
        assert_eq!(line.observation, Observation::Pointer);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        let result: Result<ObservationLine, _> = serde_json::from_str(r#"{"type":"warp"}"#);
        assert!(result.is_err());
        let result: Result<ObservationLine, _> = serde_json::from_str("not json");
        assert!(result.is_err());
    }
}
