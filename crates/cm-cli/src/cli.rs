//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use cm_core::Platform;

/// Per-site, per-day behavioral analytics over captured page telemetry.
///
/// Captures keystrokes, idle periods, compile attempts, and script errors
/// into an append-only local log and answers origin/day summary queries
/// over it.
#[derive(Debug, Parser)]
#[command(name = "cm", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a live capture session, reading JSON observations from stdin.
    Capture {
        /// Origin of the monitored page (scheme+host+port).
        #[arg(long)]
        origin: String,

        /// Which modifier plays the primary-control role for shortcuts.
        #[arg(long, value_enum, default_value_t = PlatformArg::Other)]
        platform: PlatformArg,
    },

    /// Append one fully formed event, given as JSON.
    Submit {
        /// The event as a JSON object; read from stdin when omitted.
        #[arg(long)]
        json: Option<String>,
    },

    /// Show aggregate statistics for an origin/day filter.
    Summary {
        /// Restrict to this origin.
        #[arg(long)]
        origin: Option<String>,

        /// Restrict to this day (YYYY-MM-DD, UTC).
        #[arg(long)]
        day: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Export the entire event log as a JSON document.
    Export {
        /// Output path. Defaults to code-metrics.json.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print to stdout instead of writing a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Delete the entire event log and the settings record.
    Clear,

    /// Read or replace the settings record.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Show database path and log statistics.
    Status,
}

/// Settings subcommands.
#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Print the current settings record.
    Get,

    /// Replace the settings record.
    Set {
        /// Idle-detection threshold in milliseconds.
        #[arg(long)]
        idle_ms: i64,
    },
}

/// Platform hint for shortcut classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    /// Command-key platforms (`metaKey` is primary).
    Mac,
    /// Everything else (`ctrl` is primary).
    Other,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Mac => Self::Mac,
            PlatformArg::Other => Self::Other,
        }
    }
}
