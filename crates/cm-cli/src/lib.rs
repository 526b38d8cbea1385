//! CLI for the code-metrics telemetry engine.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Commands, PlatformArg, SettingsAction};
pub use config::Config;
