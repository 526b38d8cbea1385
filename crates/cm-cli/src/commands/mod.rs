//! CLI subcommand implementations.

pub mod capture;
pub mod clear;
pub mod export;
pub mod settings;
pub mod status;
pub mod submit;
pub mod summary;
mod util;
