use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cm_cli::commands::{capture, clear, export, settings, status, submit, summary};
use cm_cli::{Cli, Commands, Config, SettingsAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(cm_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = cm_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Capture { origin, platform }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            capture::run(&mut db, origin, (*platform).into())?;
        }
        Some(Commands::Submit { json }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            submit::run(&mut db, json.as_deref())?;
        }
        Some(Commands::Summary { origin, day, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            summary::run(&db, origin.as_deref(), day.as_deref(), *json)?;
        }
        Some(Commands::Export { output, stdout }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            export::run(&db, output.as_deref(), *stdout)?;
        }
        Some(Commands::Clear) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            clear::run(&mut db)?;
        }
        Some(Commands::Settings { action }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            match action {
                SettingsAction::Get => settings::get(&db)?,
                SettingsAction::Set { idle_ms } => settings::set(&mut db, *idle_ms)?,
            }
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&db, &config.database_path)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
