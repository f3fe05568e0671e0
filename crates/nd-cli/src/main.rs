use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use nd_core::{SystemClock, Tracker, TrackingPurpose};
use nd_db::Database;
use tracing_subscriber::EnvFilter;

use nd_cli::commands::countries::{self, PolicyChange};
use nd_cli::commands::peak::{self, PeakOptions};
use nd_cli::commands::{report, status};
use nd_cli::{Cli, Commands, Config};

/// Load config and open the tracker, ensuring the database directory exists.
fn open_tracker(config_path: Option<&Path>) -> Result<(Tracker<Database, SystemClock>, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path).context("failed to open database")?;
    Ok((Tracker::new(db, SystemClock), config))
}

#[allow(
    clippy::too_many_lines,
    reason = "CLI command dispatch is inherently verbose"
)]
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut tracker, config) = open_tracker(cli.config.as_deref())?;
    let mut out = std::io::stdout().lock();

    match command {
        Commands::Add {
            country,
            purpose,
            limit,
        } => {
            let purpose = match purpose {
                Some(purpose) => purpose.parse::<TrackingPurpose>()?,
                None => config.default_purpose,
            };
            countries::add(&mut out, &mut tracker, country, purpose, *limit)?;
        }
        Commands::Enter { country, at } => {
            countries::enter(&mut out, &mut tracker, country, at.as_deref())?;
        }
        Commands::Exit { country, at } => {
            countries::exit(&mut out, &mut tracker, country, at.as_deref())?;
        }
        Commands::Stay { country, from, to } => {
            countries::stay(&mut out, &mut tracker, country, from, to)?;
        }
        Commands::Policy {
            country,
            mode,
            partial,
            arrival,
            departure,
        } => {
            let change = PolicyChange {
                mode: mode.as_deref(),
                partial: partial.as_deref(),
                arrival: *arrival,
                departure: *departure,
            };
            countries::policy(&mut out, &mut tracker, country, &change)?;
        }
        Commands::Limit { country, days } => {
            countries::limit(&mut out, &mut tracker, country, *days)?;
        }
        Commands::Track { country, off } => {
            countries::track(&mut out, &mut tracker, country, !*off)?;
        }
        Commands::Remove { country } => {
            countries::remove(&mut out, &mut tracker, country)?;
        }
        Commands::Status { window, json } => {
            let window = status::resolve_window(window, tracker.clock());
            status::run(&mut out, &tracker, window, *json)?;
        }
        Commands::Report {
            country,
            year,
            json,
        } => {
            report::run(&mut out, &tracker, country, *year, *json)?;
        }
        Commands::Peak {
            country,
            window,
            from,
            to,
        } => {
            let options = PeakOptions {
                window: *window,
                from: from.as_deref(),
                to: to.as_deref(),
            };
            peak::run(
                &mut out,
                &tracker,
                country,
                &options,
                config.rolling_window_days,
            )?;
        }
    }

    Ok(())
}
