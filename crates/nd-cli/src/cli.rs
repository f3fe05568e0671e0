//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Travel day tracker for visa and tax-residency limits.
///
/// Logs entries and exits per country and reports how many days have been
/// spent against each country's limit.
#[derive(Debug, Parser)]
#[command(name = "nd", version, about, long_about = None)]
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
    /// Start tracking a country.
    Add {
        /// ISO 3166-1 alpha-2 country code (e.g., PT).
        country: String,

        /// Why the country is tracked: tourist, schengen, business,
        /// tax-residence, work-permit. Sets the default limit.
        #[arg(long)]
        purpose: Option<String>,

        /// Day limit, overriding the purpose's default.
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<i64>,
    },

    /// Log arrival in a country.
    Enter {
        country: String,

        /// When you arrived (RFC 3339, YYYY-MM-DD, or "2 days ago"). Defaults to now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Log departure from a country.
    Exit {
        country: String,

        /// When you left. Defaults to now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Record a past stay with both dates.
    Stay {
        country: String,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,
    },

    /// Change how days are counted for a country.
    Policy {
        country: String,

        /// days or nights.
        #[arg(long)]
        mode: Option<String>,

        /// How arrival/departure days count: full, half, or exclude.
        #[arg(long)]
        partial: Option<String>,

        /// Whether the arrival day counts.
        #[arg(long)]
        arrival: Option<bool>,

        /// Whether the departure day counts.
        #[arg(long)]
        departure: Option<bool>,
    },

    /// Change a country's day limit.
    Limit {
        country: String,

        #[arg(allow_hyphen_values = true)]
        days: i64,
    },

    /// Turn day counting on or off for a country.
    Track {
        country: String,

        /// Keep the country listed but stop counting its days.
        #[arg(long)]
        off: bool,
    },

    /// Stop tracking a country and delete its stays.
    Remove { country: String },

    /// Show day counts and limits for every tracked country.
    Status {
        #[command(flatten)]
        window: WindowArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show stays and totals for one country.
    Report {
        country: String,

        /// Year for the yearly total. Defaults to the current year.
        #[arg(long)]
        year: Option<i32>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Find the worst rolling-window count over a date range.
    Peak {
        country: String,

        /// Rolling window length in days. Defaults to the configured value.
        #[arg(long)]
        window: Option<u32>,

        /// First as-of date to check. Defaults to one window back.
        #[arg(long)]
        from: Option<String>,

        /// Last as-of date to check. Defaults to today.
        #[arg(long)]
        to: Option<String>,
    },
}

/// Reporting window selection shared by commands.
///
/// With no flags, each country uses its purpose's default window.
#[derive(Debug, Default, Args)]
#[group(multiple = false)]
pub struct WindowArgs {
    /// Count a calendar year.
    #[arg(long)]
    pub year: Option<i32>,

    /// Count a rolling window of this many days ending today.
    #[arg(long)]
    pub rolling: Option<u32>,

    /// Count every recorded stay.
    #[arg(long)]
    pub all_time: bool,
}
