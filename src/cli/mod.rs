//! Command-line parsing for the A-deck interpolator.
//!
//! Argument parsing and dispatch live here and in `app`; the interpolation
//! code never sees clap types.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{ArgAction, Parser, Subcommand};

use crate::domain::{MAX_FORECAST_HOUR, Storm};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "atcf-interp",
    version,
    about = "Interpolate and bias-correct tropical cyclone model forecasts"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interpolate A-deck records for one cycle.
    Run(RunArgs),
    /// Print the effective interpolator configuration.
    Config(ConfigArgs),
}

/// Options for an interpolation run.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// A-deck records as a JSON array (`-` for stdin).
    #[arg(long, value_name = "JSON")]
    pub records: PathBuf,

    /// Cycle date-time group, YYYYMMDDHH (UTC).
    #[arg(long, value_parser = parse_dtg)]
    pub dtg: DateTime<Utc>,

    /// Interpolator configuration (TOML). Defaults to $ATCF_INTERP_CONFIG.
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Only use records of this storm, e.g. AL092020.
    #[arg(long)]
    pub storm: Option<Storm>,

    /// Hours from the model cycle to the official analysis time.
    #[arg(
        long,
        default_value_t = 0,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i32)
            .range(-i64::from(MAX_FORECAST_HOUR)..=i64::from(MAX_FORECAST_HOUR))
    )]
    pub offset: i32,

    /// Current storm values as a single deck record (JSON).
    #[arg(long, value_name = "JSON")]
    pub truth: Option<PathBuf>,

    /// Restrict to these input models (repeatable).
    #[arg(long = "model", value_name = "NAME")]
    pub models: Vec<String>,

    /// Where to write interpolated records (`-` for stdout).
    #[arg(long, default_value = "-")]
    pub output: PathBuf,

    /// Also export interpolated records to CSV.
    #[arg(long, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Fail the run if any model cannot be interpolated.
    #[arg(long)]
    pub strict: bool,
}

/// Options for printing the configuration.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Interpolator configuration (TOML). Defaults to $ATCF_INTERP_CONFIG.
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,
}

/// Parse a `YYYYMMDDHH` date-time group as UTC.
pub fn parse_dtg(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    let invalid = || format!("Invalid DTG '{s}'. Expected YYYYMMDDHH.");
    if s.len() != 10 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let date = NaiveDate::parse_from_str(&s[..8], "%Y%m%d").map_err(|_| invalid())?;
    let hour: u32 = s[8..].parse().map_err(|_| invalid())?;
    date.and_hms_opt(hour, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(invalid)
}
