//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - resolves the configuration
//! - reads deck records (and the optional truth record)
//! - runs the interpolation pipeline
//! - writes JSON output and the optional CSV export

use clap::Parser;
use tracing::warn;

use crate::cli::{Command, ConfigArgs, RunArgs};
use crate::config::Configuration;
use crate::domain::InterpolationArgs;
use crate::error::AppError;

pub mod pipeline;

pub use pipeline::{ModelErrorPolicy, RunOutput, interpolate_records};

/// Entry point for the `atcf-interp` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::init_tracing(cli.verbose)?;

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Config(args) => handle_config(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = Configuration::resolve(args.config.as_deref())?;
    let records = crate::io::read_records(&args.records)?;
    let truth = args
        .truth
        .as_deref()
        .map(crate::io::read_record)
        .transpose()?;

    let interp_args = interpolation_args_from(&args);
    let policy = if args.strict {
        ModelErrorPolicy::Abort
    } else {
        ModelErrorPolicy::Skip
    };

    let run = interpolate_records(
        args.storm.as_ref(),
        &interp_args,
        &records,
        truth.as_ref(),
        Some(&config),
        policy,
    )?;

    crate::io::write_records(&args.output, &run.records)?;
    if let Some(path) = &args.csv {
        crate::io::write_records_csv(path, &run.records)?;
    }

    if run.records.is_empty() {
        warn!(
            dtg = %interp_args.dtg.format("%Y%m%d%H"),
            skipped = ?run.failed_models(),
            "no interpolated records produced"
        );
        return Err(AppError::new(
            3,
            format!(
                "No interpolated records for cycle {}.",
                interp_args.dtg.format("%Y%m%d%H")
            ),
        ));
    }

    Ok(())
}

fn handle_config(args: ConfigArgs) -> Result<(), AppError> {
    let config = Configuration::resolve(args.config.as_deref())?;
    println!("{}", format_configuration(&config));
    Ok(())
}

pub fn interpolation_args_from(args: &RunArgs) -> InterpolationArgs {
    InterpolationArgs {
        dtg: args.dtg,
        fcst_hour_offset: args.offset,
        initial_fields: None,
        models: if args.models.is_empty() {
            None
        } else {
            Some(args.models.clone())
        },
    }
}

/// Human-readable summary of a configuration.
pub fn format_configuration(config: &Configuration) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "n_smooth: {}\noutput_frequency_hours: {}\n",
        config.n_smooth, config.output_frequency_hours
    ));
    out.push_str(&format!(
        "{:<10} {:<10} {:>9} {:>9}\n",
        "input", "output", "relax_min", "relax_max"
    ));
    for m in config.models() {
        out.push_str(&format!(
            "{:<10} {:<10} {:>9} {:>9}\n",
            m.input_name, m.output_name, m.min_relax_fcst_hour, m.max_relax_fcst_hour
        ));
    }
    out
}
