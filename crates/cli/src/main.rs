use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

use gatepass_cli::config::CliConfig;
use gatepass_cli::{commands, input, logging};
use gatepass_core::insights::MovementFilter;
use gatepass_core::movement::GateType;

/// Gate movement policy checks over backend JSON exports.
#[derive(Debug, Parser)]
#[command(name = "gatepass", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check whether a movement may be recorded for a vehicle.
    CheckSequence {
        /// Vehicle status JSON (`-` for stdin); omit when the status lookup failed.
        #[arg(long, value_name = "FILE")]
        status: Option<PathBuf>,
        /// Requested movement: Gate-In or Gate-Out.
        #[arg(long)]
        gate: GateType,
    },
    /// Classify and sort movement records by edit priority.
    Classify {
        #[arg(value_name = "RECORDS")]
        records: PathBuf,
    },
    /// Filtered counts and one page of classified records.
    Stats {
        #[arg(value_name = "RECORDS")]
        records: PathBuf,
        /// First date to include (YYYY-MM-DD).
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last date to include (YYYY-MM-DD).
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        vehicle: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Operational data completion summary.
    Summary {
        #[arg(value_name = "RECORDS")]
        records: PathBuf,
    },
    /// Manual entries awaiting a document, with the search to run for each.
    Assignments {
        #[arg(value_name = "RECORDS")]
        records: PathBuf,
    },
    /// Show the user carried by an access token.
    Whoami {
        #[arg(long, env = "GATEPASS_TOKEN", hide_env_values = true)]
        token: String,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("gatepass: {err}");
            return ExitCode::from(2);
        }
    };
    logging::init(config.log_format);

    match run(Cli::parse(), &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "Command failed");
            eprintln!("gatepass: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: &CliConfig) -> anyhow::Result<()> {
    let now = Utc::now();

    match cli.command {
        Command::CheckSequence { status, gate } => {
            let status = match status {
                Some(path) => input::load_status(&path)?,
                None => None,
            };
            print_json(&commands::check_sequence(status.as_ref(), gate))
        }
        Command::Classify { records } => {
            let records = input::load_records(&records)?;
            print_json(&commands::classify_records(records, now, config))
        }
        Command::Stats {
            records,
            from,
            to,
            vehicle,
            page,
        } => {
            let records = input::load_records(&records)?;
            let filter = MovementFilter {
                from_date: from,
                to_date: to,
                vehicle_no: vehicle,
            };
            print_json(&commands::stats_report(records, filter, page, now, config)?)
        }
        Command::Summary { records } => {
            let records = input::load_records(&records)?;
            print_json(&commands::operational_summary(&records))
        }
        Command::Assignments { records } => {
            let records = input::load_records(&records)?;
            print_json(&commands::pending_assignments(&records, now, config))
        }
        Command::Whoami { token } => print_json(&commands::whoami(&token, now)?),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialise output")?;
    println!("{out}");
    Ok(())
}
