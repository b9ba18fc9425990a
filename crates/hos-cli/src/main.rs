//! `hos`: Hours-of-Service checks from the command line.
//!
//! Reads JSON requests from a file or stdin, runs one engine operation, and
//! writes the JSON result to stdout. Logs go to stderr, filtered by `RUST_LOG`.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use hos_engine::time::{parse_timestamp, parse_timezone};
use hos_engine::{
    evaluate, evaluate_fleet, plan, validate_duty_log, DriverRecord, DutyLogRecord,
    PlannerOptions, ScheduleRecord,
};

#[derive(Parser, Debug)]
#[command(name = "hos", version, about = "Hours-of-Service compliance and trip planning")]
struct Cli {
    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one driver (JSON object) or a fleet (JSON array) for violations
    Evaluate {
        /// Input file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Reference instant for elapsed-duty checks (defaults to now)
        #[arg(long)]
        now: Option<String>,

        /// Zone for timestamps without an offset
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },

    /// Validate a duty log against driving and rest limits
    Validate {
        /// Input file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Zone for timestamps without an offset
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },

    /// Plan driving and rest periods for a trip
    Plan {
        /// Input file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Zone for timestamps without an offset
        #[arg(long, default_value = "UTC")]
        timezone: String,

        /// Length of the first sleeper-berth segment, in hours
        #[arg(long)]
        split_first_hours: Option<f64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Evaluate {
            input,
            now,
            timezone,
        } => {
            let tz = zone(&timezone)?;
            let now = match now {
                Some(s) => parse_timestamp(&s, &tz).context("invalid --now")?,
                None => Utc::now(),
            };
            run_evaluate(&input, now, &tz, cli.pretty)
        }
        Command::Validate { input, timezone } => {
            let tz = zone(&timezone)?;
            let record: DutyLogRecord = read_json(&input)?;
            let request = record.resolve(&tz)?;
            let report = validate_duty_log(&request)?;
            info!(violated = report.violated, "duty log validated");
            emit(&report, cli.pretty)
        }
        Command::Plan {
            input,
            timezone,
            split_first_hours,
        } => {
            let tz = zone(&timezone)?;
            let mut options = PlannerOptions::default();
            if let Some(hours) = split_first_hours {
                options.sleeper_split_first_hours = hours;
            }
            let record: ScheduleRecord = read_json(&input)?;
            let request = record.resolve(&tz)?;
            let schedule = plan(&request, &options)?;
            info!(compliant = schedule.compliant, "schedule planned");
            emit(&schedule, cli.pretty)
        }
    }
}

fn run_evaluate(input: &Path, now: DateTime<Utc>, tz: &Tz, pretty: bool) -> Result<()> {
    let value: Value = read_json(input)?;
    debug!(%now, "evaluating");

    if value.is_array() {
        let records: Vec<DriverRecord> =
            serde_json::from_value(value).context("invalid driver list")?;
        let drivers = records
            .into_iter()
            .map(|record| record.resolve(tz))
            .collect::<Result<Vec<_>, _>>()?;
        let report = evaluate_fleet(&drivers, now);
        info!(
            drivers = drivers.len(),
            flagged = report.len(),
            "fleet evaluated"
        );
        emit(&report, pretty)
    } else {
        let record: DriverRecord = serde_json::from_value(value).context("invalid driver")?;
        let driver = record.resolve(tz)?;
        let violations = evaluate(&driver, now);
        info!(driver_id = %driver.driver_id, count = violations.len(), "driver evaluated");
        emit(&violations, pretty)
    }
}

fn zone(name: &str) -> Result<Tz> {
    parse_timezone(name).context("invalid --timezone")
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).context("input is not valid JSON for this command")
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
