//! Library module for the jobquality CLI.
//!
//! Argument parsing and the file plumbing around the quality engine live
//! here so they can be exercised from integration tests. The binary entry
//! point is in main.rs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use jobquality_core::{
    DataQualitySummary, JobQualityError, JobRecord, QualityAnalyzer, QualityConfig, parse_records,
};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Input path that selects standard input.
pub const STDIN_PATH: &str = "-";

/// CLI argument structure
#[derive(Parser, Debug)]
#[command(name = "jobquality")]
#[command(about = "Data quality report for job posting pipelines")]
#[command(version)]
#[command(long_about = "
jobquality - Data quality assessment for job posting pipelines

Reads a JSON array of job records exported from the ingestion pipeline and
produces a quality report: per-stage issue counts, agency health, duplicate
groups, unmapped locations, unrecognized grades, date anomalies, and likely
causes of labeling failures.

EXAMPLES:
  jobquality assess --input jobs.json --pretty
  jobquality assess --input - --output report.json < jobs.json
  jobquality assess --input jobs.json --config quality.json --low-confidence 30
  jobquality config > quality.json
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assess a batch of job records and write the quality report
    Assess(AssessArgs),
    /// Print the default configuration as JSON
    Config,
}

/// Arguments for the assess command
#[derive(Args, Debug)]
pub struct AssessArgs {
    /// Input file with a JSON array of job records
    #[arg(short, long, value_name = "FILE", help = "JSON array of job records, or - for stdin")]
    pub input: PathBuf,

    /// Output file for the report
    #[arg(short, long, value_name = "FILE", help = "Write the report here instead of stdout")]
    pub output: Option<PathBuf>,

    /// Configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "JOBQUALITY_CONFIG",
        help = "JSON quality configuration (see `jobquality config`)"
    )]
    pub config: Option<PathBuf>,

    /// Pretty-print the report
    #[arg(long, help = "Pretty-print the JSON report")]
    pub pretty: bool,

    /// Duplicate window override
    #[arg(long, value_name = "DAYS", help = "Window for same-title duplicate postings")]
    pub duplicate_window_days: Option<i64>,

    /// Low classification confidence override
    #[arg(
        long,
        value_name = "PERCENT",
        help = "Classification confidence (0-100) below which an issue is raised"
    )]
    pub low_confidence: Option<f64>,
}

/// Global arguments shared by every command
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,
}

/// Reads job records from a file, or from stdin when `input` is `-`.
pub async fn load_records(input: &Path) -> anyhow::Result<Vec<JobRecord>> {
    let json = if input == Path::new(STDIN_PATH) {
        debug!("Reading job records from stdin");
        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .map_err(|e| JobQualityError::io("Failed to read job records from stdin", e))?;
        buffer
    } else {
        debug!("Reading job records from {}", input.display());
        tokio::fs::read_to_string(input).await.map_err(|e| {
            JobQualityError::io(format!("Failed to read {}", input.display()), e)
        })?
    };

    let records = parse_records(&json)
        .with_context(|| format!("Input {} is not a JSON array of job records", input.display()))?;
    info!("Loaded {} job records", records.len());
    Ok(records)
}

/// Builds the effective configuration.
///
/// Starts from the config file when given (defaults otherwise), applies the
/// flag overrides, and validates the result.
pub async fn load_config(args: &AssessArgs) -> anyhow::Result<QualityConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = tokio::fs::read_to_string(path).await.map_err(|e| {
                JobQualityError::io(format!("Failed to read config {}", path.display()), e)
            })?;
            serde_json::from_str::<QualityConfig>(&json).map_err(|e| {
                JobQualityError::serialization(
                    format!("Failed to decode config {}", path.display()),
                    e,
                )
            })?
        }
        None => QualityConfig::default(),
    };

    if let Some(days) = args.duplicate_window_days {
        config = config.with_duplicate_window_days(days);
    }
    if let Some(threshold) = args.low_confidence {
        config = config.with_low_confidence_threshold(threshold);
    }

    config
        .validate()
        .map_err(|e| JobQualityError::configuration(e.to_string()))?;
    Ok(config)
}

/// Serializes the report.
pub fn render_summary(summary: &DataQualitySummary, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(summary)
    } else {
        serde_json::to_string(summary)
    };
    json.map_err(|e| JobQualityError::serialization("Failed to encode quality report", e).into())
}

/// Runs the assess command and returns the report it wrote.
pub async fn run_assess(args: &AssessArgs) -> anyhow::Result<DataQualitySummary> {
    let config = load_config(args).await?;
    let records = load_records(&args.input).await?;

    let analyzer = QualityAnalyzer::new(config);
    let summary = analyzer.summarize(&records);
    let rendered = render_summary(&summary, args.pretty)?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, rendered).await.map_err(|e| {
                JobQualityError::io(format!("Failed to write report to {}", path.display()), e)
            })?;
            info!("Report saved to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(summary)
}

/// Renders the default configuration.
pub fn default_config_json() -> anyhow::Result<String> {
    serde_json::to_string_pretty(&QualityConfig::default())
        .context("Failed to encode default configuration")
}
