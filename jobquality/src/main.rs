//! Job posting data quality tool.
//!
//! This binary reads job records exported from the ingestion pipeline and
//! writes a data quality report as JSON.

use clap::Parser;
use jobquality::{Cli, Command, default_config_json, run_assess};
use jobquality_core::init_logging;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.global.verbose, cli.global.quiet)?;

    match &cli.command {
        Command::Assess(args) => {
            let summary = run_assess(args).await?;
            info!(
                "✓ Assessment completed: {} jobs, {} with issues, overall score {:.1}",
                summary.total_jobs, summary.jobs_with_issues, summary.overall_score
            );
            if summary.critical_issues > 0 {
                warn!("{} critical issues found", summary.critical_issues);
            }
        }
        Command::Config => println!("{}", default_config_json()?),
    }

    Ok(())
}
