//! cpmup - NuGet package updater CLI tool
//!
//! Scans a directory for solutions and brings their packages up to date:
//! - Central manifests (Directory.Packages.props) are rewritten in place
//! - Solutions without one are updated project by project via `dotnet`

use clap::Parser;
use cpmup::cli::CliArgs;
use cpmup::orchestrator::{Orchestrator, OrchestratorOptions};
use cpmup::output::{create_formatter, OutputConfig};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CPMUP_LOG").unwrap_or_else(|_| EnvFilter::new(args.log_level())),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let current_dir = std::env::current_dir()?;
    let options = OrchestratorOptions::from_cli(&args, &current_dir);

    debug!(
        path = %options.target.display(),
        dry_run = options.dry_run,
        "cpmup v{}",
        env!("CARGO_PKG_VERSION")
    );

    let orchestrator = Orchestrator::new(options)?;
    // Only a missing target is fatal; per-solution failures are carried in the summary.
    let summary = orchestrator.run().await?;

    let mut output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet, args.dry_run);
    output_config.color = io::stdout().is_terminal();
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&summary, &mut stdout)?;
    stdout.flush()?;

    Ok(ExitCode::SUCCESS)
}
