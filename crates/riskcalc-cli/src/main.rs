mod cli;
mod commands;
mod error;
mod metadata;
mod output;

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use riskcalc_core::RiskConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, OutputFormat};
use crate::error::{analysis_exit_code, CliError};
use crate::metadata::Metadata;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    let config = RiskConfig::from_env();

    let started = Instant::now();
    let outcome = commands::run(&cli, &config).await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::debug!(
        source = %cli.provider(),
        latency_ms,
        ok = outcome.is_ok(),
        "command finished"
    );
    let meta = Metadata::new(cli.provider(), latency_ms);

    match outcome {
        Ok(result) => {
            output::render(result, meta, cli.format, cli.pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(CliError::Analysis(error)) if cli.format == OutputFormat::Json => {
            output::render_failure(meta, &error, cli.pretty)?;
            eprintln!("error: {error}");
            Ok(ExitCode::from(analysis_exit_code(&error)))
        }
        Err(error) => Err(error),
    }
}
