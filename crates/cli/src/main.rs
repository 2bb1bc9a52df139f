//! # Fusion Pipeline CLI
//!
//! `fusion-pipeline run | validate | info`
//!
//! Logging goes through the observability crate; the Prometheus exporter is
//! installed by `run` only when a metrics port is given.

mod cli;
mod commands;
mod runner;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::{error, info};

use cli::{Cli, Commands};
use commands::{run_info, run_pipeline, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    observability::init_with_config(logging_config(&cli))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Fusion pipeline starting"
    );

    let result = match &cli.command {
        Commands::Run(args) => run_pipeline(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        error!(error = %e, "Command failed");
    }
    result
}

/// Map `-v` / `-q` / `--log-format` onto the observability settings
///
/// `RUST_LOG`, when set, still takes precedence over the level chosen here.
fn logging_config(cli: &Cli) -> ObservabilityConfig {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: level.to_string(),
    }
}
