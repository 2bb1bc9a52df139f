//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use contracts::FusionConfig;

use crate::cli::RunArgs;
use crate::runner::{Orchestrator, RunOptions};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let config = load_effective_config(args)?;

    for warning in config_loader::collect_warnings(&config) {
        warn!("{}", warning);
    }

    info!(
        video_rate_hz = config.pipeline.video_rate_hz,
        telemetry_rate_hz = config.pipeline.telemetry_rate_hz,
        sync_interval_ms = config.pipeline.sync_interval_ms,
        buffer_capacity = config.pipeline.telemetry_buffer_capacity,
        match_policy = ?config.pipeline.match_policy,
        sinks = config.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let options = RunOptions {
        config,
        max_records: (args.max_records > 0).then_some(args.max_records),
        duration: (args.duration > 0).then(|| Duration::from_secs(args.duration)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    };

    info!("Starting pipeline...");
    let summary = Orchestrator::new(options)
        .run(setup_shutdown_signal())
        .await
        .context("Pipeline execution failed")?;

    info!(
        records = summary.records_forwarded,
        dropped = summary.stats.records_dropped,
        duration_secs = summary.stats.duration.as_secs_f64(),
        reason = %summary.stop_reason,
        "Pipeline completed successfully"
    );
    summary.print();

    info!("Fusion pipeline finished");
    Ok(())
}

/// Load the config file (or defaults) and apply CLI overrides
pub fn load_effective_config(args: &RunArgs) -> Result<FusionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            info!("No configuration file given, using defaults");
            FusionConfig::default()
        }
    };

    let pipeline = &mut config.pipeline;
    if let Some(rate) = args.video_rate_hz {
        info!(rate, "Overriding video rate from CLI");
        pipeline.video_rate_hz = rate;
    }
    if let Some(rate) = args.telemetry_rate_hz {
        info!(rate, "Overriding telemetry rate from CLI");
        pipeline.telemetry_rate_hz = rate;
    }
    if let Some(interval) = args.sync_interval_ms {
        info!(interval, "Overriding sync interval from CLI");
        pipeline.sync_interval_ms = interval;
    }
    if let Some(capacity) = args.buffer_capacity {
        info!(capacity, "Overriding telemetry buffer capacity from CLI");
        pipeline.telemetry_buffer_capacity = capacity;
    }
    if let Some(policy) = args.match_policy {
        pipeline.match_policy = policy.into();
    }
    if let Some(seed) = args.seed {
        config.sources.seed = Some(seed);
    }
    if let Some(rate) = args.failure_rate {
        config.sources.failure_rate = rate;
    }

    // Overrides can invalidate a file that validated on load.
    config_loader::ConfigLoader::validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Received shutdown signal, stopping pipeline...");
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &FusionConfig) {
    let pipeline = &config.pipeline;
    println!("\n=== Configuration Summary ===\n");
    println!("Pipeline:");
    println!("  Video rate: {} Hz", pipeline.video_rate_hz);
    println!("  Telemetry rate: {} Hz", pipeline.telemetry_rate_hz);
    println!("  Sync interval: {} ms", pipeline.sync_interval_ms);
    println!("  Telemetry buffer: {}", pipeline.telemetry_buffer_capacity);
    println!("  Match policy: {:?}", pipeline.match_policy);
    println!("  Record queue: {}", pipeline.record_queue_capacity);

    let sources = &config.sources;
    println!("\nSources:");
    println!(
        "  Camera: {} ({} bytes/frame)",
        sources.video_source_id, sources.frame_payload_bytes
    );
    println!("  Sensor bus: {}", sources.telemetry_source_id);
    match sources.seed {
        Some(seed) => println!("  Seed: {}", seed),
        None => println!("  Seed: random"),
    }
    if sources.failure_rate > 0.0 {
        println!("  Failure rate: {}", sources.failure_rate);
    }

    if !config.sinks.is_empty() {
        println!("\nSinks ({}):", config.sinks.len());
        for sink in &config.sinks {
            println!(
                "  - {} ({:?}, queue {})",
                sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::io::Write;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["fusion-pipeline", "run"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Run(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_defaults_without_config_file() {
        let config = load_effective_config(&run_args(&[])).unwrap();
        assert_eq!(config.pipeline.video_rate_hz, 30.0);
        assert_eq!(config.sinks.len(), 1);
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[pipeline]\nvideo_rate_hz = 15.0\nsync_interval_ms = 250").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config =
            load_effective_config(&run_args(&["--config", &path, "--sync-interval-ms", "50"]))
                .unwrap();
        assert_eq!(config.pipeline.video_rate_hz, 15.0);
        assert_eq!(config.pipeline.sync_interval_ms, 50);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let err = load_effective_config(&run_args(&["--buffer-capacity", "0"])).unwrap_err();
        assert!(format!("{err:#}").contains("telemetry_buffer_capacity"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_effective_config(&run_args(&["--config", "/nonexistent/fusion.toml"]))
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
