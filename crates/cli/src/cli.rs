//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Fusion Pipeline - real-time video/telemetry fusion
#[derive(Parser, Debug)]
#[command(
    name = "fusion-pipeline",
    author,
    version,
    about = "Real-time video/telemetry fusion pipeline",
    long_about = "Ingests video frames and platform telemetry at independent rates, \n\
                  pairs the current frame with a telemetry sample on a fixed cadence \n\
                  and dispatches the fused records to the configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FUSION_VERBOSE")]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FUSION_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the fusion pipeline on simulated hardware
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display the effective configuration
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "FUSION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override video ingestion rate (Hz)
    #[arg(long, env = "FUSION_VIDEO_RATE_HZ")]
    pub video_rate_hz: Option<f64>,

    /// Override telemetry polling rate (Hz)
    #[arg(long, env = "FUSION_TELEMETRY_RATE_HZ")]
    pub telemetry_rate_hz: Option<f64>,

    /// Override synchronizer interval (ms)
    #[arg(long, env = "FUSION_SYNC_INTERVAL_MS")]
    pub sync_interval_ms: Option<u64>,

    /// Override telemetry buffer capacity
    #[arg(long, env = "FUSION_BUFFER_CAPACITY")]
    pub buffer_capacity: Option<usize>,

    /// Override telemetry match policy
    #[arg(long, value_enum)]
    pub match_policy: Option<MatchPolicyArg>,

    /// Seed the simulated hardware for a reproducible run
    #[arg(long, env = "FUSION_SEED")]
    pub seed: Option<u64>,

    /// Probability in [0, 1] that a simulated acquisition fails
    #[arg(long)]
    pub failure_rate: Option<f64>,

    /// Stop after this many seconds (0 = until Ctrl+C)
    #[arg(long, default_value = "0", env = "FUSION_DURATION")]
    pub duration: u64,

    /// Stop after this many fused records (0 = unlimited)
    #[arg(long, default_value = "0", env = "FUSION_MAX_RECORDS")]
    pub max_records: u64,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "FUSION_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "fusion.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON instead of TOML
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Telemetry match policy
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum MatchPolicyArg {
    /// Most recently appended sample
    Latest,
    /// Sample closest in time to the frame
    Nearest,
}

impl From<MatchPolicyArg> for contracts::MatchPolicy {
    fn from(arg: MatchPolicyArg) -> Self {
        match arg {
            MatchPolicyArg::Latest => Self::Latest,
            MatchPolicyArg::Nearest => Self::Nearest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_overrides_parse() {
        let cli = Cli::parse_from([
            "fusion-pipeline",
            "run",
            "--video-rate-hz",
            "25",
            "--match-policy",
            "nearest",
            "--max-records",
            "10",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.video_rate_hz, Some(25.0));
        assert!(matches!(args.match_policy, Some(MatchPolicyArg::Nearest)));
        assert_eq!(args.max_records, 10);
        assert!(args.config.is_none());
    }
}
