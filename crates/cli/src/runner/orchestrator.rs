//! Orchestrator - wires simulated hardware, controller and dispatcher.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use contracts::{FusedRecord, FusionConfig};
use dispatcher::DispatchReport;
use ingestion::{SimulatedCamera, SimulatedSensorBus};
use pipeline::{PipelineController, PipelineStats};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Orchestrator options
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Effective pipeline configuration
    pub config: FusionConfig,

    /// Maximum number of fused records to forward (None = unlimited)
    pub max_records: Option<u64>,

    /// Run duration (None = until shutdown signal)
    pub duration: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Why the forwarding loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Ctrl-C or SIGTERM
    Signal,
    /// `--duration` elapsed
    Duration,
    /// `--max-records` forwarded
    MaxRecords,
    /// The pipeline closed its record queue
    RecordsClosed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Signal => "shutdown signal",
            Self::Duration => "duration elapsed",
            Self::MaxRecords => "max records reached",
            Self::RecordsClosed => "record queue closed",
        };
        f.write_str(text)
    }
}

/// Outcome of a run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// What ended the forwarding loop
    pub stop_reason: StopReason,
    /// Records passed from the pipeline to the dispatcher
    pub records_forwarded: u64,
    /// Final pipeline counters
    pub stats: PipelineStats,
    /// Per-sink delivery totals
    pub dispatch: DispatchReport,
}

impl RunSummary {
    /// Print detailed summary
    pub fn print(&self) {
        println!();
        print!("{}", self.stats);
        println!("Stopped by: {}", self.stop_reason);
        println!("Records forwarded to sinks: {}", self.records_forwarded);
        for (name, metrics) in &self.dispatch.sinks {
            println!(
                "  sink {}: written={} failed={} dropped={}",
                name, metrics.written, metrics.failed, metrics.dropped
            );
        }
        println!();
    }
}

/// Main orchestrator
pub struct Orchestrator {
    options: RunOptions,
}

impl Orchestrator {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Run until `shutdown` resolves, the duration elapses or enough records were forwarded
    pub async fn run<S>(self, shutdown: S) -> Result<RunSummary>
    where
        S: Future<Output = ()>,
    {
        let config = &self.options.config;

        if let Some(port) = self.options.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let mut controller =
            PipelineController::new(config.clone()).context("Invalid pipeline configuration")?;

        let clock = controller.clock();
        let camera = SimulatedCamera::from_settings(&config.sources, clock.clone());
        let bus = SimulatedSensorBus::from_settings(&config.sources, clock);

        // Setup Dispatcher
        let queue_capacity = config.pipeline.record_queue_capacity;
        let (dispatch_tx, dispatch_rx) = mpsc::channel::<FusedRecord>(queue_capacity);
        if config.sinks.is_empty() {
            warn!("No sinks configured - fused records will be discarded");
        }
        let dispatcher = dispatcher::create_dispatcher(config.sinks.clone(), dispatch_rx)
            .context("Failed to create dispatcher")?;
        let dispatcher_handle = dispatcher.spawn();
        info!(sinks = config.sinks.len(), "Dispatcher started");

        // Start Pipeline
        let (record_tx, mut record_rx) = mpsc::channel::<FusedRecord>(queue_capacity);
        controller
            .start(camera, bus, record_tx)
            .context("Failed to start pipeline")?;

        let max_records = self.options.max_records;
        let deadline = async {
            match self.options.duration {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(shutdown);
        tokio::pin!(deadline);

        let mut forwarded: u64 = 0;
        let stop_reason = loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break StopReason::Signal,
                _ = &mut deadline => break StopReason::Duration,
                received = record_rx.recv() => {
                    let Some(record) = received else {
                        break StopReason::RecordsClosed;
                    };
                    if dispatch_tx.send(record).await.is_err() {
                        warn!("Dispatcher channel closed");
                        break StopReason::RecordsClosed;
                    }
                    forwarded += 1;

                    if max_records.is_some_and(|max| forwarded >= max) {
                        info!(records = forwarded, "Reached max records limit");
                        break StopReason::MaxRecords;
                    }
                }
            }
        };

        info!(reason = %stop_reason, "Shutting down pipeline...");
        let stats = controller.stop().await.context("Failed to stop pipeline")?;

        // Records fused before the stop landed are still delivered.
        if stop_reason != StopReason::MaxRecords {
            while let Ok(record) = record_rx.try_recv() {
                if dispatch_tx.send(record).await.is_err() {
                    break;
                }
                forwarded += 1;
            }
        }

        // Wait for dispatcher to flush
        drop(dispatch_tx);
        let dispatch = match tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await
        {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                warn!(error = %e, "Dispatcher task failed");
                DispatchReport::default()
            }
            Err(_) => {
                warn!("Dispatcher did not drain within 5s");
                DispatchReport::default()
            }
        };

        info!(
            records = forwarded,
            duration_secs = stats.duration.as_secs_f64(),
            rate = format!("{:.2}", stats.records_per_second()),
            "Pipeline shutdown complete"
        );

        Ok(RunSummary {
            stop_reason,
            records_forwarded: forwarded,
            stats,
            dispatch,
        })
    }
}
