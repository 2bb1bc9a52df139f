//! Simulated Pipeline Example
//!
//! Reads a configuration file, wires the simulated camera and sensor bus,
//! runs the controller for a few seconds and fans records out through the
//! dispatcher.
//!
//! Run with: cargo run -p demos --bin simulated_pipeline [config_path]

use std::path::PathBuf;
use std::time::Duration;

use config_loader::ConfigLoader;
use contracts::FusedRecord;
use dispatcher::{create_dispatcher, summary_line};
use ingestion::{SimulatedCamera, SimulatedSensorBus};
use observability::{LogFormat, ObservabilityConfig};
use pipeline::PipelineController;
use tokio::sync::mpsc;
use tracing::info;

const RUN_FOR: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Compact,
        ..Default::default()
    })?;

    info!("Starting Simulated Pipeline Demo");

    let config_path = resolve_config_path();
    let config = if config_path.exists() {
        info!(path = %config_path.display(), "Loading config file");
        ConfigLoader::load_from_path(config_path.as_path())?
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        Default::default()
    };

    // ==== Stage 1: Controller and simulated hardware ====
    let mut controller = PipelineController::new(config.clone())?;
    let clock = controller.clock();
    let camera = SimulatedCamera::from_settings(&config.sources, clock.clone());
    let bus = SimulatedSensorBus::from_settings(&config.sources, clock);

    // ==== Stage 2: Dispatcher with sinks from config ====
    let queue_capacity = config.pipeline.record_queue_capacity;
    let (record_tx, mut record_rx) = mpsc::channel::<FusedRecord>(queue_capacity);
    let (dispatch_tx, dispatch_rx) = mpsc::channel::<FusedRecord>(queue_capacity);
    let dispatcher_handle = create_dispatcher(config.sinks.clone(), dispatch_rx)?.spawn();

    // Tap every tenth record for the console before forwarding.
    let tap = tokio::spawn(async move {
        while let Some(record) = record_rx.recv().await {
            if record.sequence % 10 == 0 {
                info!("{}", summary_line(&record));
            }
            if dispatch_tx.send(record).await.is_err() {
                break;
            }
        }
    });

    // ==== Stage 3: Run ====
    controller.start(camera, bus, record_tx)?;
    info!(seconds = RUN_FOR.as_secs(), "Pipeline running");
    tokio::time::sleep(RUN_FOR).await;

    // ==== Stage 4: Graceful Shutdown ====
    info!("Shutting down...");
    let stats = controller.stop().await?;
    let _ = tap.await;

    match tokio::time::timeout(Duration::from_secs(2), dispatcher_handle).await {
        Ok(Ok(report)) => {
            for (name, snapshot) in &report.sinks {
                info!(
                    sink = %name,
                    written = snapshot.written,
                    dropped = snapshot.dropped,
                    "Sink finished"
                );
            }
        }
        Ok(Err(e)) => info!("Dispatcher task error: {:?}", e),
        Err(_) => info!("Dispatcher timed out"),
    }

    println!("{stats}");
    info!("Simulated Pipeline Demo finished");
    Ok(())
}

fn resolve_config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("fusion.toml"))
}
