//! Dispatcher - main loop for fan-out to sinks

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{FusedRecord, SinkConfig, SinkType};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{LogSink, StdoutSink};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Sink configurations
    pub sinks: Vec<SinkConfig>,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    input_rx: mpsc::Receiver<FusedRecord>,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: DispatcherConfig, input_rx: mpsc::Receiver<FusedRecord>) -> Self {
        Self { config, input_rx }
    }

    /// Build and start the sink workers
    #[instrument(name = "dispatcher_builder_build", skip(self))]
    pub fn build(self) -> Result<Dispatcher, DispatcherError> {
        let handles = Self::initialize_handles(&self.config)?;

        Ok(Dispatcher {
            handles,
            input_rx: self.input_rx,
        })
    }

    #[instrument(
        name = "dispatcher_initialize_handles",
        skip(config),
        fields(sink_count = config.sinks.len())
    )]
    fn initialize_handles(config: &DispatcherConfig) -> Result<Vec<SinkHandle>, DispatcherError> {
        let mut handles = Vec::with_capacity(config.sinks.len());
        for sink_config in &config.sinks {
            handles.push(create_sink_handle(sink_config)?);
        }
        Ok(handles)
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, DispatcherError> {
    if config.queue_capacity == 0 {
        return Err(DispatcherError::sink_creation(
            &config.name,
            "queue_capacity must be > 0",
        ));
    }

    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Stdout => {
            let sink = StdoutSink::stdout(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// Per-sink accounting returned when the dispatcher exits
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Records received from the input channel
    pub records: u64,

    /// Final metrics per sink, in configuration order
    pub sinks: Vec<(String, MetricsSnapshot)>,
}

/// The main Dispatcher that fans out records to sinks
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    input_rx: mpsc::Receiver<FusedRecord>,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles (for testing)
    pub fn with_handles(handles: Vec<SinkHandle>, input_rx: mpsc::Receiver<FusedRecord>) -> Self {
        Self { handles, input_rx }
    }

    /// Run the dispatcher main loop
    ///
    /// Consumes records from input and fans out to all sinks.
    /// Returns when input channel is closed and every sink has drained.
    #[instrument(name = "dispatcher_run", skip(self))]
    pub async fn run(mut self) -> DispatchReport {
        info!(sinks = self.handles.len(), "Dispatcher started");

        let mut record_count: u64 = 0;

        while let Some(record) = self.input_rx.recv().await {
            record_count += 1;
            self.dispatch_record(&record);

            if record_count.is_multiple_of(100) {
                debug!(records = record_count, "Dispatcher progress");
            }
        }

        info!(
            records = record_count,
            "Dispatcher input closed, shutting down"
        );

        let mut sinks = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            let name = handle.name().to_string();
            sinks.push((name, handle.shutdown().await));
        }

        info!("Dispatcher shutdown complete");

        DispatchReport {
            records: record_count,
            sinks,
        }
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self) -> JoinHandle<DispatchReport> {
        tokio::spawn(self.run())
    }

    fn dispatch_record(&self, record: &FusedRecord) {
        for handle in &self.handles {
            // Drops are counted and logged by the handle.
            let _ = handle.offer(record.clone());
        }
    }
}

/// Convenience function to create a dispatcher from sink configs
#[instrument(name = "dispatcher_create", skip(sink_configs, input_rx))]
pub fn create_dispatcher(
    sink_configs: Vec<SinkConfig>,
    input_rx: mpsc::Receiver<FusedRecord>,
) -> Result<Dispatcher, DispatcherError> {
    let config = DispatcherConfig {
        sinks: sink_configs,
    };
    DispatcherBuilder::new(config, input_rx).build()
}
