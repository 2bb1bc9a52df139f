//! SinkHandle - one sink behind its own bounded queue
//!
//! The dispatcher only ever calls [`SinkHandle::offer`], which never waits: a
//! full queue drops the record for this sink alone. Writes happen on a
//! dedicated worker task that drains the queue, then flushes and closes the
//! sink once the handle is shut down.

use std::sync::Arc;

use contracts::{FusedRecord, RecordSink};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use crate::error::DispatcherError;
use crate::metrics::{Delivery, MetricsSnapshot, SinkMetrics};

/// Producer side of a sink worker
pub struct SinkHandle {
    metrics: Arc<SinkMetrics>,
    queue: mpsc::Sender<FusedRecord>,
    worker: JoinHandle<()>,
}

impl SinkHandle {
    /// Start a worker for `sink` with room for `queue_capacity` pending records
    ///
    /// `queue_capacity` must be > 0.
    pub fn spawn<S: RecordSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let metrics = Arc::new(SinkMetrics::new(sink.name()));
        let (queue, pending) = mpsc::channel(queue_capacity);

        let worker = SinkWorker {
            sink,
            pending,
            metrics: Arc::clone(&metrics),
        };

        Self {
            metrics,
            queue,
            worker: tokio::spawn(worker.run()),
        }
    }

    pub fn name(&self) -> &str {
        self.metrics.sink()
    }

    /// Delivery counters so far
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Queue a record for the worker without waiting
    ///
    /// # Errors
    /// `QueueFull` when the worker is behind, `WorkerClosed` when it has
    /// exited. Either way the record is counted as dropped for this sink.
    pub fn offer(&self, record: FusedRecord) -> Result<(), DispatcherError> {
        let sequence = record.sequence;
        let err = match self.queue.try_send(record) {
            Ok(()) => {
                self.metrics
                    .set_queued(self.queue.max_capacity() - self.queue.capacity());
                return Ok(());
            }
            Err(TrySendError::Full(_)) => {
                warn!(sink = %self.name(), sequence, "sink queue full, record dropped");
                DispatcherError::QueueFull {
                    sink_name: self.name().to_string(),
                    sequence,
                }
            }
            Err(TrySendError::Closed(_)) => {
                error!(sink = %self.name(), sequence, "sink worker gone, record dropped");
                DispatcherError::WorkerClosed {
                    sink_name: self.name().to_string(),
                }
            }
        };
        self.metrics.record(Delivery::Dropped);
        Err(err)
    }

    /// Close the queue, wait for the worker to drain it, and return the final counters
    #[instrument(name = "sink_shutdown", skip(self), fields(sink = %self.name()))]
    pub async fn shutdown(self) -> MetricsSnapshot {
        let Self {
            metrics,
            queue,
            worker,
        } = self;
        drop(queue);

        if let Err(e) = worker.await {
            error!(error = %e, "sink worker panicked");
        }
        metrics.snapshot()
    }
}

/// Consumer side: owns the sink for its whole life
struct SinkWorker<S> {
    sink: S,
    pending: mpsc::Receiver<FusedRecord>,
    metrics: Arc<SinkMetrics>,
}

impl<S: RecordSink> SinkWorker<S> {
    #[instrument(name = "sink_worker", skip_all, fields(sink = %self.metrics.sink()))]
    async fn run(mut self) {
        debug!("sink worker started");

        while let Some(record) = self.pending.recv().await {
            self.metrics.set_queued(self.pending.len());
            self.deliver(&record).await;
        }

        self.finish().await;
    }

    async fn deliver(&mut self, record: &FusedRecord) {
        match self.sink.write(record).await {
            Ok(()) => self.metrics.record(Delivery::Written),
            Err(e) => {
                // One bad write never stops the worker.
                self.metrics.record(Delivery::Failed);
                error!(sequence = record.sequence, error = %e, "sink write failed");
            }
        }
    }

    async fn finish(mut self) {
        if let Err(e) = self.sink.flush().await {
            error!(error = %e, "sink flush failed");
        }
        if let Err(e) = self.sink.close().await {
            error!(error = %e, "sink close failed");
        }
        debug!(
            written = self.metrics.snapshot().written,
            "sink worker stopped"
        );
    }
}
