//! Per-sink delivery accounting
//!
//! Every record offered to a sink ends in exactly one [`Delivery`] outcome.
//! [`SinkMetrics`] keeps the in-process totals for the end-of-run report and
//! mirrors each outcome to `fusion_records_dispatched_total{sink, status}`.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Final outcome of one record offered to one sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// `RecordSink::write` succeeded
    Written,
    /// `RecordSink::write` returned an error
    Failed,
    /// Never reached the sink: queue full or worker gone
    Dropped,
}

impl Delivery {
    /// Metric `status` label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::Failed => "failed",
            Self::Dropped => "dropped",
        }
    }
}

/// Live counters for one sink
#[derive(Debug)]
pub struct SinkMetrics {
    sink: String,
    queued: AtomicUsize,
    written: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl SinkMetrics {
    pub fn new(sink: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            queued: AtomicUsize::new(0),
            written: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Sink name used as the metric label
    pub fn sink(&self) -> &str {
        &self.sink
    }

    /// Count one outcome
    pub fn record(&self, outcome: Delivery) {
        let counter = match outcome {
            Delivery::Written => &self.written,
            Delivery::Failed => &self.failed,
            Delivery::Dropped => &self.dropped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        observability::record_sink_delivery(&self.sink, outcome.as_str());
    }

    /// Records waiting in the sink queue
    pub fn set_queued(&self, depth: usize) {
        self.queued.store(depth, Ordering::Relaxed);
        observability::record_sink_queue_depth(&self.sink, depth);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queued: self.queued.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SinkMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queued: usize,
    pub written: u64,
    pub failed: u64,
    pub dropped: u64,
}
