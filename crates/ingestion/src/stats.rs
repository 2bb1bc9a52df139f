//! Ingestion metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-ingestor counters
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Ticks executed
    pub ticks: AtomicU64,

    /// Records acquired and stored
    pub acquired: AtomicU64,

    /// Acquisition failures
    pub failures: AtomicU64,

    /// Records evicted from a bounded store to make room
    pub evicted: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tick
    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a stored record
    pub fn record_acquired(&self) {
        self.acquired.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an acquisition failure
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an eviction
    pub fn record_evicted(&self) {
        self.evicted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            acquired: self.acquired.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Ticks executed
    pub ticks: u64,

    /// Records acquired and stored
    pub acquired: u64,

    /// Acquisition failures
    pub failures: u64,

    /// Records evicted from a bounded store
    pub evicted: u64,
}
