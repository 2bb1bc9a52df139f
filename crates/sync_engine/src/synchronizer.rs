//! Synchronizer - periodic fusion activity
//!
//! Each tick reads the frame slot and the telemetry buffer, pairs the current
//! frame with the selected telemetry sample and pushes the fused record into a
//! bounded channel without waiting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{
    tick_interval, ActivityKind, ActivityReport, FusedRecord, MatchPolicy, SharedClock,
    StopSignal,
};
use ingestion::{FrameSlot, TelemetryBuffer};
use observability::{FusionMetricsAggregator, MetricsSummary};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, instrument, trace, warn};

use crate::matcher;

/// Why a tick produced nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Frame slot not written yet
    NoFrame,
    /// Telemetry buffer empty
    NoTelemetry,
}

impl SkipReason {
    /// Metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoFrame => "no_frame",
            Self::NoTelemetry => "no_telemetry",
        }
    }
}

/// Result of one synchronizer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Record queued, carrying its sequence number
    Emitted(u64),
    /// Empty-state skip
    Skipped(SkipReason),
    /// Output queue full, record discarded
    Dropped,
    /// Output queue receiver gone, record discarded
    Closed,
}

/// Live synchronizer counters
#[derive(Debug, Default)]
pub struct SyncMetrics {
    /// Ticks processed, whatever their outcome
    pub ticks: AtomicU64,
    /// Records handed to the output queue
    pub emitted: AtomicU64,
    /// Ticks with no frame or no telemetry yet
    pub skipped: AtomicU64,
    /// Records discarded because the output queue was full
    pub dropped: AtomicU64,
    /// Records discarded because the output queue was closed
    pub closed: AtomicU64,
}

impl SyncMetrics {
    /// All counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Get snapshot
    pub fn snapshot(&self) -> SyncMetricsSnapshot {
        SyncMetricsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            emitted: self.emitted.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            closed: self.closed.load(Ordering::Relaxed),
        }
    }
}

/// Synchronizer counters snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncMetricsSnapshot {
    /// See [`SyncMetrics::ticks`]
    pub ticks: u64,
    /// See [`SyncMetrics::emitted`]
    pub emitted: u64,
    /// See [`SyncMetrics::skipped`]
    pub skipped: u64,
    /// See [`SyncMetrics::dropped`]
    pub dropped: u64,
    /// See [`SyncMetrics::closed`]
    pub closed: u64,
}

/// What the synchronizer hands back when it exits
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Tick accounting
    pub activity: ActivityReport,

    /// Lag / drop / skip aggregates
    pub summary: MetricsSummary,
}

/// Periodic consumer fusing the latest frame with a telemetry sample
pub struct Synchronizer {
    slot: FrameSlot,
    buffer: TelemetryBuffer,
    policy: MatchPolicy,
    clock: SharedClock,
    output: mpsc::Sender<FusedRecord>,
    interval: Duration,
    next_sequence: u64,
    metrics: Arc<SyncMetrics>,
    aggregator: FusionMetricsAggregator,
    closed_reported: bool,
}

impl Synchronizer {
    /// Create a synchronizer with the `latest` match policy
    pub fn new(
        slot: FrameSlot,
        buffer: TelemetryBuffer,
        output: mpsc::Sender<FusedRecord>,
        clock: SharedClock,
        interval: Duration,
    ) -> Self {
        Self {
            slot,
            buffer,
            policy: MatchPolicy::default(),
            clock,
            output,
            interval,
            next_sequence: 1,
            metrics: Arc::new(SyncMetrics::new()),
            aggregator: FusionMetricsAggregator::new(),
            closed_reported: false,
        }
    }

    /// Set the match policy
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<SyncMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Aggregated statistics so far
    pub fn summary(&self) -> MetricsSummary {
        self.aggregator.summary()
    }

    /// Build the record the next tick would emit, without emitting it
    ///
    /// # Errors
    /// Returns the [`SkipReason`] when either store is empty
    pub fn fuse(&self) -> Result<FusedRecord, SkipReason> {
        let frame = self.slot.get().ok_or(SkipReason::NoFrame)?;
        let telemetry =
            matcher::select(self.policy, &frame, &self.buffer).ok_or(SkipReason::NoTelemetry)?;

        Ok(FusedRecord::pair(
            self.next_sequence,
            frame,
            telemetry,
            self.clock.now(),
        ))
    }

    /// One tick body
    ///
    /// Never waits: a full output queue drops the record.
    pub fn tick(&mut self) -> TickOutcome {
        self.metrics.ticks.fetch_add(1, Ordering::Relaxed);

        let record = match self.fuse() {
            Ok(record) => record,
            Err(reason) => {
                self.metrics.skipped.fetch_add(1, Ordering::Relaxed);
                self.aggregator.record_skip(reason.as_str());
                observability::record_tick_skipped(reason.as_str());
                trace!(reason = reason.as_str(), "sync tick skipped");
                return TickOutcome::Skipped(reason);
            }
        };

        // Dropped records still consume a number so gaps are visible downstream.
        let sequence = record.sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        observability::record_buffer_depth(self.buffer.len());

        match self.output.try_send(record.clone()) {
            Ok(()) => {
                self.metrics.emitted.fetch_add(1, Ordering::Relaxed);
                self.aggregator.update(&record);
                observability::record_fused_record(&record);
                trace!(
                    sequence,
                    frame_sequence = record.frame.sequence,
                    lag_ms = record.lag_ms(),
                    "fused record emitted"
                );
                TickOutcome::Emitted(sequence)
            }
            Err(TrySendError::Full(_)) => {
                self.metrics.dropped.fetch_add(1, Ordering::Relaxed);
                self.aggregator.record_drop();
                observability::record_record_dropped();
                warn!(sequence, "record queue full, fused record dropped");
                TickOutcome::Dropped
            }
            Err(TrySendError::Closed(_)) => {
                self.metrics.closed.fetch_add(1, Ordering::Relaxed);
                self.aggregator.record_drop();
                if !self.closed_reported {
                    self.closed_reported = true;
                    warn!(sequence, "record queue closed, fused records are discarded");
                }
                TickOutcome::Closed
            }
        }
    }

    /// Run until `stop` fires
    #[instrument(
        name = "synchronizer_run",
        skip(self, stop),
        fields(interval_ms = self.interval.as_millis() as u64, policy = ?self.policy)
    )]
    pub async fn run(mut self, mut stop: StopSignal) -> SyncReport {
        let mut report = ActivityReport::new(ActivityKind::Synchronization);
        let mut ticker = tick_interval(self.interval);

        info!("synchronizer started");

        while !stop.is_stopped() {
            tokio::select! {
                biased;
                _ = stop.stopped() => break,
                _ = ticker.tick() => {}
            }

            report.ticks += 1;
            match self.tick() {
                TickOutcome::Emitted(_) => report.succeeded += 1,
                TickOutcome::Skipped(_) => report.skipped += 1,
                TickOutcome::Dropped | TickOutcome::Closed => report.failed += 1,
            }
        }

        let summary = self.aggregator.summary();
        info!(
            ticks = report.ticks,
            emitted = report.succeeded,
            skipped = report.skipped,
            dropped = report.failed,
            lag_mean_ms = summary.lag_ms.mean,
            "synchronizer stopped"
        );

        SyncReport {
            activity: report,
            summary,
        }
    }
}
