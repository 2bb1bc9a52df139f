//! Video ingestion activity
//!
//! Pulls one frame descriptor per tick from a [`FrameSource`] and publishes it
//! into the shared [`FrameSlot`].

use std::sync::Arc;
use std::time::Duration;

use contracts::{
    tick_interval, ActivityKind, ActivityReport, ContractError, FrameSource, StopSignal,
};
use metrics::counter;
use tracing::{debug, info, instrument, trace, warn};

use crate::frame_slot::FrameSlot;
use crate::stats::IngestionMetrics;

/// Periodic video producer
pub struct VideoIngestor<S> {
    source: S,
    slot: FrameSlot,
    period: Duration,
    metrics: Arc<IngestionMetrics>,
}

impl<S: FrameSource> VideoIngestor<S> {
    /// Create an ingestor writing into `slot` every `period`
    pub fn new(source: S, slot: FrameSlot, period: Duration) -> Self {
        Self {
            source,
            slot,
            period,
            metrics: Arc::new(IngestionMetrics::new()),
        }
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Tick period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// One tick body: acquire and publish a frame
    ///
    /// Returns the published frame's sequence number.
    ///
    /// # Errors
    /// Returns the acquisition error after logging and counting it
    pub async fn tick(&mut self) -> Result<u64, ContractError> {
        self.metrics.record_tick();

        match self.source.acquire().await {
            Ok(frame) => {
                let sequence = frame.sequence;
                self.slot.set(frame);
                self.metrics.record_acquired();
                counter!("fusion_frames_acquired_total").increment(1);
                trace!(source_id = %self.source.source_id(), sequence, "frame published");
                Ok(sequence)
            }
            Err(e) => {
                self.metrics.record_failure();
                counter!(
                    "fusion_acquisition_failures_total",
                    "activity" => ActivityKind::VideoIngestion.as_str()
                )
                .increment(1);
                warn!(
                    source_id = %self.source.source_id(),
                    error = %e,
                    "frame acquisition failed, continuing"
                );
                Err(e)
            }
        }
    }

    /// Run until `stop` fires
    #[instrument(
        name = "video_ingestor_run",
        skip(self, stop),
        fields(source_id = %self.source.source_id(), period_ms = self.period.as_millis() as u64)
    )]
    pub async fn run(mut self, mut stop: StopSignal) -> ActivityReport {
        let mut report = ActivityReport::new(ActivityKind::VideoIngestion);
        let mut ticker = tick_interval(self.period);

        info!("video ingestion started");

        while !stop.is_stopped() {
            tokio::select! {
                biased;
                _ = stop.stopped() => break,
                _ = ticker.tick() => {}
            }

            report.ticks += 1;
            tokio::select! {
                biased;
                _ = stop.stopped() => {
                    debug!("stop requested during acquisition");
                    break;
                }
                result = self.tick() => match result {
                    Ok(_) => report.succeeded += 1,
                    Err(_) => report.failed += 1,
                },
            }
        }

        info!(
            ticks = report.ticks,
            published = report.succeeded,
            failures = report.failed,
            "video ingestion stopped"
        );
        report
    }
}
