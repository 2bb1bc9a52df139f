//! Telemetry ingestion activity
//!
//! Polls a [`TelemetrySource`] once per tick and appends the sample to the
//! shared [`TelemetryBuffer`], evicting the oldest sample when full.

use std::sync::Arc;
use std::time::Duration;

use contracts::{
    tick_interval, ActivityKind, ActivityReport, ContractError, StopSignal, TelemetrySource,
};
use metrics::{counter, gauge};
use tracing::{debug, info, instrument, trace, warn};

use crate::buffer::TelemetryBuffer;
use crate::stats::IngestionMetrics;

/// Periodic telemetry producer
pub struct TelemetryIngestor<S> {
    source: S,
    buffer: TelemetryBuffer,
    period: Duration,
    metrics: Arc<IngestionMetrics>,
}

impl<S: TelemetrySource> TelemetryIngestor<S> {
    /// Create an ingestor appending to `buffer` every `period`
    pub fn new(source: S, buffer: TelemetryBuffer, period: Duration) -> Self {
        Self {
            source,
            buffer,
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

    /// One tick body: poll the bus and append the sample
    ///
    /// Returns the buffer depth after the append.
    ///
    /// # Errors
    /// Returns the acquisition error after logging and counting it
    pub async fn tick(&mut self) -> Result<usize, ContractError> {
        self.metrics.record_tick();

        let sample = match self.source.acquire().await {
            Ok(sample) => sample,
            Err(e) => {
                self.metrics.record_failure();
                counter!(
                    "fusion_acquisition_failures_total",
                    "activity" => ActivityKind::TelemetryIngestion.as_str()
                )
                .increment(1);
                warn!(
                    source_id = %self.source.source_id(),
                    error = %e,
                    "telemetry read failed, continuing"
                );
                return Err(e);
            }
        };

        if self.buffer.append(sample).is_some() {
            self.metrics.record_evicted();
            counter!("fusion_telemetry_evicted_total").increment(1);
        }
        self.metrics.record_acquired();
        counter!("fusion_telemetry_samples_total").increment(1);

        let depth = self.buffer.len();
        gauge!("fusion_telemetry_buffer_depth").set(depth as f64);
        trace!(
            source_id = %self.source.source_id(),
            range_m = sample.range_m,
            depth,
            "telemetry sample stored"
        );
        Ok(depth)
    }

    /// Run until `stop` fires
    #[instrument(
        name = "telemetry_ingestor_run",
        skip(self, stop),
        fields(source_id = %self.source.source_id(), period_ms = self.period.as_millis() as u64)
    )]
    pub async fn run(mut self, mut stop: StopSignal) -> ActivityReport {
        let mut report = ActivityReport::new(ActivityKind::TelemetryIngestion);
        let mut ticker = tick_interval(self.period);

        info!(capacity = self.buffer.capacity(), "telemetry ingestion started");

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
                    debug!("stop requested during bus read");
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
            stored = report.succeeded,
            failures = report.failed,
            evicted = self.buffer.evicted_count(),
            "telemetry ingestion stopped"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{CountingSensorBus, ScriptedTelemetrySource};
    use contracts::{Attitude, GnssFix, ManualClock, PipelineState, TelemetrySample};

    fn sample(clock: &ManualClock, ms: u64, range_m: f64) -> TelemetrySample {
        TelemetrySample::new(
            GnssFix {
                latitude: 42.5,
                longitude: -71.2,
            },
            Attitude {
                pitch: 0.0,
                roll: 0.0,
            },
            range_m,
            clock.at(Duration::from_millis(ms)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_tick_appends_and_evicts_oldest() {
        let clock = Arc::new(ManualClock::new());
        let buffer = TelemetryBuffer::new(2).unwrap();
        let mut ingestor = TelemetryIngestor::new(
            CountingSensorBus::new("bus", clock.clone()),
            buffer.clone(),
            Duration::from_millis(100),
        );

        for _ in 0..3 {
            clock.advance(Duration::from_millis(100));
            ingestor.tick().await.unwrap();
        }

        let ranges: Vec<f64> = buffer.snapshot().iter().map(|s| s.range_m).collect();
        assert_eq!(ranges, vec![12.0, 13.0]);
        assert_eq!(buffer.evicted_count(), 1);
        assert_eq!(ingestor.metrics().snapshot().evicted, 1);
    }

    #[tokio::test]
    async fn test_failed_read_leaves_buffer_untouched() {
        let clock = ManualClock::new();
        let buffer = TelemetryBuffer::new(4).unwrap();
        let source = ScriptedTelemetrySource::new(
            "bus",
            vec![
                Ok(sample(&clock, 10, 30.0)),
                Err(ContractError::acquisition("bus", "i2c nack")),
                Ok(sample(&clock, 30, 31.0)),
            ],
        );
        let mut ingestor = TelemetryIngestor::new(source, buffer.clone(), Duration::from_millis(10));

        assert_eq!(ingestor.tick().await.unwrap(), 1);
        assert!(ingestor.tick().await.is_err());
        assert_eq!(buffer.len(), 1);
        assert_eq!(ingestor.tick().await.unwrap(), 2);
        assert_eq!(buffer.latest().unwrap().range_m, 31.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_at_period() {
        let clock = Arc::new(ManualClock::new());
        let buffer = TelemetryBuffer::new(50).unwrap();
        let ingestor = TelemetryIngestor::new(
            CountingSensorBus::new("bus", clock),
            buffer.clone(),
            Duration::from_millis(100),
        );

        let state = PipelineState::new();
        let handle = tokio::spawn(ingestor.run(state.subscribe()));

        tokio::time::sleep(Duration::from_millis(550)).await;
        state.request_stop();
        let report = handle.await.unwrap();

        assert_eq!(report.ticks, 5);
        assert_eq!(report.succeeded, 5);
        assert_eq!(buffer.len(), 5);
    }
}
