//! Fusion metrics
//!
//! Prometheus-facing helpers plus an in-process aggregator that turns the
//! stream of fused records into a run summary.

use std::collections::BTreeMap;

use contracts::FusedRecord;
use metrics::{counter, gauge, histogram};

/// Record one emitted fused record
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_fused_record;
///
/// if let Ok(record) = synchronizer.fuse() {
///     record_fused_record(&record);
/// }
/// ```
pub fn record_fused_record(record: &FusedRecord) {
    counter!("fusion_records_emitted_total").increment(1);
    gauge!("fusion_last_record_sequence").set(record.sequence as f64);
    histogram!("fusion_record_lag_ms").record(record.lag_ms());
    histogram!("fusion_range_m").record(record.telemetry.range_m);
}

/// Record a synchronizer tick that found a store empty
pub fn record_tick_skipped(reason: &'static str) {
    counter!("fusion_sync_skipped_total", "reason" => reason).increment(1);
}

/// Record a fused record dropped because the output queue was full
pub fn record_record_dropped() {
    counter!("fusion_records_dropped_total").increment(1);
}

/// Record the outcome of one record offered to a sink
///
/// `status` is `written`, `failed` (the sink returned an error) or `dropped`
/// (the record never reached the sink).
pub fn record_sink_delivery(sink_name: &str, status: &'static str) {
    counter!(
        "fusion_records_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record a sink's queue depth
pub fn record_sink_queue_depth(sink_name: &str, depth: usize) {
    gauge!("fusion_sink_queue_depth", "sink" => sink_name.to_string()).set(depth as f64);
}

/// Record telemetry buffer depth as seen by the synchronizer
pub fn record_buffer_depth(depth: usize) {
    gauge!("fusion_sync_telemetry_depth").set(depth as f64);
}

/// Fused record aggregator
///
/// Owned by the synchronizer; aggregates in memory for the end-of-run summary.
#[derive(Debug, Clone, Default)]
pub struct FusionMetricsAggregator {
    /// Records emitted
    pub total_records: u64,

    /// Records dropped on a full output queue
    pub total_dropped: u64,

    /// Ticks skipped, by reason
    pub skip_counts: BTreeMap<&'static str, u64>,

    /// Lag statistics (ms)
    pub lag_stats: RunningStats,

    /// Range statistics (m)
    pub range_stats: RunningStats,
}

impl FusionMetricsAggregator {
    /// Create new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for an emitted record
    pub fn update(&mut self, record: &FusedRecord) {
        self.total_records += 1;
        self.lag_stats.push(record.lag_ms());
        self.range_stats.push(record.telemetry.range_m);
    }

    /// Account for a skipped tick
    pub fn record_skip(&mut self, reason: &'static str) {
        *self.skip_counts.entry(reason).or_insert(0) += 1;
    }

    /// Account for a dropped record
    pub fn record_drop(&mut self) {
        self.total_dropped += 1;
    }

    /// Total skipped ticks across reasons
    pub fn total_skipped(&self) -> u64 {
        self.skip_counts.values().sum()
    }

    /// Summary report
    pub fn summary(&self) -> MetricsSummary {
        let produced = self.total_records + self.total_dropped;
        MetricsSummary {
            total_records: self.total_records,
            total_dropped: self.total_dropped,
            total_skipped: self.total_skipped(),
            drop_rate: if produced > 0 {
                self.total_dropped as f64 / produced as f64 * 100.0
            } else {
                0.0
            },
            lag_ms: StatsSummary::from(&self.lag_stats),
            range_m: StatsSummary::from(&self.range_stats),
            skip_counts: self.skip_counts.clone(),
        }
    }

    /// Reset statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_records: u64,
    pub total_dropped: u64,
    pub total_skipped: u64,
    pub drop_rate: f64,
    pub lag_ms: StatsSummary,
    pub range_m: StatsSummary,
    pub skip_counts: BTreeMap<&'static str, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Fusion Metrics Summary ===")?;
        writeln!(f, "Records emitted: {}", self.total_records)?;
        writeln!(
            f,
            "Records dropped: {} ({:.2}%)",
            self.total_dropped, self.drop_rate
        )?;
        writeln!(f, "Ticks skipped: {}", self.total_skipped)?;
        writeln!(f, "Lag (ms): {}", self.lag_ms)?;
        writeln!(f, "Range (m): {}", self.range_m)?;

        if !self.skip_counts.is_empty() {
            writeln!(f, "Skip reasons:")?;
            for (reason, count) in &self.skip_counts {
                writeln!(f, "  {}: {}", reason, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Attitude, FrameDescriptor, GnssFix, ManualClock, TelemetrySample};
    use std::sync::Arc;
    use std::time::Duration;

    fn record(sequence: u64, frame_ms: u64, telemetry_ms: u64) -> FusedRecord {
        let clock = ManualClock::new();
        let frame = Arc::new(FrameDescriptor::new(
            "cam",
            clock.at(Duration::from_millis(frame_ms)),
            sequence,
            0,
        ));
        let telemetry = TelemetrySample::new(
            GnssFix {
                latitude: 42.5,
                longitude: -71.2,
            },
            Attitude {
                pitch: 0.0,
                roll: 0.0,
            },
            50.0,
            clock.at(Duration::from_millis(telemetry_ms)),
        )
        .unwrap();
        FusedRecord::pair(sequence, frame, telemetry, clock.at(Duration::from_millis(frame_ms)))
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_tracks_lag() {
        let mut aggregator = FusionMetricsAggregator::new();

        aggregator.update(&record(1, 100, 90));
        aggregator.update(&record(2, 200, 170));
        aggregator.record_skip("no_frame");
        aggregator.record_skip("no_frame");
        aggregator.record_drop();

        let summary = aggregator.summary();
        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.total_dropped, 1);
        assert_eq!(summary.total_skipped, 2);
        assert_eq!(summary.skip_counts.get("no_frame"), Some(&2));
        assert!((summary.lag_ms.min - 10.0).abs() < 1e-9);
        assert!((summary.lag_ms.max - 30.0).abs() < 1e-9);
        assert!((summary.lag_ms.mean - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_display() {
        let summary = MetricsSummary {
            total_records: 100,
            total_dropped: 5,
            total_skipped: 2,
            drop_rate: 5.0,
            lag_ms: StatsSummary {
                count: 100,
                min: 1.0,
                max: 80.0,
                mean: 30.0,
                std_dev: 15.0,
            },
            range_m: StatsSummary::default(),
            skip_counts: BTreeMap::new(),
        };

        let output = format!("{}", summary);
        assert!(output.contains("Records emitted: 100"));
        assert!(output.contains("5.00%"));
        assert!(output.contains("Range (m): N/A"));
    }
}
