//! Run statistics

use std::fmt;
use std::time::Duration;

use contracts::{ActivityKind, ActivityReport};
use observability::StatsSummary;

/// Statistics from one controller run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Video ingestion accounting
    pub video: ActivityReport,

    /// Telemetry ingestion accounting
    pub telemetry: ActivityReport,

    /// Synchronizer accounting
    pub sync: ActivityReport,

    /// Fused records queued for output
    pub records_emitted: u64,

    /// Empty-state sync skips
    pub records_skipped: u64,

    /// Fused records lost on a full or closed output queue
    pub records_dropped: u64,

    /// Frames written into the frame slot
    pub frames_published: u64,

    /// Telemetry samples evicted from the ring buffer
    pub telemetry_evicted: u64,

    /// Telemetry samples appended out of time order
    pub telemetry_out_of_order: u64,

    /// Frame/telemetry lag over emitted records (ms)
    pub lag_ms: StatsSummary,

    /// Time between start and the last activity exiting
    pub duration: Duration,
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self {
            video: ActivityReport::new(ActivityKind::VideoIngestion),
            telemetry: ActivityReport::new(ActivityKind::TelemetryIngestion),
            sync: ActivityReport::new(ActivityKind::Synchronization),
            records_emitted: 0,
            records_skipped: 0,
            records_dropped: 0,
            frames_published: 0,
            telemetry_evicted: 0,
            telemetry_out_of_order: 0,
            lag_ms: StatsSummary::default(),
            duration: Duration::ZERO,
        }
    }
}

impl PipelineStats {
    /// Emitted records per second
    pub fn records_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.records_emitted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Dropped share of fused records, as percentage
    pub fn drop_rate(&self) -> f64 {
        let total = self.records_emitted + self.records_dropped;
        if total > 0 {
            (self.records_dropped as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Acquisition failures across both producers
    pub fn acquisition_failures(&self) -> u64 {
        self.video.failed + self.telemetry.failed
    }
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Pipeline Statistics ===")?;
        writeln!(f, "Duration: {:.2}s", self.duration.as_secs_f64())?;
        writeln!(
            f,
            "Records: {} emitted, {} skipped, {} dropped ({:.2}%)",
            self.records_emitted,
            self.records_skipped,
            self.records_dropped,
            self.drop_rate()
        )?;
        writeln!(f, "Throughput: {:.2} records/s", self.records_per_second())?;
        writeln!(f, "Lag (ms): {}", self.lag_ms)?;
        for report in [&self.video, &self.telemetry, &self.sync] {
            writeln!(
                f,
                "{}: ticks={} ok={} failed={} skipped={}",
                report.kind, report.ticks, report.succeeded, report.failed, report.skipped
            )?;
        }
        writeln!(
            f,
            "Telemetry buffer: {} evicted, {} out of order",
            self.telemetry_evicted, self.telemetry_out_of_order
        )
    }
}
