//! LogSink - one structured tracing event per fused record

use contracts::{ContractError, FusedRecord, RecordSink};
use tracing::{info, instrument};

/// Sink that logs record summaries
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_record_summary(&self, record: &FusedRecord) {
        info!(
            sink = %self.name,
            sequence = record.sequence,
            frame_id = record.frame.sequence,
            source_id = %record.frame.source_id,
            latitude = record.telemetry.gnss.latitude,
            longitude = record.telemetry.gnss.longitude,
            pitch = record.telemetry.attitude.pitch,
            roll = record.telemetry.attitude.roll,
            range_m = record.telemetry.range_m,
            lag_ms = record.lag_ms(),
            "{}",
            summary_line(record)
        );
    }
}

/// `Frame <id> <-> LiDAR <range>m | Lag: <ms>ms`
pub fn summary_line(record: &FusedRecord) -> String {
    format!(
        "Frame {} <-> LiDAR {:.2}m | Lag: {:.0}ms",
        record.frame.sequence,
        record.telemetry.range_m,
        record.lag_ms()
    )
}

impl RecordSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, record),
        fields(sink = %self.name, sequence = record.sequence)
    )]
    async fn write(&mut self, record: &FusedRecord) -> Result<(), ContractError> {
        self.log_record_summary(record);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        assert!(sink.write(&record(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }

    #[test]
    fn test_summary_line_reports_real_lag() {
        assert_eq!(
            summary_line(&record(7)),
            "Frame 1007 <-> LiDAR 42.00m | Lag: 12ms"
        );
    }
}
