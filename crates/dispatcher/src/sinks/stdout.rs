//! JsonLinesSink - one JSON object per line
//!
//! [`StdoutSink`] is the stdout instance; any `AsyncWrite` works.

use chrono::{DateTime, Utc};
use contracts::{ContractError, FusedRecord, RecordSink};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tracing::{debug, instrument};

/// Flat, stable wire shape of a fused record
#[derive(Debug, Serialize)]
struct RecordLine<'a> {
    sequence: u64,
    source_id: &'a str,
    frame_id: u64,
    payload_bytes: u64,
    frame_captured_at: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    pitch: f64,
    roll: f64,
    range_m: f64,
    telemetry_captured_at: DateTime<Utc>,
    lag_ms: f64,
    generated_at: DateTime<Utc>,
}

impl<'a> From<&'a FusedRecord> for RecordLine<'a> {
    fn from(record: &'a FusedRecord) -> Self {
        Self {
            sequence: record.sequence,
            source_id: &record.frame.source_id,
            frame_id: record.frame.sequence,
            payload_bytes: record.frame.payload_bytes,
            frame_captured_at: record.frame.captured_at.wall,
            latitude: record.telemetry.gnss.latitude,
            longitude: record.telemetry.gnss.longitude,
            pitch: record.telemetry.attitude.pitch,
            roll: record.telemetry.attitude.roll,
            range_m: record.telemetry.range_m,
            telemetry_captured_at: record.telemetry.captured_at.wall,
            lag_ms: record.lag_ms(),
            generated_at: record.generated_at.wall,
        }
    }
}

/// Sink writing JSON lines to an async writer
pub struct JsonLinesSink<W> {
    name: String,
    writer: W,
    lines: u64,
}

/// JSON lines on the process stdout
pub type StdoutSink = JsonLinesSink<Stdout>;

impl StdoutSink {
    /// Create a sink bound to stdout
    pub fn stdout(name: impl Into<String>) -> Self {
        Self::new(name, tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesSink<W> {
    /// Create a sink over `writer`
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer,
            lines: 0,
        }
    }

    /// Lines written so far
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Consume the sink, returning the writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn io_error(&self, e: std::io::Error) -> ContractError {
        ContractError::sink_write(&self.name, e.to_string())
    }
}

impl<W: AsyncWrite + Unpin + Send> RecordSink for JsonLinesSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "json_lines_sink_write",
        skip(self, record),
        fields(sink = %self.name, sequence = record.sequence)
    )]
    async fn write(&mut self, record: &FusedRecord) -> Result<(), ContractError> {
        let mut line = serde_json::to_vec(&RecordLine::from(record))
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        line.push(b'\n');

        match self.writer.write_all(&line).await {
            Ok(()) => {
                self.lines += 1;
                Ok(())
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    #[instrument(name = "json_lines_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        match self.writer.flush().await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    #[instrument(name = "json_lines_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.flush().await?;
        debug!(sink = %self.name, lines = self.lines, "JsonLinesSink closed");
        Ok(())
    }
}
