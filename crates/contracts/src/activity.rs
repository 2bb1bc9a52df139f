//! ActivityReport - summary returned by each periodic activity when it exits

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three periodic activities of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    VideoIngestion,
    TelemetryIngestion,
    Synchronization,
}

impl ActivityKind {
    /// Stable name used in logs and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VideoIngestion => "video_ingestion",
            Self::TelemetryIngestion => "telemetry_ingestion",
            Self::Synchronization => "synchronization",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-activity tick accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityReport {
    /// Which activity
    pub kind: ActivityKind,

    /// Tick bodies executed
    pub ticks: u64,

    /// Ticks that produced output (a stored record or an emitted fused record)
    pub succeeded: u64,

    /// Ticks that failed (acquisition failure, dropped record)
    pub failed: u64,

    /// Ticks skipped without error (empty state)
    pub skipped: u64,
}

impl ActivityReport {
    /// Empty report for an activity
    pub fn new(kind: ActivityKind) -> Self {
        Self {
            kind,
            ticks: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
        }
    }
}
