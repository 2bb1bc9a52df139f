//! # Sync Engine
//!
//! Fuses the latest video frame with a telemetry sample on a fixed cadence.
//!
//! Responsibilities:
//! - Read the shared [`FrameSlot`](ingestion::FrameSlot) and
//!   [`TelemetryBuffer`](ingestion::TelemetryBuffer) once per tick
//! - Select a telemetry sample (`latest` or `nearest` policy)
//! - Compute the real lag between the two capture times
//! - Emit a `FusedRecord` without blocking
//!
//! ## Usage Example
//!
//! ```ignore
//! use sync_engine::Synchronizer;
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! let sync = Synchronizer::new(slot.clone(), buffer.clone(), tx, clock, interval)
//!     .with_policy(MatchPolicy::Nearest);
//! let handle = tokio::spawn(sync.run(state.subscribe()));
//! ```

mod matcher;
mod synchronizer;

// Re-exports
pub use matcher::{nearest, select};
pub use synchronizer::{
    SkipReason, SyncMetrics, SyncMetricsSnapshot, SyncReport, Synchronizer, TickOutcome,
};

// Re-export contracts types
pub use contracts::{FusedRecord, MatchPolicy};
