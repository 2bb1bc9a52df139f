//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the fusion pipeline.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Every record carries a [`CaptureTimestamp`]: a monotonic offset from the
//!   pipeline clock origin plus the UTC wall-clock time of capture
//! - Lag between two records is always computed on the monotonic component
//! - Source-assigned sequence numbers are diagnostic only and may wrap

mod activity;
mod clock;
mod config;
mod error;
mod frame;
mod fused;
mod sink;
mod source;
mod state;
mod telemetry;

pub use activity::{ActivityKind, ActivityReport};
pub use clock::{CaptureTimestamp, ManualClock, MonotonicClock, SharedClock, TimestampSource};
pub use config::*;
pub use error::*;
pub use frame::FrameDescriptor;
pub use fused::FusedRecord;
pub use sink::*;
pub use source::*;
pub use state::{tick_interval, PipelineState, StopSignal};
pub use telemetry::{Attitude, GnssFix, TelemetrySample};
