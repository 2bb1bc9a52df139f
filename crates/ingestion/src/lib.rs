//! # Ingestion
//!
//! Producer side of the fusion pipeline.
//!
//! Responsibilities:
//! - Own the two shared stores: the single-frame [`FrameSlot`] and the bounded
//!   [`TelemetryBuffer`]
//! - Drive a [`FrameSource`](contracts::FrameSource) and a
//!   [`TelemetrySource`](contracts::TelemetrySource) at fixed rates
//! - Log and count acquisition failures without ever stopping the activity
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::{MonotonicClock, PipelineState, SourceSettings};
//! use ingestion::{FrameSlot, SimulatedCamera, VideoIngestor};
//!
//! let clock = MonotonicClock::shared();
//! let slot = FrameSlot::new();
//! let camera = SimulatedCamera::from_settings(&SourceSettings::default(), clock);
//!
//! let state = PipelineState::new();
//! let ingestor = VideoIngestor::new(camera, slot.clone(), Duration::from_millis(33));
//! let handle = tokio::spawn(ingestor.run(state.subscribe()));
//!
//! // ... later
//! state.request_stop();
//! let report = handle.await?;
//! ```

mod buffer;
mod frame_slot;
mod mock;
mod simulated;
mod stats;
mod telemetry;
mod video;

// Re-exports
pub use buffer::TelemetryBuffer;
pub use frame_slot::FrameSlot;
pub use mock::{CountingCamera, CountingSensorBus, ScriptedFrameSource, ScriptedTelemetrySource};
pub use simulated::{
    SimulatedCamera, SimulatedSensorBus, BASE_LATITUDE, BASE_LONGITUDE, FRAME_SEQUENCE_RANGE,
};
pub use stats::{IngestionMetrics, MetricsSnapshot};
pub use telemetry::TelemetryIngestor;
pub use video::VideoIngestor;
