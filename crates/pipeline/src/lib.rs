//! # Pipeline
//!
//! Lifecycle control for the video/telemetry fusion pipeline.
//!
//! A [`PipelineController`] goes Idle → Running → Stopping → Stopped, exactly
//! once. Starting twice or stopping a controller that is not running is a
//! contract violation reported as [`LifecycleError`].
//!
//! ## Usage Example
//!
//! ```ignore
//! use pipeline::PipelineController;
//! use ingestion::{SimulatedCamera, SimulatedSensorBus};
//!
//! let mut controller = PipelineController::new(config)?;
//! let clock = controller.clock();
//! let sources = &controller.config().sources;
//! let camera = SimulatedCamera::from_settings(sources, clock.clone());
//! let bus = SimulatedSensorBus::from_settings(sources, clock);
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! controller.start(camera, bus, tx)?;
//! // ...
//! let stats = controller.stop().await?;
//! ```

mod controller;
mod error;
mod stats;

pub use controller::{Phase, PipelineController};
pub use error::LifecycleError;
pub use stats::PipelineStats;
