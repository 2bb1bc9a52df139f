//! Producer capabilities - hardware-facing source abstraction
//!
//! The pipeline never talks to an RTSP stream or an I2C bus directly. Each
//! ingestor pulls one record per tick through one of these traits, so real
//! drivers, simulated hardware and scripted test doubles are interchangeable.
//!
//! # Example
//!
//! ```ignore
//! struct StaticCamera { clock: SharedClock, next: u64 }
//!
//! impl FrameSource for StaticCamera {
//!     fn source_id(&self) -> &str { "static" }
//!
//!     async fn acquire(&mut self) -> Result<FrameDescriptor, ContractError> {
//!         self.next += 1;
//!         Ok(FrameDescriptor::new("static", self.clock.now(), self.next, 0))
//!     }
//! }
//! ```

use crate::{ContractError, FrameDescriptor, TelemetrySample};

/// Video frame source
#[trait_variant::make(FrameSource: Send)]
pub trait LocalFrameSource {
    /// Source identifier (used for logging/metrics)
    fn source_id(&self) -> &str;

    /// Acquire the next frame descriptor
    ///
    /// # Errors
    /// Returns an acquisition error; the caller logs it and retries on its next tick
    async fn acquire(&mut self) -> Result<FrameDescriptor, ContractError>;
}

/// Telemetry sample source
#[trait_variant::make(TelemetrySource: Send)]
pub trait LocalTelemetrySource {
    /// Source identifier (used for logging/metrics)
    fn source_id(&self) -> &str;

    /// Acquire the next telemetry sample
    ///
    /// # Errors
    /// Returns an acquisition error; the caller logs it and retries on its next tick
    async fn acquire(&mut self) -> Result<TelemetrySample, ContractError>;
}
