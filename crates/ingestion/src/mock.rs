//! Mock sources
//!
//! Deterministic sources for tests and offline runs. Counting sources produce
//! predictable values from a shared clock; scripted sources replay a fixed list
//! of outcomes and fail once the script is exhausted.

use std::collections::VecDeque;

use contracts::{
    Attitude, ContractError, FrameDescriptor, FrameSource, GnssFix, SharedClock, TelemetrySample,
    TelemetrySource,
};

/// Camera emitting sequence numbers 1, 2, 3, ...
pub struct CountingCamera {
    source_id: String,
    clock: SharedClock,
    payload_bytes: u64,
    next_sequence: u64,
}

impl CountingCamera {
    /// Create a counting camera stamped by `clock`
    pub fn new(source_id: impl Into<String>, clock: SharedClock, payload_bytes: u64) -> Self {
        Self {
            source_id: source_id.into(),
            clock,
            payload_bytes,
            next_sequence: 1,
        }
    }
}

impl FrameSource for CountingCamera {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn acquire(&mut self) -> Result<FrameDescriptor, ContractError> {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        Ok(FrameDescriptor::new(
            self.source_id.clone(),
            self.clock.now(),
            sequence,
            self.payload_bytes,
        ))
    }
}

/// Sensor bus whose range reads 11, 12, 13, ... meters
pub struct CountingSensorBus {
    source_id: String,
    clock: SharedClock,
    polls: u64,
}

impl CountingSensorBus {
    /// Create a counting bus stamped by `clock`
    pub fn new(source_id: impl Into<String>, clock: SharedClock) -> Self {
        Self {
            source_id: source_id.into(),
            clock,
            polls: 0,
        }
    }
}

impl TelemetrySource for CountingSensorBus {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn acquire(&mut self) -> Result<TelemetrySample, ContractError> {
        self.polls += 1;
        TelemetrySample::new(
            GnssFix {
                latitude: 42.5,
                longitude: -71.2,
            },
            Attitude {
                pitch: 0.0,
                roll: 0.0,
            },
            10.0 + self.polls as f64,
            self.clock.now(),
        )
    }
}

/// Frame source replaying a fixed script
pub struct ScriptedFrameSource {
    source_id: String,
    script: VecDeque<Result<FrameDescriptor, ContractError>>,
}

impl ScriptedFrameSource {
    pub fn new(
        source_id: impl Into<String>,
        script: Vec<Result<FrameDescriptor, ContractError>>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            script: script.into(),
        }
    }
}

impl FrameSource for ScriptedFrameSource {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn acquire(&mut self) -> Result<FrameDescriptor, ContractError> {
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(ContractError::acquisition(&self.source_id, "script exhausted")))
    }
}

/// Telemetry source replaying a fixed script
pub struct ScriptedTelemetrySource {
    source_id: String,
    script: VecDeque<Result<TelemetrySample, ContractError>>,
}

impl ScriptedTelemetrySource {
    pub fn new(
        source_id: impl Into<String>,
        script: Vec<Result<TelemetrySample, ContractError>>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            script: script.into(),
        }
    }
}

impl TelemetrySource for ScriptedTelemetrySource {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn acquire(&mut self) -> Result<TelemetrySample, ContractError> {
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(ContractError::acquisition(&self.source_id, "script exhausted")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ManualClock;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_counting_camera_sequences_from_one() {
        let clock = Arc::new(ManualClock::new());
        let mut camera = CountingCamera::new("cam", clock.clone(), 64);

        let first = camera.acquire().await.unwrap();
        clock.advance(Duration::from_millis(33));
        let second = camera.acquire().await.unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(second.captured_at.monotonic, Duration::from_millis(33));
        assert_eq!(second.payload_bytes, 64);
    }

    #[tokio::test]
    async fn test_scripted_source_fails_after_script() {
        let mut source = ScriptedFrameSource::new("cam", vec![]);
        let err = source.acquire().await.unwrap_err();
        assert!(err.to_string().contains("script exhausted"));
        let again = source.acquire().await.unwrap_err();
        assert!(again.to_string().contains("script exhausted"));
    }
}
