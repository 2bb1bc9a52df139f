//! FusedRecord - Synchronizer output
//!
//! A video frame paired with the telemetry sample selected for it.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CaptureTimestamp, FrameDescriptor, TelemetrySample};

/// Spatially-tagged frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedRecord {
    /// Record sequence number (monotonically increasing per synchronizer, starting at 1)
    pub sequence: u64,

    /// Frame snapshot taken from the frame slot
    pub frame: Arc<FrameDescriptor>,

    /// Matched telemetry sample
    pub telemetry: TelemetrySample,

    /// |frame capture time - telemetry capture time|
    pub lag: Duration,

    /// When the record was generated
    pub generated_at: CaptureTimestamp,
}

impl FusedRecord {
    /// Pair a frame with a telemetry sample, computing the lag between them
    pub fn pair(
        sequence: u64,
        frame: Arc<FrameDescriptor>,
        telemetry: TelemetrySample,
        generated_at: CaptureTimestamp,
    ) -> Self {
        let lag = frame.captured_at.lag_to(&telemetry.captured_at);
        Self {
            sequence,
            frame,
            telemetry,
            lag,
            generated_at,
        }
    }

    /// Lag in milliseconds (for logging/metrics)
    pub fn lag_ms(&self) -> f64 {
        self.lag.as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attitude, GnssFix, ManualClock};

    #[test]
    fn test_pair_computes_lag() {
        let clock = ManualClock::new();
        let frame = Arc::new(FrameDescriptor::new(
            "cam",
            clock.at(Duration::from_millis(230)),
            7,
            1024,
        ));
        let telemetry = TelemetrySample::new(
            GnssFix {
                latitude: 42.5,
                longitude: -71.2,
            },
            Attitude {
                pitch: 0.0,
                roll: 0.0,
            },
            50.0,
            clock.at(Duration::from_millis(200)),
        )
        .unwrap();

        let record = FusedRecord::pair(1, frame, telemetry, clock.at(Duration::from_millis(300)));
        assert_eq!(record.lag, Duration::from_millis(30));
        assert!((record.lag_ms() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_serializes() {
        let clock = ManualClock::new();
        let frame = Arc::new(FrameDescriptor::new("cam", clock.at(Duration::ZERO), 1, 1));
        let telemetry = TelemetrySample::new(
            GnssFix {
                latitude: 0.0,
                longitude: 0.0,
            },
            Attitude {
                pitch: 0.0,
                roll: 0.0,
            },
            1.0,
            clock.at(Duration::ZERO),
        )
        .unwrap();
        let record = FusedRecord::pair(1, frame, telemetry, clock.at(Duration::ZERO));

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"source_id\":\"cam\""));
    }
}
