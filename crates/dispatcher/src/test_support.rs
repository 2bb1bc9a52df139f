//! Record fixtures shared by unit tests

use std::sync::Arc;
use std::time::Duration;

use contracts::{Attitude, FrameDescriptor, FusedRecord, GnssFix, ManualClock, TelemetrySample};

/// Record `sequence` with frame id `1000 + sequence`, 42 m range and 12 ms lag
pub fn record(sequence: u64) -> FusedRecord {
    let clock = ManualClock::new();
    let frame = Arc::new(FrameDescriptor::new(
        "SIYI_A2_MINI",
        clock.at(Duration::from_millis(112)),
        1000 + sequence,
        512_000,
    ));
    let telemetry = TelemetrySample::new(
        GnssFix {
            latitude: 42.5,
            longitude: -71.2,
        },
        Attitude {
            pitch: 1.5,
            roll: -0.5,
        },
        42.0,
        clock.at(Duration::from_millis(100)),
    )
    .expect("fixture sample is within bounds");
    FusedRecord::pair(sequence, frame, telemetry, clock.at(Duration::from_millis(120)))
}
