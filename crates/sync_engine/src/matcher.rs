//! Telemetry match policies
//!
//! Select the telemetry sample paired with a frame. Both policies take the
//! buffer lock once (one copy) and do the selection outside it.

use contracts::{FrameDescriptor, MatchPolicy, TelemetrySample};
use ingestion::TelemetryBuffer;

/// Pick a sample for `frame` according to `policy`
///
/// Returns `None` only when the buffer is empty.
pub fn select(
    policy: MatchPolicy,
    frame: &FrameDescriptor,
    buffer: &TelemetryBuffer,
) -> Option<TelemetrySample> {
    match policy {
        MatchPolicy::Latest => buffer.latest(),
        MatchPolicy::Nearest => nearest(frame, &buffer.snapshot()),
    }
}

/// Sample whose capture time is closest to the frame's
///
/// `samples` is in append order; on equal distance the later (newer) sample wins.
pub fn nearest(frame: &FrameDescriptor, samples: &[TelemetrySample]) -> Option<TelemetrySample> {
    let mut best: Option<(std::time::Duration, TelemetrySample)> = None;

    for sample in samples {
        let distance = frame.captured_at.lag_to(&sample.captured_at);
        match best {
            Some((best_distance, _)) if distance > best_distance => {}
            _ => best = Some((distance, *sample)),
        }
    }

    best.map(|(_, sample)| sample)
}
