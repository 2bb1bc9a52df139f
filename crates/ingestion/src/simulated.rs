//! Simulated hardware
//!
//! Stand-ins for the gimbal camera (RTSP) and the I2C sensor bus. Values are
//! drawn from a seedable RNG so a run can be replayed exactly.

use std::ops::RangeInclusive;

use contracts::{
    Attitude, ContractError, FrameDescriptor, FrameSource, GnssFix, SharedClock, SourceSettings,
    TelemetrySample, TelemetrySource,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Frame numbers reported by the simulated camera
pub const FRAME_SEQUENCE_RANGE: RangeInclusive<u64> = 1000..=9999;

/// Reference position of the simulated platform (degrees)
pub const BASE_LATITUDE: f64 = 42.5;
pub const BASE_LONGITUDE: f64 = -71.2;

/// Maximum latitude jitter around the reference position (degrees)
const GNSS_JITTER_DEG: f64 = 0.001;

/// Attitude envelope (degrees)
const PITCH_LIMIT_DEG: f64 = 5.0;
const ROLL_LIMIT_DEG: f64 = 2.0;

/// Ranging envelope (meters)
const RANGE_MIN_M: f64 = 20.0;
const RANGE_MAX_M: f64 = 100.0;

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Simulated gimbal camera
pub struct SimulatedCamera {
    source_id: String,
    clock: SharedClock,
    payload_bytes: u64,
    failure_rate: f64,
    rng: StdRng,
}

impl SimulatedCamera {
    /// Build from source settings
    pub fn from_settings(settings: &SourceSettings, clock: SharedClock) -> Self {
        Self {
            source_id: settings.video_source_id.clone(),
            clock,
            payload_bytes: settings.frame_payload_bytes,
            failure_rate: settings.failure_rate,
            rng: make_rng(settings.seed),
        }
    }
}

impl FrameSource for SimulatedCamera {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn acquire(&mut self) -> Result<FrameDescriptor, ContractError> {
        if self.failure_rate > 0.0 && self.rng.random_bool(self.failure_rate) {
            return Err(ContractError::acquisition(
                &self.source_id,
                "simulated stream dropout",
            ));
        }

        let sequence = self.rng.random_range(FRAME_SEQUENCE_RANGE);
        Ok(FrameDescriptor::new(
            self.source_id.clone(),
            self.clock.now(),
            sequence,
            self.payload_bytes,
        ))
    }
}

/// Simulated I2C sensor bus (GNSS, IMU, LiDAR)
pub struct SimulatedSensorBus {
    source_id: String,
    clock: SharedClock,
    failure_rate: f64,
    rng: StdRng,
}

impl SimulatedSensorBus {
    /// Build from source settings
    ///
    /// The bus RNG is derived from the camera seed so both streams stay independent.
    pub fn from_settings(settings: &SourceSettings, clock: SharedClock) -> Self {
        Self {
            source_id: settings.telemetry_source_id.clone(),
            clock,
            failure_rate: settings.failure_rate,
            rng: make_rng(settings.seed.map(|seed| seed.wrapping_add(1))),
        }
    }
}

impl TelemetrySource for SimulatedSensorBus {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn acquire(&mut self) -> Result<TelemetrySample, ContractError> {
        if self.failure_rate > 0.0 && self.rng.random_bool(self.failure_rate) {
            return Err(ContractError::acquisition(&self.source_id, "simulated bus nack"));
        }

        let gnss = GnssFix {
            latitude: BASE_LATITUDE + self.rng.random_range(-GNSS_JITTER_DEG..=GNSS_JITTER_DEG),
            longitude: BASE_LONGITUDE,
        };
        let attitude = Attitude {
            pitch: self.rng.random_range(-PITCH_LIMIT_DEG..=PITCH_LIMIT_DEG),
            roll: self.rng.random_range(-ROLL_LIMIT_DEG..=ROLL_LIMIT_DEG),
        };
        let range_m = self.rng.random_range(RANGE_MIN_M..=RANGE_MAX_M);

        TelemetrySample::new(gnss, attitude, range_m, self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ManualClock;
    use std::sync::Arc;

    fn settings(seed: u64, failure_rate: f64) -> SourceSettings {
        SourceSettings {
            seed: Some(seed),
            failure_rate,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_camera_values_within_envelope() {
        let mut camera = SimulatedCamera::from_settings(&settings(7, 0.0), Arc::new(ManualClock::new()));
        for _ in 0..200 {
            let frame = camera.acquire().await.unwrap();
            assert!(FRAME_SEQUENCE_RANGE.contains(&frame.sequence));
            assert_eq!(frame.source_id, "SIYI_A2_MINI");
            assert_eq!(frame.payload_bytes, 512_000);
        }
    }

    #[tokio::test]
    async fn test_bus_values_within_envelope() {
        let mut bus = SimulatedSensorBus::from_settings(&settings(7, 0.0), Arc::new(ManualClock::new()));
        for _ in 0..200 {
            let sample = bus.acquire().await.unwrap();
            assert!((sample.gnss.latitude - BASE_LATITUDE).abs() <= GNSS_JITTER_DEG + 1e-12);
            assert_eq!(sample.gnss.longitude, BASE_LONGITUDE);
            assert!(sample.attitude.pitch.abs() <= PITCH_LIMIT_DEG);
            assert!(sample.attitude.roll.abs() <= ROLL_LIMIT_DEG);
            assert!((RANGE_MIN_M..=RANGE_MAX_M).contains(&sample.range_m));
        }
    }

    #[tokio::test]
    async fn test_same_seed_replays_identically() {
        let clock: SharedClock = Arc::new(ManualClock::new());
        let mut a = SimulatedSensorBus::from_settings(&settings(42, 0.0), clock.clone());
        let mut b = SimulatedSensorBus::from_settings(&settings(42, 0.0), clock);
        for _ in 0..10 {
            assert_eq!(a.acquire().await.unwrap(), b.acquire().await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_failure_rate_one_always_fails() {
        let clock: SharedClock = Arc::new(ManualClock::new());
        let mut camera = SimulatedCamera::from_settings(&settings(1, 1.0), clock.clone());
        let mut bus = SimulatedSensorBus::from_settings(&settings(1, 1.0), clock);
        for _ in 0..5 {
            assert!(camera.acquire().await.is_err());
            assert!(bus.acquire().await.is_err());
        }
    }
}
