//! TelemetrySample - TelemetryIngestor output
//!
//! One poll of the platform sensor bus: GNSS fix, attitude and ranging distance.

use serde::{Deserialize, Serialize};

use crate::{CaptureTimestamp, ContractError};

/// GNSS fix (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GnssFix {
    /// Latitude, [-90, 90]
    pub latitude: f64,

    /// Longitude, [-180, 180]
    pub longitude: f64,
}

/// Platform attitude from the IMU (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    /// Pitch, [-90, 90]
    pub pitch: f64,

    /// Roll, [-180, 180]
    pub roll: f64,
}

/// Telemetry sample
///
/// Deserialization goes through [`TelemetrySample::new`], so decoded samples
/// are bounds-checked. Fields stay public for reading; code that builds a
/// sample with a struct literal skips the checks and owns that choice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTelemetrySample")]
pub struct TelemetrySample {
    /// GNSS fix
    pub gnss: GnssFix,

    /// IMU attitude
    pub attitude: Attitude,

    /// Ranging (LiDAR) distance in meters, > 0
    pub range_m: f64,

    /// Capture time
    pub captured_at: CaptureTimestamp,
}

impl TelemetrySample {
    /// Create a sample, rejecting values outside their physical bounds
    pub fn new(
        gnss: GnssFix,
        attitude: Attitude,
        range_m: f64,
        captured_at: CaptureTimestamp,
    ) -> Result<Self, ContractError> {
        check_range("gnss.latitude", gnss.latitude, -90.0, 90.0)?;
        check_range("gnss.longitude", gnss.longitude, -180.0, 180.0)?;
        check_range("attitude.pitch", attitude.pitch, -90.0, 90.0)?;
        check_range("attitude.roll", attitude.roll, -180.0, 180.0)?;
        if !range_m.is_finite() || range_m <= 0.0 {
            return Err(ContractError::invalid_sample(
                "range_m",
                format!("range must be a positive distance, got {range_m}"),
            ));
        }

        Ok(Self {
            gnss,
            attitude,
            range_m,
            captured_at,
        })
    }
}

/// Wire shape of [`TelemetrySample`] before validation
#[derive(Deserialize)]
struct RawTelemetrySample {
    gnss: GnssFix,
    attitude: Attitude,
    range_m: f64,
    captured_at: CaptureTimestamp,
}

impl TryFrom<RawTelemetrySample> for TelemetrySample {
    type Error = ContractError;

    fn try_from(raw: RawTelemetrySample) -> Result<Self, Self::Error> {
        Self::new(raw.gnss, raw.attitude, raw.range_m, raw.captured_at)
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ContractError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ContractError::invalid_sample(
            field,
            format!("{value} outside [{min}, {max}]"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManualClock, TimestampSource};

    fn fix() -> GnssFix {
        GnssFix {
            latitude: 42.5,
            longitude: -71.2,
        }
    }

    fn level() -> Attitude {
        Attitude {
            pitch: 1.5,
            roll: -0.5,
        }
    }

    #[test]
    fn test_valid_sample() {
        let clock = ManualClock::new();
        let sample = TelemetrySample::new(fix(), level(), 42.0, clock.now()).unwrap();
        assert_eq!(sample.range_m, 42.0);
    }

    #[test]
    fn test_rejects_out_of_bounds_latitude() {
        let clock = ManualClock::new();
        let gnss = GnssFix {
            latitude: 91.0,
            longitude: 0.0,
        };
        let err = TelemetrySample::new(gnss, level(), 10.0, clock.now()).unwrap_err();
        assert!(err.to_string().contains("gnss.latitude"));
    }

    #[test]
    fn test_rejects_non_positive_range() {
        let clock = ManualClock::new();
        assert!(TelemetrySample::new(fix(), level(), 0.0, clock.now()).is_err());
        assert!(TelemetrySample::new(fix(), level(), f64::NAN, clock.now()).is_err());
    }

    #[test]
    fn test_rejects_nan_attitude() {
        let clock = ManualClock::new();
        let attitude = Attitude {
            pitch: f64::NAN,
            roll: 0.0,
        };
        let err = TelemetrySample::new(fix(), attitude, 10.0, clock.now()).unwrap_err();
        assert!(matches!(err, ContractError::InvalidSample { .. }));
    }

    #[test]
    fn test_deserialize_checks_bounds() {
        let clock = ManualClock::new();
        let sample = TelemetrySample::new(fix(), level(), 42.0, clock.now()).unwrap();
        let json = serde_json::to_value(sample).unwrap();

        let decoded: TelemetrySample = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(decoded, sample);

        let mut bad = json.clone();
        bad["gnss"]["latitude"] = serde_json::json!(91.0);
        let err = serde_json::from_value::<TelemetrySample>(bad).unwrap_err();
        assert!(err.to_string().contains("gnss.latitude"));

        let mut bad = json;
        bad["range_m"] = serde_json::json!(-1.0);
        assert!(serde_json::from_value::<TelemetrySample>(bad).is_err());
    }
}
