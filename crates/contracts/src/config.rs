//! FusionConfig - Config Loader output
//!
//! Rates, sync cadence, buffer bounds, simulated source parameters and output routing.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Timing and buffering
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Simulated hardware parameters
    #[serde(default)]
    pub sources: SourceSettings,

    /// Output routing
    #[serde(default = "default_sinks")]
    pub sinks: Vec<SinkConfig>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            version: ConfigVersion::default(),
            pipeline: PipelineSettings::default(),
            sources: SourceSettings::default(),
            sinks: default_sinks(),
        }
    }
}

/// Timing and buffering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Video ingestion rate (Hz), must be > 0
    #[serde(default = "default_video_rate_hz")]
    pub video_rate_hz: f64,

    /// Telemetry polling rate (Hz), must be > 0
    #[serde(default = "default_telemetry_rate_hz")]
    pub telemetry_rate_hz: f64,

    /// Synchronizer tick interval (ms), must be > 0
    #[serde(default = "default_sync_interval_ms")]
    pub sync_interval_ms: u64,

    /// Telemetry ring buffer capacity, must be > 0
    #[serde(default = "default_telemetry_buffer_capacity")]
    pub telemetry_buffer_capacity: usize,

    /// How the synchronizer picks a telemetry sample for a frame
    #[serde(default)]
    pub match_policy: MatchPolicy,

    /// Bounded queue between synchronizer and dispatcher, must be > 0
    #[serde(default = "default_record_queue_capacity")]
    pub record_queue_capacity: usize,
}

fn default_video_rate_hz() -> f64 {
    30.0
}

fn default_telemetry_rate_hz() -> f64 {
    10.0
}

fn default_sync_interval_ms() -> u64 {
    100
}

fn default_telemetry_buffer_capacity() -> usize {
    50
}

fn default_record_queue_capacity() -> usize {
    64
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            video_rate_hz: default_video_rate_hz(),
            telemetry_rate_hz: default_telemetry_rate_hz(),
            sync_interval_ms: default_sync_interval_ms(),
            telemetry_buffer_capacity: default_telemetry_buffer_capacity(),
            match_policy: MatchPolicy::default(),
            record_queue_capacity: default_record_queue_capacity(),
        }
    }
}

impl PipelineSettings {
    /// Video ingestion tick period
    ///
    /// Zero when `video_rate_hz` fails validation.
    pub fn video_period(&self) -> Duration {
        rate_period(self.video_rate_hz).unwrap_or_default()
    }

    /// Telemetry polling tick period
    ///
    /// Zero when `telemetry_rate_hz` fails validation.
    pub fn telemetry_period(&self) -> Duration {
        rate_period(self.telemetry_rate_hz).unwrap_or_default()
    }

    /// Synchronizer tick period
    pub fn sync_interval(&self) -> Duration {
        Duration::from_millis(self.sync_interval_ms)
    }

    /// Reject non-positive rates, intervals and capacities
    pub fn validate(&self) -> Result<(), ContractError> {
        check_rate("pipeline.video_rate_hz", self.video_rate_hz)?;
        check_rate("pipeline.telemetry_rate_hz", self.telemetry_rate_hz)?;

        if self.sync_interval_ms == 0 {
            return Err(ContractError::config_validation(
                "pipeline.sync_interval_ms",
                "sync_interval_ms must be > 0",
            ));
        }
        if self.telemetry_buffer_capacity == 0 {
            return Err(ContractError::config_validation(
                "pipeline.telemetry_buffer_capacity",
                "telemetry_buffer_capacity must be > 0",
            ));
        }
        if self.record_queue_capacity == 0 {
            return Err(ContractError::config_validation(
                "pipeline.record_queue_capacity",
                "record_queue_capacity must be > 0",
            ));
        }
        Ok(())
    }
}

/// Tick period for a rate
///
/// `None` for NaN, non-positive or infinite rates, for rates so high the
/// period rounds to zero, and for rates so low the period overflows a
/// `Duration` or the monotonic clock.
fn rate_period(rate_hz: f64) -> Option<Duration> {
    if !(rate_hz.is_finite() && rate_hz > 0.0) {
        return None;
    }
    let period = Duration::try_from_secs_f64(1.0 / rate_hz).ok()?;
    if period.is_zero() || Instant::now().checked_add(period).is_none() {
        return None;
    }
    Some(period)
}

fn check_rate(field: &str, rate_hz: f64) -> Result<(), ContractError> {
    match rate_period(rate_hz) {
        Some(_) => Ok(()),
        None => Err(ContractError::config_validation(
            field,
            format!("rate must be a positive frequency with a representable period, got {rate_hz}"),
        )),
    }
}

/// Telemetry match policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Pair with the most recently appended sample
    #[default]
    Latest,
    /// Pair with the sample whose capture time is closest to the frame's
    Nearest,
}

/// Simulated hardware parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Camera identifier stamped on every frame
    #[serde(default = "default_video_source_id")]
    pub video_source_id: String,

    /// Frame payload size in bytes
    #[serde(default = "default_frame_payload_bytes")]
    pub frame_payload_bytes: u64,

    /// Sensor bus identifier
    #[serde(default = "default_telemetry_source_id")]
    pub telemetry_source_id: String,

    /// RNG seed (None = seeded from OS entropy)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Probability in [0, 1] that an acquisition fails
    #[serde(default)]
    pub failure_rate: f64,
}

fn default_video_source_id() -> String {
    "SIYI_A2_MINI".to_string()
}

fn default_frame_payload_bytes() -> u64 {
    1024 * 500
}

fn default_telemetry_source_id() -> String {
    "i2c_sensor_bus".to_string()
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            video_source_id: default_video_source_id(),
            frame_payload_bytes: default_frame_payload_bytes(),
            telemetry_source_id: default_telemetry_source_id(),
            seed: None,
            failure_rate: 0.0,
        }
    }
}

impl SourceSettings {
    /// Reject empty identifiers and an out-of-range failure rate
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.video_source_id.is_empty() {
            return Err(ContractError::config_validation(
                "sources.video_source_id",
                "video_source_id cannot be empty",
            ));
        }
        if self.telemetry_source_id.is_empty() {
            return Err(ContractError::config_validation(
                "sources.telemetry_source_id",
                "telemetry_source_id cannot be empty",
            ));
        }
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(ContractError::config_validation(
                "sources.failure_rate",
                format!("failure_rate must be within [0, 1], got {}", self.failure_rate),
            ));
        }
        Ok(())
    }
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    100
}

fn default_sinks() -> Vec<SinkConfig> {
    vec![SinkConfig {
        name: "log".to_string(),
        sink_type: SinkType::Log,
        queue_capacity: default_queue_capacity(),
    }]
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Structured tracing event per record
    Log,
    /// JSON lines on stdout
    Stdout,
}

impl FusionConfig {
    /// Validate timing, buffering and source settings
    ///
    /// Returns the first error encountered. Sink routing is checked by the config loader.
    pub fn validate(&self) -> Result<(), ContractError> {
        self.pipeline.validate()?;
        self.sources.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FusionConfig::default();
        assert_eq!(config.pipeline.video_rate_hz, 30.0);
        assert_eq!(config.pipeline.telemetry_rate_hz, 10.0);
        assert_eq!(config.pipeline.sync_interval_ms, 100);
        assert_eq!(config.pipeline.telemetry_buffer_capacity, 50);
        assert_eq!(config.pipeline.match_policy, MatchPolicy::Latest);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serde_defaults_include_log_sink() {
        let config: FusionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.sinks.len(), 1);
        assert_eq!(config.sinks[0].sink_type, SinkType::Log);
    }

    #[test]
    fn test_periods() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.telemetry_period(), Duration::from_millis(100));
        assert_eq!(settings.sync_interval(), Duration::from_millis(100));
        let video = settings.video_period().as_secs_f64();
        assert!((video - 1.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_non_positive_rates() {
        for rate in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let settings = PipelineSettings {
                video_rate_hz: rate,
                ..Default::default()
            };
            let err = settings.validate().unwrap_err();
            assert!(err.to_string().contains("video_rate_hz"), "rate {rate}");
        }
    }

    #[test]
    fn test_rejects_rates_without_usable_period() {
        // 1e10 Hz rounds to a zero period; 1e-20 Hz overflows Duration.
        for rate in [1e10, 1e-20] {
            let settings = PipelineSettings {
                video_rate_hz: rate,
                ..Default::default()
            };
            assert!(settings.validate().is_err(), "rate {rate}");
            assert_eq!(settings.video_period(), Duration::ZERO);

            let settings = PipelineSettings {
                telemetry_rate_hz: rate,
                ..Default::default()
            };
            let err = settings.validate().unwrap_err();
            assert!(err.to_string().contains("telemetry_rate_hz"), "rate {rate}");
            assert_eq!(settings.telemetry_period(), Duration::ZERO);
        }
    }

    #[test]
    fn test_accepts_extreme_but_usable_rates() {
        let settings = PipelineSettings {
            video_rate_hz: 1e6,
            telemetry_rate_hz: 1.0 / 1024.0,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
        let video_ns = settings.video_period().as_nanos();
        assert!((999..=1000).contains(&video_ns), "{video_ns}");
        assert_eq!(settings.telemetry_period(), Duration::from_secs(1024));
    }

    #[test]
    fn test_rejects_zero_capacity_and_interval() {
        let settings = PipelineSettings {
            telemetry_buffer_capacity: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = PipelineSettings {
            sync_interval_ms: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_failure_rate_out_of_range() {
        let mut config = FusionConfig::default();
        config.sources.failure_rate = 1.5;
        assert!(config.validate().is_err());
    }
}
