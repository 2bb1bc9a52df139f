//! Configuration validation
//!
//! Rules:
//! - rates, sync interval and capacities > 0 (delegated to the config types)
//! - failure_rate within [0, 1]
//! - sink names non-empty and unique
//! - sink queue_capacity > 0

use std::collections::HashSet;

use contracts::{ContractError, FusionConfig, MatchPolicy};

/// Validate a FusionConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &FusionConfig) -> Result<(), ContractError> {
    config.validate()?;
    validate_sinks(config)?;
    Ok(())
}

/// Validate sink routing
fn validate_sinks(config: &FusionConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in config.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
    }
    Ok(())
}

/// Non-fatal observations about a valid configuration
pub fn collect_warnings(config: &FusionConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let pipeline = &config.pipeline;

    if config.sinks.is_empty() {
        warnings.push("no sinks configured - fused records will be dropped".to_string());
    }

    if pipeline.sync_interval() < pipeline.video_period() {
        warnings.push(format!(
            "sync interval ({} ms) is shorter than the video period ({:.1} ms); \
             consecutive records will repeat the same frame",
            pipeline.sync_interval_ms,
            pipeline.video_period().as_secs_f64() * 1000.0
        ));
    }

    if pipeline.match_policy == MatchPolicy::Latest
        && pipeline.telemetry_period() > pipeline.sync_interval()
    {
        warnings.push(format!(
            "telemetry period ({:.1} ms) exceeds the sync interval ({} ms); \
             the latest sample may be older than one sync tick",
            pipeline.telemetry_period().as_secs_f64() * 1000.0,
            pipeline.sync_interval_ms
        ));
    }

    let samples = u32::try_from(pipeline.telemetry_buffer_capacity).unwrap_or(u32::MAX);
    let history = pipeline.telemetry_period().saturating_mul(samples);
    if pipeline.match_policy == MatchPolicy::Nearest && history < pipeline.sync_interval() {
        warnings.push(format!(
            "telemetry buffer covers only {:.1} ms of history, less than one sync interval",
            history.as_secs_f64() * 1000.0
        ));
    }

    if config.sources.failure_rate > 0.0 {
        warnings.push(format!(
            "simulated sources inject failures at rate {}",
            config.sources.failure_rate
        ));
    }

    warnings
}
