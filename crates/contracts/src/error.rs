//! Layered error definitions
//!
//! Categorized by source: config / acquisition / sample / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Acquisition Errors =====
    /// A producer could not obtain a record this tick
    #[error("acquisition failed for source '{source_id}': {message}")]
    Acquisition { source_id: String, message: String },

    /// A telemetry value fell outside its physical bounds
    #[error("invalid telemetry sample field '{field}': {message}")]
    InvalidSample { field: String, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create acquisition error
    pub fn acquisition(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Acquisition {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// Create invalid sample error
    pub fn invalid_sample(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSample {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Whether the error is a per-tick failure a periodic activity recovers from
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Acquisition { .. } | Self::InvalidSample { .. } | Self::SinkWrite { .. }
        )
    }
}
