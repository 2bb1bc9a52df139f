//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Queue full - record dropped
    #[error("queue full for sink '{sink_name}', record {sequence} dropped")]
    QueueFull { sink_name: String, sequence: u64 },

    /// Worker gone - record dropped
    #[error("worker for sink '{sink_name}' has stopped")]
    WorkerClosed { sink_name: String },

    /// Sink write error (from contract)
    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Whether the record was lost to backpressure rather than a fault
    pub fn is_backpressure(&self) -> bool {
        matches!(self, Self::QueueFull { .. })
    }
}
