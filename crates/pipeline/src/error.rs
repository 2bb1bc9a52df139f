//! Lifecycle error types

use thiserror::Error;

use crate::Phase;

/// Lifecycle contract violations
///
/// These are programming errors: the controller reports them instead of
/// changing state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// `start` called on a controller that already left Idle
    #[error("pipeline already started (phase: {phase})")]
    AlreadyStarted { phase: Phase },

    /// `stop` called on a controller that is not running
    #[error("pipeline is not running (phase: {phase})")]
    NotRunning { phase: Phase },

    /// An activity task panicked or was cancelled
    #[error("activity '{activity}' did not exit cleanly: {message}")]
    TaskFailed { activity: String, message: String },
}
