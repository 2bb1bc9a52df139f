//! PipelineState - shared run flag
//!
//! Running at construction, flips to stopped exactly once, never flips back.
//! Activities hold a [`StopSignal`] rather than the state itself, so dropping
//! the owning controller also reads as "stopped" to every activity.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Shared running flag owned by one pipeline instance
#[derive(Debug, Clone)]
pub struct PipelineState {
    /// `true` while running
    running: Arc<watch::Sender<bool>>,
}

impl PipelineState {
    /// Create a state in the running position
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(true);
        Self {
            running: Arc::new(tx),
        }
    }

    /// Whether stop has not been requested yet
    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    /// Request stop
    ///
    /// Returns `true` for the call that performed the transition, `false` if
    /// the state was already stopped.
    pub fn request_stop(&self) -> bool {
        self.running.send_if_modified(|running| {
            if *running {
                *running = false;
                true
            } else {
                false
            }
        })
    }

    /// Observer handle for an activity
    pub fn subscribe(&self) -> StopSignal {
        StopSignal {
            rx: self.running.subscribe(),
        }
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of a [`PipelineState`] held by each activity
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Whether stop was requested (or the owning state was dropped)
    pub fn is_stopped(&self) -> bool {
        !*self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolve once stop is requested
    ///
    /// Cancel-safe; resolves immediately if already stopped.
    pub async fn stopped(&mut self) {
        // Err means the sender is gone, which counts as stopped.
        let _ = self.rx.wait_for(|running| !*running).await;
    }
}

/// Fixed-period ticker for a periodic activity
///
/// The first tick fires one full period after creation. Missed ticks are
/// skipped rather than replayed, so a slow tick body never causes a burst.
pub fn tick_interval(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}
