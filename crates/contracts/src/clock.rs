//! TimestampSource - pipeline clock abstraction
//!
//! All producers tag their records through this trait so that lag between
//! streams is computed against a single monotonic origin.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Capture time of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureTimestamp {
    /// Offset from the clock origin (monotonic, never goes backwards)
    pub monotonic: Duration,

    /// Wall-clock time of capture
    pub wall: DateTime<Utc>,
}

impl CaptureTimestamp {
    /// Absolute distance between two capture times on the monotonic axis
    pub fn lag_to(&self, other: &CaptureTimestamp) -> Duration {
        if self.monotonic >= other.monotonic {
            self.monotonic - other.monotonic
        } else {
            other.monotonic - self.monotonic
        }
    }
}

/// Clock capability shared by producers and the synchronizer
pub trait TimestampSource: Send + Sync {
    /// Current capture timestamp
    fn now(&self) -> CaptureTimestamp;
}

/// Shared clock handle
pub type SharedClock = Arc<dyn TimestampSource>;

/// Clock backed by [`Instant`] for the monotonic axis and [`Utc::now`] for the wall axis
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose monotonic origin is "now"
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Create a shared handle
    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampSource for MonotonicClock {
    fn now(&self) -> CaptureTimestamp {
        CaptureTimestamp {
            monotonic: self.origin.elapsed(),
            wall: Utc::now(),
        }
    }
}

/// Manually advanced clock for deterministic tests and replays
#[derive(Debug)]
pub struct ManualClock {
    offset_nanos: AtomicU64,
    wall_origin: DateTime<Utc>,
}

impl ManualClock {
    /// Create a clock at offset zero
    pub fn new() -> Self {
        Self {
            offset_nanos: AtomicU64::new(0),
            wall_origin: DateTime::<Utc>::default(),
        }
    }

    /// Advance the clock
    pub fn advance(&self, by: Duration) {
        self.offset_nanos
            .fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Jump to an absolute offset
    pub fn set(&self, offset: Duration) {
        self.offset_nanos
            .store(offset.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Timestamp at an arbitrary offset on this clock's axis
    pub fn at(&self, offset: Duration) -> CaptureTimestamp {
        let wall = chrono::Duration::from_std(offset)
            .ok()
            .and_then(|delta| self.wall_origin.checked_add_signed(delta))
            .unwrap_or(self.wall_origin);
        CaptureTimestamp {
            monotonic: offset,
            wall,
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampSource for ManualClock {
    fn now(&self) -> CaptureTimestamp {
        self.at(Duration::from_nanos(
            self.offset_nanos.load(Ordering::SeqCst),
        ))
    }
}
