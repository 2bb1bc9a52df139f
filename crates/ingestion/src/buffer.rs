//! Fixed-capacity telemetry ring buffer.
//!
//! Insertion order is time order: the buffer never sorts or reorders. When
//! full, appending evicts the oldest sample first (FIFO). All operations take
//! the lock for a single push/pop/copy; callers never hold it across an await.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use contracts::{ContractError, TelemetrySample};
use parking_lot::Mutex;
use ringbuf::{traits::*, HeapRb};
use tracing::warn;

struct RingState {
    ring: HeapRb<TelemetrySample>,
    evicted_count: u64,
    out_of_order_count: u64,
    last_timestamp: Option<Duration>,
}

/// Shared telemetry buffer
///
/// Cloning yields another handle to the same buffer.
#[derive(Clone)]
pub struct TelemetryBuffer {
    state: Arc<Mutex<RingState>>,
    capacity: usize,
}

impl fmt::Debug for TelemetryBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TelemetryBuffer")
            .field("len", &state.ring.occupied_len())
            .field("capacity", &self.capacity)
            .field("evicted", &state.evicted_count)
            .finish()
    }
}

impl TelemetryBuffer {
    /// Create an empty buffer
    ///
    /// # Errors
    /// Returns a validation error if `capacity` is zero
    pub fn new(capacity: usize) -> Result<Self, ContractError> {
        if capacity == 0 {
            return Err(ContractError::config_validation(
                "telemetry_buffer_capacity",
                "capacity must be > 0",
            ));
        }

        Ok(Self {
            state: Arc::new(Mutex::new(RingState {
                ring: HeapRb::new(capacity),
                evicted_count: 0,
                out_of_order_count: 0,
                last_timestamp: None,
            })),
            capacity,
        })
    }

    /// Append a sample at the tail
    ///
    /// If the buffer is full, the oldest sample is evicted and returned.
    pub fn append(&self, sample: TelemetrySample) -> Option<TelemetrySample> {
        let timestamp = sample.captured_at.monotonic;

        let (evicted, previous) = {
            let mut state = self.state.lock();

            let previous = state.last_timestamp.filter(|last| timestamp < *last);
            if previous.is_some() {
                state.out_of_order_count += 1;
            }
            state.last_timestamp = Some(timestamp);

            let evicted = if state.ring.is_full() {
                state.evicted_count += 1;
                state.ring.try_pop()
            } else {
                None
            };
            let _ = state.ring.try_push(sample);

            (evicted, previous)
        };

        if let Some(previous) = previous {
            warn!(
                timestamp_ms = timestamp.as_secs_f64() * 1000.0,
                previous_ms = previous.as_secs_f64() * 1000.0,
                "telemetry sample older than buffer tail; kept in arrival order"
            );
        }

        evicted
    }

    /// Most recently appended sample
    #[inline]
    pub fn latest(&self) -> Option<TelemetrySample> {
        self.state.lock().ring.iter().last().copied()
    }

    /// Copy of the full buffer, oldest first
    pub fn snapshot(&self) -> Vec<TelemetrySample> {
        self.state.lock().ring.iter().copied().collect()
    }

    /// Number of buffered samples
    #[inline]
    pub fn len(&self) -> usize {
        self.state.lock().ring.occupied_len()
    }

    /// Whether the buffer holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.state.lock().ring.is_empty()
    }

    /// Configured capacity
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples evicted to stay within capacity
    #[inline]
    pub fn evicted_count(&self) -> u64 {
        self.state.lock().evicted_count
    }

    /// Samples whose timestamp preceded the tail at append time
    #[inline]
    pub fn out_of_order_count(&self) -> u64 {
        self.state.lock().out_of_order_count
    }
}
