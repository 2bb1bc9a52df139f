//! # Dispatcher
//!
//! Record distribution.
//!
//! Responsibilities:
//! - Consume `FusedRecord`s from the synchronizer's output queue
//! - Fan out to every configured sink
//! - Isolate slow sinks behind bounded per-sink queues so the main path never blocks

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

#[cfg(test)]
mod test_support;

pub use contracts::{FusedRecord, RecordSink};
pub use dispatcher::{
    create_dispatcher, DispatchReport, Dispatcher, DispatcherBuilder, DispatcherConfig,
};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{Delivery, MetricsSnapshot, SinkMetrics};
pub use sinks::{summary_line, CollectSink, JsonLinesSink, LogSink, StdoutSink};
