//! Sink implementations
//!
//! Contains LogSink, JsonLinesSink (stdout) and CollectSink.

mod collect;
mod log;
mod stdout;

pub use self::collect::CollectSink;
pub use self::log::{summary_line, LogSink};
pub use self::stdout::{JsonLinesSink, StdoutSink};
