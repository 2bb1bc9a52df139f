//! Pipeline orchestration module.

mod orchestrator;

pub use orchestrator::{Orchestrator, RunOptions, RunSummary, StopReason};
