//! CollectSink - keeps records in memory

use std::sync::Arc;

use contracts::{ContractError, FusedRecord, RecordSink};
use parking_lot::Mutex;

/// Sink that appends every record to a shared vector
///
/// Clones share the same storage, so a caller can keep one clone and hand
/// the other to a [`SinkHandle`](crate::SinkHandle).
#[derive(Clone, Default)]
pub struct CollectSink {
    name: String,
    records: Arc<Mutex<Vec<FusedRecord>>>,
    closed: Arc<Mutex<bool>>,
}

impl CollectSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Copy of everything written so far
    pub fn records(&self) -> Vec<FusedRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Whether the worker closed the sink
    pub fn is_closed(&self) -> bool {
        *self.closed.lock()
    }
}

impl RecordSink for CollectSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, record: &FusedRecord) -> Result<(), ContractError> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        *self.closed.lock() = true;
        Ok(())
    }
}
