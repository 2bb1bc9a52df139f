//! FrameDescriptor - VideoIngestor output
//!
//! Opaque description of one captured video frame. The pipeline never looks at
//! pixel data, only at where and when the frame was captured.

use serde::{Deserialize, Serialize};

use crate::CaptureTimestamp;

/// Video frame descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDescriptor {
    /// Capturing device identifier
    pub source_id: String,

    /// Capture time
    pub captured_at: CaptureTimestamp,

    /// Source-assigned frame number (may wrap, not assumed unique)
    pub sequence: u64,

    /// Encoded frame size in bytes
    pub payload_bytes: u64,
}

impl FrameDescriptor {
    /// Create a new frame descriptor
    pub fn new(
        source_id: impl Into<String>,
        captured_at: CaptureTimestamp,
        sequence: u64,
        payload_bytes: u64,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            captured_at,
            sequence,
            payload_bytes,
        }
    }
}
