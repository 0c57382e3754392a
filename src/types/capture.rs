//! Capture selection data.

use serde::{Deserialize, Serialize};

/// The sampling configuration installed by the external observer.
///
/// Value-semantic: the holder hands out whole copies so the capture thread
/// never observes a half-replaced selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureData {
    /// Sampling interval, in the transport's time unit (microseconds here).
    pub period: u32,
    /// Uids of the counters selected for capture, in wire order.
    pub counter_ids: Vec<u16>,
}

impl CaptureData {
    pub fn new(period: u32, counter_ids: Vec<u16>) -> Self {
        Self {
            period,
            counter_ids,
        }
    }

    /// Whether any counters are selected at a non-zero period.
    pub fn is_active(&self) -> bool {
        self.period > 0 && !self.counter_ids.is_empty()
    }
}
