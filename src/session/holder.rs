//! Shared holder for the installed capture selection.

use std::sync::RwLock;

use crate::types::CaptureData;

/// Thread-safe `(period, counter ids)` holder.
///
/// The command thread replaces the selection wholesale; the capture thread
/// reads snapshot copies. Writers serialise on the lock, readers share it,
/// and a reader always observes exactly one writer's snapshot, never an
/// interleaving of two.
#[derive(Debug, Default)]
pub struct CaptureHolder {
    data: RwLock<CaptureData>,
}

impl CaptureHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the selection with a fresh snapshot.
    pub fn set_capture_data(&self, period: u32, counter_ids: Vec<u16>) {
        let mut guard = self
            .data
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = CaptureData::new(period, counter_ids);
    }

    /// Returns a copy of the current selection.
    pub fn capture_data(&self) -> CaptureData {
        self.data
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
