//! Live counter values.
//!
//! The schema directory describes counters; this store holds their current
//! values. Runtime threads bump values lock-free through per-uid atomics
//! while the capture thread snapshots whatever selection the observer
//! installed. Registration happens alongside directory registration during
//! startup, so the read path never blocks on the map lock for long.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

/// Read capability handed to the capture thread.
pub trait CounterValueReader: Send + Sync {
    /// The current value for `uid`; unregistered uids read as 0.
    fn read_value(&self, uid: u16) -> u32;
}

/// Concurrent map of counter uid to live value.
#[derive(Debug, Default)]
pub struct CounterValues {
    values: RwLock<HashMap<u16, Arc<AtomicU32>>>,
}

impl CounterValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `uid` with a zero value. Idempotent.
    pub fn register(&self, uid: u16) {
        self.values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(uid)
            .or_insert_with(|| Arc::new(AtomicU32::new(0)));
    }

    /// Sets the value for a registered uid; unregistered uids are ignored.
    pub fn set(&self, uid: u16, value: u32) {
        if let Some(cell) = self.cell(uid) {
            cell.store(value, Ordering::Relaxed);
        }
    }

    /// Adds `amount` to a registered uid, wrapping on overflow.
    pub fn increment(&self, uid: u16, amount: u32) {
        if let Some(cell) = self.cell(uid) {
            cell.fetch_add(amount, Ordering::Relaxed);
        }
    }

    pub fn len(&self) -> usize {
        self.values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, uid: u16) -> Option<Arc<AtomicU32>> {
        self.values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&uid)
            .cloned()
    }
}

impl CounterValueReader for CounterValues {
    fn read_value(&self, uid: u16) -> u32 {
        self.cell(uid)
            .map(|cell| cell.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn unregistered_uids_read_zero_and_ignore_writes() {
        let values = CounterValues::new();
        assert_eq!(values.read_value(7), 0);
        values.set(7, 99);
        values.increment(7, 1);
        assert_eq!(values.read_value(7), 0);
        assert!(values.is_empty());
    }

    #[test]
    fn set_and_increment() {
        let values = CounterValues::new();
        values.register(7);
        values.register(7); // idempotent

        values.set(7, 10);
        assert_eq!(values.read_value(7), 10);
        values.increment(7, 5);
        assert_eq!(values.read_value(7), 15);
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let values = Arc::new(CounterValues::new());
        values.register(3);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let values = Arc::clone(&values);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        values.increment(3, 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("value thread panicked");
        }

        assert_eq!(values.read_value(3), 8000);
    }
}
