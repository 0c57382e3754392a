//! Bounded send buffer between the packet encoder and the transport.
//!
//! Single producer (the encoder), single consumer (the transport drain).
//! The producer takes a [`Reservation`] for the bytes it intends to write,
//! fills it, then commits the written size; the consumer drains everything
//! committed so far. Dropping a reservation without committing releases the
//! region on every exit path, including unwinding, so a failed encode can
//! never leave the buffer permanently reserved.
//!
//! When the remaining capacity cannot satisfy a reservation the encoder gets
//! [`BufferExhausted`] and the frame is dropped; the observer channel has no
//! back-pressure beyond drop-newest.
//!
//! [`BufferExhausted`]: crate::ProfilingError::BufferExhausted

use std::sync::{Mutex, MutexGuard};

use crate::{ProfilingError, Result};

#[derive(Debug)]
struct Inner {
    data: Vec<u8>,
    /// Bytes committed and visible to the consumer.
    committed: usize,
}

/// Bounded byte buffer with reserve/commit/read hand-off.
#[derive(Debug)]
pub struct PacketBuffer {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl PacketBuffer {
    /// Creates a buffer that can hold up to `capacity` committed bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                data: vec![0; capacity],
                committed: 0,
            }),
            capacity,
        }
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reserves `size` writable bytes after the committed region.
    ///
    /// The reservation holds the producer lock until committed or dropped;
    /// encoding is short and single-producer, so the critical section stays
    /// small.
    pub fn reserve(&self, size: usize) -> Result<Reservation<'_>> {
        let guard = self.lock();
        let available = self.capacity - guard.committed;
        if size > available {
            return Err(ProfilingError::BufferExhausted {
                requested: size,
                available,
            });
        }

        let start = guard.committed;
        Ok(Reservation { guard, start, size })
    }

    /// Drains and returns all committed bytes.
    pub fn read(&self) -> Vec<u8> {
        let mut guard = self.lock();
        let committed = guard.committed;
        guard.committed = 0;
        guard.data[..committed].to_vec()
    }

    /// Number of committed bytes awaiting the consumer.
    pub fn committed_len(&self) -> usize {
        self.lock().committed
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock means a producer panicked mid-write; the committed
        // watermark is still consistent, so keep going.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A scoped writable region of the buffer.
///
/// Obtained from [`PacketBuffer::reserve`]. Write through [`bytes`], then
/// [`commit`] the number of bytes actually produced. Dropping without
/// committing discards the region.
///
/// [`bytes`]: Reservation::bytes
/// [`commit`]: Reservation::commit
#[derive(Debug)]
pub struct Reservation<'a> {
    guard: MutexGuard<'a, Inner>,
    start: usize,
    size: usize,
}

impl Reservation<'_> {
    /// The writable region, `size` bytes long.
    pub fn bytes(&mut self) -> &mut [u8] {
        let start = self.start;
        let end = start + self.size;
        &mut self.guard.data[start..end]
    }

    /// Reserved size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Publishes the first `written` bytes of the region to the consumer.
    pub fn commit(mut self, written: usize) {
        debug_assert!(written <= self.size, "commit beyond reservation");
        self.guard.committed = self.start + written.min(self.size);
    }

    /// Discards the region without publishing anything.
    ///
    /// Dropping the reservation has the same effect; this form exists for
    /// call sites that want the release to be visible.
    pub fn release(self) {}
}
