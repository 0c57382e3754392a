//! Shared test doubles for the transport seam.
//!
//! Available to unit tests and, behind the `benchmark` feature, to the
//! criterion benchmarks.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::connection::{ConnectionFactory, ProfilingConnection};
use crate::types::Packet;
use crate::{ProfilingError, Result};

/// In-memory observer connection.
///
/// Inbound packets are queued by the test with [`push_inbound`]; outbound
/// bytes accumulate until drained with [`written`]. [`close`] simulates the
/// observer going away.
///
/// [`push_inbound`]: MockConnection::push_inbound
/// [`written`]: MockConnection::written
/// [`close`]: MockConnection::close
pub struct MockConnection {
    open: AtomicBool,
    inbound: Mutex<VecDeque<Packet>>,
    outbound: Mutex<Vec<u8>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            open: AtomicBool::new(true),
            inbound: Mutex::new(VecDeque::new()),
            outbound: Mutex::new(Vec::new()),
        }
    }

    /// Queues a packet for the service to read.
    pub fn push_inbound(&self, packet: Packet) {
        self.inbound
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(packet);
    }

    /// Drains and returns everything the service has written.
    pub fn written(&self) -> Vec<u8> {
        std::mem::take(
            &mut *self
                .outbound
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }

    /// Simulates the observer dropping the connection.
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

impl ProfilingConnection for MockConnection {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn write(&self, data: &[u8]) -> Result<()> {
        if !self.is_open() {
            return Err(ProfilingError::transport("mock connection closed"));
        }
        self.outbound
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(data);
        Ok(())
    }

    fn read_packet(&self, timeout: Duration) -> Result<Option<Packet>> {
        if !self.is_open() {
            return Err(ProfilingError::transport("mock connection closed"));
        }
        let next = self
            .inbound
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        if next.is_none() && !timeout.is_zero() {
            // Imitate a blocking read so callers do not busy-spin.
            std::thread::sleep(timeout.min(Duration::from_millis(10)));
        }
        Ok(next)
    }
}

/// Factory producing [`MockConnection`]s, with scriptable failures.
#[derive(Default)]
pub struct MockConnectionFactory {
    fail_remaining: AtomicUsize,
    connections: Arc<Mutex<Vec<Arc<MockConnection>>>>,
}

impl MockConnectionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` connect attempts fail with a transport error.
    pub fn fail_next_connects(&self, count: usize) {
        self.fail_remaining.store(count, Ordering::SeqCst);
    }

    /// Shared handle to every connection this factory has produced, in
    /// creation order.
    pub fn connections(&self) -> Arc<Mutex<Vec<Arc<MockConnection>>>> {
        Arc::clone(&self.connections)
    }
}

impl ConnectionFactory for MockConnectionFactory {
    fn connect(&self) -> Result<Box<dyn ProfilingConnection>> {
        let remaining = self.fail_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(ProfilingError::transport("mock connect refused"));
        }

        let connection = Arc::new(MockConnection::new());
        self.connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Arc::clone(&connection));
        Ok(Box::new(connection))
    }
}
