//! Periodic counter capture.
//!
//! Once the observer installs a selection, a dedicated capture thread wakes
//! every period, snapshots the holder, reads the selected counter values and
//! queues a capture packet for the ingress loop to flush. The thread polls a
//! cancellation token each cycle and exits promptly on `stop()`; a full send
//! buffer drops that cycle's sample rather than stalling the runtime.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::session::CaptureHolder;
use crate::values::CounterValueReader;
use crate::wire::PacketEncoder;
use crate::ProfilingError;

/// Sleep used while no selection is active, and the upper bound on how long
/// a stop can take to be observed.
const IDLE_POLL: Duration = Duration::from_millis(50);

/// Capability the selection handler uses to run the capture collaborator.
pub trait PeriodicCounterCapture: Send + Sync {
    /// Starts the capture loop if it is not already running. Idempotent.
    fn start(&self);

    /// Signals the loop to exit and waits for it.
    fn stop(&self);

    fn is_running(&self) -> bool;
}

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Capture loop on a dedicated OS thread.
pub struct CaptureThread {
    holder: Arc<CaptureHolder>,
    encoder: PacketEncoder,
    reader: Arc<dyn CounterValueReader>,
    worker: Mutex<Option<Worker>>,
}

impl CaptureThread {
    pub fn new(
        holder: Arc<CaptureHolder>,
        encoder: PacketEncoder,
        reader: Arc<dyn CounterValueReader>,
    ) -> Self {
        Self {
            holder,
            encoder,
            reader,
            worker: Mutex::new(None),
        }
    }

    fn run(
        holder: Arc<CaptureHolder>,
        encoder: PacketEncoder,
        reader: Arc<dyn CounterValueReader>,
        cancel: CancellationToken,
    ) {
        debug!("capture thread started");
        let epoch = Instant::now();

        while !cancel.is_cancelled() {
            let selection = holder.capture_data();
            if !selection.is_active() {
                thread::sleep(IDLE_POLL);
                continue;
            }

            let values: Vec<(u16, u32)> = selection
                .counter_ids
                .iter()
                .map(|&uid| (uid, reader.read_value(uid)))
                .collect();

            let timestamp = epoch.elapsed().as_nanos() as u64;
            match encoder.send_periodic_counter_capture(timestamp, &values) {
                Ok(()) => trace!(timestamp, counters = values.len(), "captured sample"),
                // Drop-newest: the observer loses this sample, the runtime
                // never stalls.
                Err(ProfilingError::BufferExhausted { requested, available }) => {
                    warn!(requested, available, "send buffer full, sample dropped");
                }
                Err(error) => warn!(%error, "capture sample failed"),
            }

            thread::sleep(Duration::from_micros(u64::from(selection.period)));
        }
        debug!("capture thread stopped");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Worker>> {
        self.worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PeriodicCounterCapture for CaptureThread {
    fn start(&self) {
        let mut worker = self.lock();
        if worker.is_some() {
            return;
        }

        let cancel = CancellationToken::new();
        let holder = Arc::clone(&self.holder);
        let encoder = self.encoder.clone();
        let reader = Arc::clone(&self.reader);
        let thread_cancel = cancel.clone();
        let handle = thread::Builder::new()
            .name("periodic-counter-capture".to_string())
            .spawn(move || Self::run(holder, encoder, reader, thread_cancel))
            .expect("spawning the capture thread");

        *worker = Some(Worker { cancel, handle });
    }

    fn stop(&self) {
        let worker = self.lock().take();
        if let Some(worker) = worker {
            worker.cancel.cancel();
            if worker.handle.join().is_err() {
                warn!("capture thread panicked before join");
            }
        }
    }

    fn is_running(&self) -> bool {
        self.lock().is_some()
    }
}

impl Drop for CaptureThread {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::CounterValues;
    use crate::wire::buffer::PacketBuffer;
    use crate::wire::bytes::{read_u16, read_u32};

    fn capture_fixture(capacity: usize) -> (CaptureThread, Arc<CaptureHolder>, Arc<CounterValues>, Arc<PacketBuffer>) {
        let holder = Arc::new(CaptureHolder::new());
        let values = Arc::new(CounterValues::new());
        let buffer = Arc::new(PacketBuffer::with_capacity(capacity));
        let capture = CaptureThread::new(
            Arc::clone(&holder),
            PacketEncoder::new(Arc::clone(&buffer)),
            Arc::clone(&values) as Arc<dyn CounterValueReader>,
        );
        (capture, holder, values, buffer)
    }

    #[test]
    fn start_is_idempotent_and_stop_joins() {
        let (capture, _holder, _values, _buffer) = capture_fixture(512);

        assert!(!capture.is_running());
        capture.start();
        capture.start();
        assert!(capture.is_running());

        capture.stop();
        assert!(!capture.is_running());
        // Stopping again is a no-op.
        capture.stop();
    }

    #[test]
    fn active_selection_produces_samples() {
        let (capture, holder, values, buffer) = capture_fixture(4096);
        values.register(7);
        values.set(7, 41);

        holder.set_capture_data(100, vec![7]);
        capture.start();

        // Wait for at least one sample to land.
        let deadline = Instant::now() + Duration::from_secs(2);
        while buffer.committed_len() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        capture.stop();

        let bytes = buffer.read();
        assert!(bytes.len() >= 22, "expected at least one capture frame");
        let header_word0 = read_u32(&bytes, 0).unwrap();
        assert_eq!((header_word0 >> 26) & 0x3F, 1); // capture family
        assert_eq!(read_u32(&bytes, 4), Some(14)); // 8 + 1 * 6
        assert_eq!(read_u16(&bytes, 16), Some(7));
        assert_eq!(read_u32(&bytes, 18), Some(41));
    }

    #[test]
    fn inactive_selection_stays_quiet() {
        let (capture, _holder, _values, buffer) = capture_fixture(512);
        capture.start();
        thread::sleep(Duration::from_millis(30));
        capture.stop();
        assert_eq!(buffer.committed_len(), 0);
    }
}
