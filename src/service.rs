//! The profiling service.
//!
//! Owns the counter directory, the session state machine, the send side and
//! the command dispatch, and drives the session according to its options.
//! The embedding runtime constructs one service, registers its schema
//! through the passthroughs here, and calls [`run`] on its own cadence.
//! [`run`] only connects and watches for a dead connection; it never reads
//! from the channel. Inbound dispatch and outbound flushing belong to the
//! ingress thread ([`CommandLoop`]), which drains the send buffer after
//! every dispatched packet and on every read-timeout tick.
//!
//! Collaborator failures on the runtime path (transport, buffer) never
//! escape: they convert into state retrogression or dropped frames. Schema
//! registration errors do propagate, because they mean the runtime component
//! is registering something invalid.
//!
//! [`run`]: ProfilingService::run

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::capture::{CaptureThread, PeriodicCounterCapture};
use crate::command::{
    CommandHandlerRegistry, ConnectionAckHandler, PacketVersionResolver,
    PeriodicCounterSelectionHandler, COMMAND_VERSION, CONNECTION_ACK_PACKET_ID,
    PERIODIC_COUNTER_SELECTION_PACKET_ID,
};
use crate::config::ProfilingOptions;
use crate::connection::{ConnectionFactory, ProfilingConnection};
use crate::schema::{Category, Counter, CounterDirectory, CounterRegistration, CounterSet, Device};
use crate::session::{CaptureHolder, ProfilingState, ProfilingStateMachine};
use crate::types::{CaptureData, Packet};
use crate::values::{CounterValueReader, CounterValues};
use crate::wire::{PacketBuffer, PacketEncoder};
use crate::{ProfilingError, Result};

/// External profiling service of the runtime.
pub struct ProfilingService {
    options: ProfilingOptions,
    enabled: AtomicBool,
    state: Arc<ProfilingStateMachine>,
    directory: CounterDirectory,
    values: Arc<CounterValues>,
    holder: Arc<CaptureHolder>,
    buffer: Arc<PacketBuffer>,
    encoder: PacketEncoder,
    capture: Arc<CaptureThread>,
    registry: CommandHandlerRegistry,
    resolver: PacketVersionResolver,
    factory: Box<dyn ConnectionFactory>,
    connection: Mutex<Option<Arc<dyn ProfilingConnection>>>,
}

impl ProfilingService {
    /// Builds the service.
    ///
    /// The initial session state follows `options.enable_profiling`:
    /// disabled services start `Uninitialised`, enabled ones
    /// `NotConnected`.
    pub fn new(options: ProfilingOptions, factory: Box<dyn ConnectionFactory>) -> Self {
        let initial = if options.enable_profiling {
            ProfilingState::NotConnected
        } else {
            ProfilingState::Uninitialised
        };
        let state = Arc::new(ProfilingStateMachine::new(initial));

        let buffer = Arc::new(PacketBuffer::with_capacity(options.buffer_capacity));
        let encoder = PacketEncoder::new(Arc::clone(&buffer));
        let holder = Arc::new(CaptureHolder::new());
        let values = Arc::new(CounterValues::new());
        let capture = Arc::new(CaptureThread::new(
            Arc::clone(&holder),
            encoder.clone(),
            Arc::clone(&values) as Arc<dyn CounterValueReader>,
        ));

        let registry = CommandHandlerRegistry::new();
        registry.register(
            Arc::new(PeriodicCounterSelectionHandler::new(
                PERIODIC_COUNTER_SELECTION_PACKET_ID,
                COMMAND_VERSION,
                Arc::clone(&holder),
                Arc::clone(&capture) as Arc<dyn PeriodicCounterCapture>,
                encoder.clone(),
            )),
            PERIODIC_COUNTER_SELECTION_PACKET_ID,
            COMMAND_VERSION,
        );
        registry.register(
            Arc::new(ConnectionAckHandler::new(
                CONNECTION_ACK_PACKET_ID,
                COMMAND_VERSION,
                Arc::clone(&state),
            )),
            CONNECTION_ACK_PACKET_ID,
            COMMAND_VERSION,
        );

        Self {
            enabled: AtomicBool::new(options.enable_profiling),
            options,
            state,
            directory: CounterDirectory::new(),
            values,
            holder,
            buffer,
            encoder,
            capture,
            registry,
            resolver: PacketVersionResolver::new(),
            factory,
            connection: Mutex::new(None),
        }
    }

    /// The current session phase. Safe from any thread.
    pub fn current_state(&self) -> ProfilingState {
        self.state.current_state()
    }

    /// Whether profiling is enabled right now.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Flips the enable gate; the next [`run`] observes it.
    ///
    /// [`run`]: ProfilingService::run
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Idempotent session driver; call on the runtime's own cadence.
    pub fn run(&self) {
        match self.current_state() {
            ProfilingState::Uninitialised => {
                if self.is_enabled() {
                    if let Err(error) = self.state.transition_to(ProfilingState::NotConnected) {
                        warn!(%error, "enable transition lost a race");
                    }
                }
            }
            ProfilingState::NotConnected => match self.factory.connect() {
                Ok(connection) => {
                    info!("connected to external observer");
                    *self.lock_connection() = Some(Arc::from(connection));
                    if let Err(error) = self.encoder.send_stream_metadata() {
                        warn!(%error, "stream metadata dropped");
                    }
                    self.flush_outbound();
                    if let Err(error) = self.state.transition_to(ProfilingState::WaitingForAck) {
                        warn!(%error, "handshake transition lost a race");
                    }
                }
                Err(error) => {
                    debug!(%error, "observer connection attempt failed");
                }
            },
            ProfilingState::WaitingForAck => {
                // No-op: the W -> A edge belongs to the connection-ack
                // handler, invoked from the ingress thread.
            }
            ProfilingState::Active => {
                // No-op beyond watching for a dead connection; inbound
                // dispatch is the ingress thread's job.
                let alive = self
                    .lock_connection()
                    .as_ref()
                    .is_some_and(|connection| connection.is_open());
                if !alive {
                    self.on_connection_lost();
                }
            }
        }
    }

    /// Routes one inbound packet through the registry.
    ///
    /// This is the dispatch primitive used by the ingress loop; it is public
    /// so an embedding runtime can frame packets itself. Errors are the
    /// handler's verdicts; the loop-facing wrapper converts them into logs
    /// and drops.
    pub fn process_packet(&self, packet: &Packet) -> Result<()> {
        let version = self.resolver.resolve(packet.id());
        let handler = self.registry.get(packet.id(), version.major())?;
        handler.invoke(packet)
    }

    fn handle_inbound(&self, packet: &Packet) {
        match self.process_packet(packet) {
            Ok(()) => {}
            Err(ProfilingError::HandlerNotFound { packet_id, version }) => {
                debug!(packet_id, version, "no handler, packet dropped");
            }
            Err(error) => {
                warn!(packet_id = packet.id(), %error, "packet dropped");
            }
        }
    }

    /// Drains committed send-buffer bytes to the connection.
    ///
    /// The ingress loop calls this after each dispatch and on every read
    /// timeout, so acknowledgements and capture samples reach the observer
    /// without the driver touching the channel; the driver itself flushes
    /// only the handshake metadata it wrote. Public so an embedding runtime
    /// framing packets through [`process_packet`] can drain its own sends.
    ///
    /// [`process_packet`]: ProfilingService::process_packet
    pub fn flush_outbound(&self) {
        let connection = self.lock_connection().clone();
        let Some(connection) = connection else {
            return;
        };
        let bytes = self.buffer.read();
        if bytes.is_empty() {
            return;
        }
        if let Err(error) = connection.write(&bytes) {
            warn!(%error, dropped = bytes.len(), "outbound flush failed");
            self.on_connection_lost();
        }
    }

    /// Transport failure: retrogress when the table allows it.
    ///
    /// `Active` falls back to `NotConnected` and stops capture. A failure
    /// while `WaitingForAck` only clears the connection: the transition
    /// table has no W -> N edge (the ack may be in flight), so the session
    /// deliberately stays where it is.
    fn on_connection_lost(&self) {
        self.lock_connection().take();
        if self.current_state() == ProfilingState::Active {
            self.capture.stop();
            match self.state.transition_to(ProfilingState::NotConnected) {
                Ok(()) => info!("observer connection lost, session reset"),
                Err(error) => warn!(%error, "retrogression lost a race"),
            }
        } else {
            warn!("observer connection lost outside an active session");
        }
    }

    // --- Schema registration passthroughs -------------------------------

    /// Registers a category; see [`CounterDirectory::register_category`].
    pub fn register_category(
        &self,
        name: &str,
        device_uid: u16,
        counter_set_uid: u16,
    ) -> Result<Category> {
        self.directory
            .register_category(name, device_uid, counter_set_uid)
    }

    /// Registers a device; see [`CounterDirectory::register_device`].
    pub fn register_device(
        &self,
        name: &str,
        cores: u16,
        parent_category: Option<&str>,
    ) -> Result<Device> {
        self.directory.register_device(name, cores, parent_category)
    }

    /// Registers a counter set; see
    /// [`CounterDirectory::register_counter_set`].
    pub fn register_counter_set(
        &self,
        name: &str,
        count: u16,
        parent_category: Option<&str>,
    ) -> Result<CounterSet> {
        self.directory
            .register_counter_set(name, count, parent_category)
    }

    /// Registers a counter and its per-core value cells.
    pub fn register_counter(
        &self,
        parent_category: &str,
        registration: CounterRegistration,
    ) -> Result<Counter> {
        let counter = self
            .directory
            .register_counter(parent_category, registration)?;
        for uid in counter.uid..=counter.max_counter_uid {
            self.values.register(uid);
        }
        Ok(counter)
    }

    // --- Accessors ------------------------------------------------------

    /// The counter schema directory.
    pub fn directory(&self) -> &CounterDirectory {
        &self.directory
    }

    /// Live counter values, for runtime components to update.
    pub fn values(&self) -> &Arc<CounterValues> {
        &self.values
    }

    /// Snapshot of the currently installed capture selection.
    pub fn capture_data(&self) -> CaptureData {
        self.holder.capture_data()
    }

    /// Whether the capture thread is running.
    pub fn is_capturing(&self) -> bool {
        self.capture.is_running()
    }

    fn lock_connection(&self) -> std::sync::MutexGuard<'_, Option<Arc<dyn ProfilingConnection>>> {
        self.connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Handle to a running ingress loop; stops and joins on drop.
pub struct CommandLoop {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl CommandLoop {
    /// Spawns the ingress loop: a thread that blocks on inbound reads,
    /// dispatches packets through the service, and flushes queued outbound
    /// bytes until stopped. Flushing happens after every dispatch and on
    /// every read-timeout tick, which bounds the latency of capture samples
    /// by the configured read timeout.
    pub fn spawn(service: Arc<ProfilingService>) -> Self {
        let cancel = CancellationToken::new();
        let thread_cancel = cancel.clone();
        let read_timeout = service.options.read_timeout;

        let handle = thread::Builder::new()
            .name("profiling-command-loop".to_string())
            .spawn(move || {
                debug!("command loop started");
                while !thread_cancel.is_cancelled() {
                    let connection = service.lock_connection().clone();
                    match connection {
                        None => thread::sleep(read_timeout),
                        Some(connection) => match connection.read_packet(read_timeout) {
                            Ok(Some(packet)) => service.handle_inbound(&packet),
                            Ok(None) => {}
                            Err(error) => {
                                warn!(%error, "ingress read failed");
                                service.on_connection_lost();
                            }
                        },
                    }
                    service.flush_outbound();
                }
                debug!("command loop stopped");
            })
            .expect("spawning the command loop thread");

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Signals the loop to exit and waits for the thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("command loop panicked before join");
            }
        }
    }
}

impl Drop for CommandLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}
