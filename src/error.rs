//! Error types for the profiling subsystem.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context. Two propagation regimes apply:
//!
//! - **Schema errors** (`InvalidArgument`) surface to the runtime component
//!   performing registration, because they indicate a programming error at
//!   setup time.
//! - **Runtime-path errors** (packet, buffer, transport) are absorbed by the
//!   service and converted into state transitions and/or dropped frames;
//!   they never unwind across the ingress thread boundary.
//!
//! Use [`ProfilingError::is_retryable`] to distinguish transient conditions
//! (a full send buffer, a dropped connection) from permanent ones.

use thiserror::Error;

use crate::session::ProfilingState;

/// Result type alias for profiling operations.
pub type Result<T, E = ProfilingError> = std::result::Result<T, E>;

/// Main error type for the profiling subsystem.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProfilingError {
    /// A schema registration argument violated a directory rule.
    #[error("invalid argument for {context}: {details}")]
    InvalidArgument { context: String, details: String },

    /// Packet construction with inconsistent length/payload.
    #[error("invalid packet: {reason}")]
    InvalidPacket { reason: String },

    /// A handler rejected a payload that fails its structural checks.
    #[error("malformed payload for packet id {packet_id}: {details}")]
    MalformedPacket { packet_id: u32, details: String },

    /// An illegal edge in the session state machine.
    #[error("illegal profiling state transition: {from:?} -> {to:?}")]
    InvalidStateTransition {
        from: ProfilingState,
        to: ProfilingState,
    },

    /// No handler registered for the `(packet id, version)` key.
    #[error("no handler registered for packet id {packet_id} version {version}")]
    HandlerNotFound { packet_id: u32, version: u32 },

    /// The send buffer cannot satisfy a reservation.
    #[error("send buffer exhausted: requested {requested} bytes, {available} available")]
    BufferExhausted { requested: usize, available: usize },

    /// The connection to the external observer failed or dropped.
    #[error("transport error: {reason}")]
    Transport {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

impl ProfilingError {
    /// Returns whether the failed operation may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProfilingError::Transport { .. } => true,
            ProfilingError::BufferExhausted { .. } => true,
            ProfilingError::InvalidArgument { .. } => false,
            ProfilingError::InvalidPacket { .. } => false,
            ProfilingError::MalformedPacket { .. } => false,
            ProfilingError::InvalidStateTransition { .. } => false,
            ProfilingError::HandlerNotFound { .. } => false,
            ProfilingError::Config { .. } => false,
        }
    }

    /// Helper constructor for schema registration errors.
    pub fn invalid_argument(context: impl Into<String>, details: impl Into<String>) -> Self {
        ProfilingError::InvalidArgument {
            context: context.into(),
            details: details.into(),
        }
    }

    /// Helper constructor for transport errors without an underlying cause.
    pub fn transport(reason: impl Into<String>) -> Self {
        ProfilingError::Transport {
            reason: reason.into(),
            source: None,
        }
    }

    /// Helper constructor for transport errors with an underlying cause.
    pub fn transport_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        ProfilingError::Transport {
            reason: reason.into(),
            source: Some(source),
        }
    }

    /// Helper constructor for malformed handler payloads.
    pub fn malformed_packet(packet_id: u32, details: impl Into<String>) -> Self {
        ProfilingError::MalformedPacket {
            packet_id,
            details: details.into(),
        }
    }
}

impl From<std::io::Error> for ProfilingError {
    fn from(err: std::io::Error) -> Self {
        ProfilingError::Transport {
            reason: err.kind().to_string(),
            source: Some(Box::new(err)),
        }
    }
}
