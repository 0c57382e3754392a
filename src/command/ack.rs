//! Connection-acknowledged handler.

use std::sync::Arc;

use tracing::{debug, info};

use crate::command::registry::CommandHandler;
use crate::session::{ProfilingState, ProfilingStateMachine};
use crate::types::Packet;
use crate::Result;

/// Moves the session from `WaitingForAck` to `Active` when the observer
/// acknowledges the stream metadata.
pub struct ConnectionAckHandler {
    packet_id: u32,
    version: u32,
    state: Arc<ProfilingStateMachine>,
}

impl ConnectionAckHandler {
    pub fn new(packet_id: u32, version: u32, state: Arc<ProfilingStateMachine>) -> Self {
        Self {
            packet_id,
            version,
            state,
        }
    }

    pub fn packet_id(&self) -> u32 {
        self.packet_id
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

impl CommandHandler for ConnectionAckHandler {
    fn invoke(&self, packet: &Packet) -> Result<()> {
        debug!(packet_id = packet.id(), "connection acknowledged by observer");
        self.state.transition_to(ProfilingState::Active)?;
        info!("profiling session active");
        Ok(())
    }
}
