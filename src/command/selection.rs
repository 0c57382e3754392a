//! Periodic-counter selection handler.
//!
//! The observer sends a selection packet to choose which counters are
//! sampled and how often:
//!
//! ```text
//! period: u32 (LE), then counterId: u16 (LE) x k    (data length 4 + 2k)
//! ```
//!
//! The handler installs the selection into the shared holder, starts the
//! capture collaborator, and acknowledges by echoing the installed period
//! and ids back to the observer. A bare 4-byte payload is a valid "period
//! only" selection: the id list is emptied and the ack carries 4 bytes of
//! body. Any other length that is not `4 + 2k` is rejected as
//! `MalformedPacket` before any state is touched.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::capture::PeriodicCounterCapture;
use crate::command::registry::CommandHandler;
use crate::session::CaptureHolder;
use crate::types::Packet;
use crate::wire::bytes::{read_u16, read_u32};
use crate::wire::PacketEncoder;
use crate::{ProfilingError, Result};

/// Handles the periodic-counter selection packet.
pub struct PeriodicCounterSelectionHandler {
    packet_id: u32,
    version: u32,
    holder: Arc<CaptureHolder>,
    capture: Arc<dyn PeriodicCounterCapture>,
    encoder: PacketEncoder,
}

impl PeriodicCounterSelectionHandler {
    pub fn new(
        packet_id: u32,
        version: u32,
        holder: Arc<CaptureHolder>,
        capture: Arc<dyn PeriodicCounterCapture>,
        encoder: PacketEncoder,
    ) -> Self {
        Self {
            packet_id,
            version,
            holder,
            capture,
            encoder,
        }
    }

    pub fn packet_id(&self) -> u32 {
        self.packet_id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    fn parse(&self, payload: &[u8]) -> Result<(u32, Vec<u16>)> {
        if payload.len() < 4 || (payload.len() - 4) % 2 != 0 {
            return Err(ProfilingError::malformed_packet(
                self.packet_id,
                format!("selection payload of {} bytes is not 4 + 2k", payload.len()),
            ));
        }

        let period = read_u32(payload, 0).expect("length checked above");
        let mut counter_ids = Vec::with_capacity((payload.len() - 4) / 2);
        let mut offset = 4;
        while offset < payload.len() {
            counter_ids.push(read_u16(payload, offset).expect("length checked above"));
            offset += 2;
        }
        Ok((period, counter_ids))
    }
}

impl CommandHandler for PeriodicCounterSelectionHandler {
    fn invoke(&self, packet: &Packet) -> Result<()> {
        let (period, counter_ids) = self.parse(packet.data()).inspect_err(|_| {
            warn!(
                packet_id = packet.id(),
                length = packet.length(),
                "rejected malformed selection payload"
            );
        })?;

        debug!(period, counters = counter_ids.len(), "installing capture selection");
        self.holder.set_capture_data(period, counter_ids.clone());
        self.capture.start();
        self.encoder.send_counter_selection_ack(period, &counter_ids)
    }
}
