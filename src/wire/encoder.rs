//! Outbound packet encoder.
//!
//! Serializes control and data packets into the bounded send buffer. Every
//! outbound packet is two little-endian header words (packed
//! family/id, then body length) followed by the body. The transport drains
//! the buffer and owns actual socket writes.
//!
//! Packets produced here:
//!
//! | Packet | Family | Id | Body |
//! |---|---|---|---|
//! | Stream metadata | 0 | 0 | magic `u32`, protocol version `u32` |
//! | Selection acknowledgement | 0 | 4 | period `u32`, counter id `u16` × k |
//! | Periodic counter capture | 1 | 0 | timestamp `u64`, (uid `u16`, value `u32`) × k |

use std::sync::Arc;

use tracing::trace;

use crate::types::Version;
use crate::wire::buffer::PacketBuffer;
use crate::wire::bytes::{write_u16, write_u32, write_u64};
use crate::Result;

/// Magic word opening the stream metadata body.
pub const STREAM_METADATA_MAGIC: u32 = 0x4D45_5441;

/// Version advertised in the stream metadata packet.
pub const PROTOCOL_VERSION: Version = Version::from_encoded(1 << 22); // 1.0.0

const HEADER_BYTES: usize = 8;

/// Packs the first header word from a family and id.
pub fn make_header(family: u32, id: u32) -> u32 {
    ((family & 0x3F) << 26) | ((id & 0x3FF) << 16)
}

/// Builds outbound packets into a shared [`PacketBuffer`].
///
/// Fails with [`BufferExhausted`] when the buffer cannot hold the packet;
/// the reservation is released before returning on every path, so a dropped
/// send never wedges the buffer.
///
/// [`BufferExhausted`]: crate::ProfilingError::BufferExhausted
#[derive(Debug, Clone)]
pub struct PacketEncoder {
    buffer: Arc<PacketBuffer>,
}

impl PacketEncoder {
    pub fn new(buffer: Arc<PacketBuffer>) -> Self {
        Self { buffer }
    }

    /// The buffer this encoder writes into.
    pub fn buffer(&self) -> &Arc<PacketBuffer> {
        &self.buffer
    }

    /// Announces the session to the observer: magic plus protocol version.
    pub fn send_stream_metadata(&self) -> Result<()> {
        let body_len = 8;
        let mut reservation = self.buffer.reserve(HEADER_BYTES + body_len)?;
        let bytes = reservation.bytes();

        write_u32(bytes, 0, make_header(0, 0));
        write_u32(bytes, 4, body_len as u32);
        write_u32(bytes, 8, STREAM_METADATA_MAGIC);
        write_u32(bytes, 12, PROTOCOL_VERSION.encoded());

        reservation.commit(HEADER_BYTES + body_len);
        trace!(version = %PROTOCOL_VERSION, "queued stream metadata packet");
        Ok(())
    }

    /// Acknowledges an installed capture selection, echoing period and ids.
    pub fn send_counter_selection_ack(&self, period: u32, counter_ids: &[u16]) -> Result<()> {
        let body_len = 4 + 2 * counter_ids.len();
        let mut reservation = self.buffer.reserve(HEADER_BYTES + body_len)?;
        let bytes = reservation.bytes();

        write_u32(bytes, 0, make_header(0, 4));
        write_u32(bytes, 4, body_len as u32);
        write_u32(bytes, 8, period);
        let mut offset = 12;
        for &id in counter_ids {
            write_u16(bytes, offset, id);
            offset += 2;
        }

        reservation.commit(HEADER_BYTES + body_len);
        trace!(
            period,
            counters = counter_ids.len(),
            "queued selection acknowledgement"
        );
        Ok(())
    }

    /// Emits one capture sample: a timestamp and the selected counter values.
    pub fn send_periodic_counter_capture(
        &self,
        timestamp: u64,
        values: &[(u16, u32)],
    ) -> Result<()> {
        let body_len = 8 + 6 * values.len();
        let mut reservation = self.buffer.reserve(HEADER_BYTES + body_len)?;
        let bytes = reservation.bytes();

        write_u32(bytes, 0, make_header(1, 0));
        write_u32(bytes, 4, body_len as u32);
        write_u64(bytes, 8, timestamp);
        let mut offset = 16;
        for &(uid, value) in values {
            write_u16(bytes, offset, uid);
            write_u32(bytes, offset + 2, value);
            offset += 6;
        }

        reservation.commit(HEADER_BYTES + body_len);
        trace!(timestamp, counters = values.len(), "queued capture packet");
        Ok(())
    }
}
