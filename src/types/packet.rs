//! Framed protocol packet.
//!
//! Every message on the observer channel is framed as a 32-bit header word,
//! a 32-bit length word and `length` bytes of payload. The header packs four
//! fields:
//!
//! ```text
//!  31      26 25              16 15                             0
//! +----------+------------------+--------------------------------+
//! |  family  |        id        |          (reserved)            |
//! +----------+------------------+--------------------------------+
//!             \__ class: bits [25:19], type: bits [18:16] __/
//! ```
//!
//! - `family` = bits `[31:26]` (6 bits)
//! - `id` = bits `[25:16]` (10 bits)
//! - `class` = bits `[25:19]` (the upper 7 bits of the id)
//! - `type` = bits `[18:16]` (the lower 3 bits of the id)
//!
//! Reference decoding, pinned by tests: header `0x1C2B_0000` (472580096) is
//! family `7`, id `43`, type `3`, class `5`.
//!
//! A packet owns its payload. The length word and the payload must agree at
//! construction time: a non-zero length with no payload, a payload present
//! for a zero length (even a zero-sized allocation), or a length that
//! disagrees with the payload size are all [`InvalidPacket`] errors.
//!
//! [`InvalidPacket`]: crate::ProfilingError::InvalidPacket

use crate::{ProfilingError, Result};

/// Immutable framed message: header word plus owned byte payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    header: u32,
    length: u32,
    data: Option<Vec<u8>>,
}

impl Packet {
    /// Builds a packet, validating that `length` and `data` agree.
    pub fn new(header: u32, length: u32, data: Option<Vec<u8>>) -> Result<Self> {
        match (&data, length) {
            (Some(_), 0) => {
                return Err(ProfilingError::InvalidPacket {
                    reason: "zero length with a payload present".to_string(),
                });
            }
            (None, len) if len > 0 => {
                return Err(ProfilingError::InvalidPacket {
                    reason: format!("length {len} with no payload"),
                });
            }
            (Some(bytes), len) if bytes.len() != len as usize => {
                return Err(ProfilingError::InvalidPacket {
                    reason: format!("length {len} disagrees with payload of {}", bytes.len()),
                });
            }
            _ => {}
        }

        Ok(Self {
            header,
            length,
            data,
        })
    }

    /// Builds an empty (header-only) packet.
    pub fn empty(header: u32) -> Self {
        Self {
            header,
            length: 0,
            data: None,
        }
    }

    /// Builds a packet from an owned payload, inferring the length word.
    pub fn from_payload(header: u32, payload: Vec<u8>) -> Self {
        let length = payload.len() as u32;
        Self {
            header,
            length,
            data: (length > 0).then_some(payload),
        }
    }

    /// The raw 32-bit header word.
    pub fn header(&self) -> u32 {
        self.header
    }

    /// Payload length in bytes.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Borrowed view of the payload; empty when the packet carries none.
    pub fn data(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Whether the packet carries a payload.
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Consumes the packet, returning the owned payload bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data.unwrap_or_default()
    }

    /// Packet family, header bits `[31:26]`.
    pub fn family(&self) -> u32 {
        (self.header >> 26) & 0x3F
    }

    /// Packet id, header bits `[25:16]`.
    pub fn id(&self) -> u32 {
        (self.header >> 16) & 0x3FF
    }

    /// Packet class, header bits `[25:19]`.
    pub fn class(&self) -> u32 {
        (self.header >> 19) & 0x7F
    }

    /// Packet type, header bits `[18:16]`.
    pub fn packet_type(&self) -> u32 {
        (self.header >> 16) & 0x7
    }
}
