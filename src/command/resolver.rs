//! Packet-version resolution.

use crate::types::Version;

/// Maps a packet id to the protocol version supported for it.
///
/// In this revision every id resolves to `1.0.0`; the indirection exists so
/// future packet ids can advertise different versions without churning the
/// handler registry. Callers may rely on the constant without going through
/// [`resolve`].
///
/// [`resolve`]: PacketVersionResolver::resolve
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketVersionResolver;

impl PacketVersionResolver {
    pub fn new() -> Self {
        Self
    }

    /// The supported version for `packet_id`.
    pub fn resolve(&self, packet_id: u32) -> Version {
        let _ = packet_id;
        Version::new(1, 0, 0)
    }
}
