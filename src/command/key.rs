//! Registry key for command handlers.

/// `(packet id, version)` key, ordered lexicographically by packet id then
/// version.
///
/// The derived `Ord` gives exactly that order because of field declaration
/// order; the registry relies on it for sorted iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandHandlerKey {
    packet_id: u32,
    version: u32,
}

impl CommandHandlerKey {
    pub fn new(packet_id: u32, version: u32) -> Self {
        Self { packet_id, version }
    }

    pub fn packet_id(&self) -> u32 {
        self.packet_id
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}
