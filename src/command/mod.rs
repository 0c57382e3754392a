//! Inbound command dispatch: versioned packet ids routed to handlers.
//!
//! The ingress thread frames bytes into [`Packet`]s, resolves the supported
//! version for the packet id, and looks the `(id, version)` key up in the
//! [`CommandHandlerRegistry`]. Handlers are plain capabilities (anything
//! implementing [`CommandHandler`]) and own whatever state they mutate.
//!
//! [`Packet`]: crate::types::Packet

mod ack;
mod key;
mod registry;
mod resolver;
mod selection;

pub use ack::ConnectionAckHandler;
pub use key::CommandHandlerKey;
pub use registry::{CommandHandler, CommandHandlerRegistry};
pub use resolver::PacketVersionResolver;
pub use selection::PeriodicCounterSelectionHandler;

/// Packet id of the connection-acknowledged packet (family 0).
pub const CONNECTION_ACK_PACKET_ID: u32 = 1;

/// Packet id of the periodic-counter selection packet (family 0).
///
/// On the wire this is the header word `0x0004_0000`: family 0, id 4.
pub const PERIODIC_COUNTER_SELECTION_PACKET_ID: u32 = 4;

/// Command version in force for a profiling session.
///
/// The packet-version resolver advertises `1.0.0` for every id in this
/// protocol revision; registry keys carry the major number.
pub const COMMAND_VERSION: u32 = 1;
