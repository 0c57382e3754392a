//! Byte-level wire handling: little-endian field codecs, the bounded send
//! buffer drained by the transport, and the outbound packet encoder.

pub mod buffer;
pub mod bytes;
pub mod encoder;

pub use buffer::{PacketBuffer, Reservation};
pub use encoder::PacketEncoder;
