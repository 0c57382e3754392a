//! Transport seam between the service and the external observer.
//!
//! The real socket lives outside this crate; the service only assumes a
//! framed byte channel. Implementations handle their own timing and
//! interior synchronisation: the ingress thread reads and flushes writes,
//! while the driver writes only the connect-time handshake.

use std::time::Duration;

use crate::types::Packet;
use crate::Result;

/// A live, framed channel to the observer.
pub trait ProfilingConnection: Send + Sync {
    /// Whether the channel is still usable. A `false` here drives the
    /// service's `Active -> NotConnected` retrogression on its next run.
    fn is_open(&self) -> bool;

    /// Writes already-framed outbound bytes.
    fn write(&self, data: &[u8]) -> Result<()>;

    /// Reads the next inbound packet.
    ///
    /// Returns:
    /// - `Ok(Some(packet))` - a complete frame arrived
    /// - `Ok(None)` - nothing within `timeout`
    /// - `Err(e)` - the channel failed
    fn read_packet(&self, timeout: Duration) -> Result<Option<Packet>>;
}

/// Creates connections on demand for the service driver.
pub trait ConnectionFactory: Send + Sync {
    fn connect(&self) -> Result<Box<dyn ProfilingConnection>>;
}

impl<C: ProfilingConnection + ?Sized> ProfilingConnection for std::sync::Arc<C> {
    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn write(&self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn read_packet(&self, timeout: Duration) -> Result<Option<Packet>> {
        (**self).read_packet(timeout)
    }
}
