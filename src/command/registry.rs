//! Handler registry.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::command::key::CommandHandlerKey;
use crate::types::Packet;
use crate::{ProfilingError, Result};

/// Capability implemented by every inbound packet handler.
///
/// Handlers may run concurrently when packets arrive on distinct ingress
/// threads, so implementations synchronise any state they own.
pub trait CommandHandler: Send + Sync {
    fn invoke(&self, packet: &Packet) -> Result<()>;
}

/// Maps `(packet id, version)` keys to handlers.
///
/// In the expected use the registry is populated at startup and immutable
/// afterwards; mutation while dispatching is still legal because reads and
/// writes share the lock. Iteration over [`keys`] is key-sorted.
///
/// [`keys`]: CommandHandlerRegistry::keys
#[derive(Default)]
pub struct CommandHandlerRegistry {
    handlers: RwLock<BTreeMap<CommandHandlerKey, Arc<dyn CommandHandler>>>,
}

impl CommandHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler, replacing any existing handler for the key.
    pub fn register(&self, handler: Arc<dyn CommandHandler>, packet_id: u32, version: u32) {
        let key = CommandHandlerKey::new(packet_id, version);
        self.handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, handler);
    }

    /// Looks up the handler for `(packet_id, version)`.
    pub fn get(&self, packet_id: u32, version: u32) -> Result<Arc<dyn CommandHandler>> {
        let key = CommandHandlerKey::new(packet_id, version);
        self.handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned()
            .ok_or(ProfilingError::HandlerNotFound { packet_id, version })
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> Vec<CommandHandlerKey> {
        self.handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
