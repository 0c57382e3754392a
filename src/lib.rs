//! External profiling subsystem for inference runtimes.
//!
//! Periscope exposes a runtime's counters (timings, event counts, per-core
//! metrics) and a session lifecycle to an external observer process over a
//! streaming byte channel, using a fixed wire protocol.
//!
//! # Features
//!
//! - **Counter directory**: a validated schema of categories, devices,
//!   counter sets and counters with cross-referential integrity
//! - **Session state machine**: strict legal transitions, safe under
//!   concurrent access
//! - **Command dispatch**: versioned packet ids routed to handlers,
//!   including periodic capture selection
//! - **Non-stalling**: a full send buffer drops frames instead of blocking
//!   the host runtime
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use periscope::schema::CounterRegistration;
//! use periscope::{CommandLoop, ConnectionFactory, ProfilingOptions, ProfilingService};
//! use std::sync::Arc;
//!
//! fn start(factory: Box<dyn ConnectionFactory>) -> periscope::Result<()> {
//!     let options = ProfilingOptions {
//!         enable_profiling: true,
//!         ..Default::default()
//!     };
//!     let service = Arc::new(ProfilingService::new(options, factory));
//!
//!     service.register_category("inference", 0, 0)?;
//!     let counter = service.register_counter(
//!         "inference",
//!         CounterRegistration {
//!             class: 0,
//!             interpolation: 1,
//!             multiplier: 1.0,
//!             name: "completed_inferences".to_string(),
//!             description: "inferences_run_to_completion".to_string(),
//!             ..Default::default()
//!         },
//!     )?;
//!
//!     let _ingress = CommandLoop::spawn(Arc::clone(&service));
//!     loop {
//!         service.run();
//!         service.values().increment(counter.uid, 1);
//!         std::thread::sleep(std::time::Duration::from_millis(100));
//!     }
//! }
//! ```

// Cross-cutting concerns
mod capture;
mod config;
mod connection;
mod error;
mod service;
mod uid;
mod values;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;

// Subsystems
pub mod command;
pub mod schema;
pub mod session;
pub mod types;
pub mod wire;

// Core exports
pub use capture::{CaptureThread, PeriodicCounterCapture};
pub use config::ProfilingOptions;
pub use connection::{ConnectionFactory, ProfilingConnection};
pub use error::{ProfilingError, Result};
pub use service::{CommandLoop, ProfilingService};
pub use uid::{next_counter_uids, next_uid};
pub use values::{CounterValueReader, CounterValues};

// Subsystem exports
pub use command::{CommandHandler, CommandHandlerKey, CommandHandlerRegistry};
pub use schema::{Category, Counter, CounterDirectory, CounterRegistration, CounterSet, Device};
pub use session::{CaptureHolder, ProfilingState, ProfilingStateMachine};
pub use types::{CaptureData, Packet, Version};
pub use wire::{PacketBuffer, PacketEncoder};
