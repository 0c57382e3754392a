//! Session lifecycle: the profiling state machine and the capture-selection
//! holder shared between the command thread and the capture thread.

mod holder;
mod state;

pub use holder::CaptureHolder;
pub use state::{ProfilingState, ProfilingStateMachine};
