//! Profiling session state machine.
//!
//! The session advances through four phases. Only these edges are legal
//! (every state may also re-enter itself):
//!
//! ```text
//! Uninitialised -> NotConnected -> WaitingForAck -> Active
//!                       ^                             |
//!                       +-----------------------------+
//! ```
//!
//! Note the asymmetry: `Active` may retrogress to `NotConnected` when the
//! connection drops, but `WaitingForAck` may not: an acknowledgement may
//! still be in flight. Any other edge fails with `InvalidStateTransition`
//! and leaves the current state unchanged.
//!
//! The state lives in a single atomic; transitions are compare-and-set with
//! the legality table consulted against the observed current state, so
//! concurrent writers serialise and the visible state is always reachable by
//! some interleaving of them.

use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;

use crate::{ProfilingError, Result};

/// Phase of the profiling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum ProfilingState {
    /// Profiling disabled; nothing runs.
    Uninitialised = 0,
    /// Enabled but no observer connection.
    NotConnected = 1,
    /// Connected; waiting for the observer to acknowledge the session.
    WaitingForAck = 2,
    /// Session acknowledged; capture may flow.
    Active = 3,
}

impl ProfilingState {
    fn from_tag(tag: u8) -> Self {
        match tag {
            0 => ProfilingState::Uninitialised,
            1 => ProfilingState::NotConnected,
            2 => ProfilingState::WaitingForAck,
            3 => ProfilingState::Active,
            // Only values stored through this enum ever reach the atomic.
            _ => unreachable!("corrupt profiling state tag {tag}"),
        }
    }
}

fn is_legal(from: ProfilingState, to: ProfilingState) -> bool {
    use ProfilingState::*;
    matches!(
        (from, to),
        (Uninitialised, Uninitialised)
            | (Uninitialised, NotConnected)
            | (NotConnected, NotConnected)
            | (NotConnected, WaitingForAck)
            | (WaitingForAck, WaitingForAck)
            | (WaitingForAck, Active)
            | (Active, Active)
            | (Active, NotConnected)
    )
}

/// Thread-safe holder of the current session phase.
#[derive(Debug)]
pub struct ProfilingStateMachine {
    state: AtomicU8,
}

impl ProfilingStateMachine {
    pub fn new(initial: ProfilingState) -> Self {
        Self {
            state: AtomicU8::new(initial as u8),
        }
    }

    /// The current phase. Pure read; safe from any thread.
    pub fn current_state(&self) -> ProfilingState {
        ProfilingState::from_tag(self.state.load(Ordering::Acquire))
    }

    /// Attempts the transition to `next`.
    ///
    /// Fails with `InvalidStateTransition` if the edge is illegal from the
    /// state observed at that instant, leaving the state unchanged. Racing
    /// writers retry against each other's results, so the machine only ever
    /// holds legally-reachable states.
    pub fn transition_to(&self, next: ProfilingState) -> Result<()> {
        let mut current = self.current_state();
        loop {
            if !is_legal(current, next) {
                return Err(ProfilingError::InvalidStateTransition {
                    from: current,
                    to: next,
                });
            }
            match self.state.compare_exchange(
                current as u8,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                // Another writer moved the state; re-check legality from
                // what they left behind.
                Err(observed) => current = ProfilingState::from_tag(observed),
            }
        }
    }
}
