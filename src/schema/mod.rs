//! Counter schema: the directory of categories, devices, counter sets and
//! counters advertised to the external observer.
//!
//! Entities cross-reference each other by uid rather than by pointer, which
//! keeps the directory a flat set of `uid -> entity` maps plus a
//! `name -> entity` index and avoids cyclic ownership between categories and
//! their counters.

mod directory;
mod entities;

pub use directory::{CounterDirectory, CounterRegistration};
pub use entities::{Category, Counter, CounterSet, Device};
