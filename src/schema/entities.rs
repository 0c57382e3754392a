//! Schema entity records.
//!
//! All four records are plain values: the directory hands out snapshot
//! clones, never references into its own storage. A `device_uid` or
//! `counter_set_uid` of `0` means "not associated".

use serde::Serialize;

/// A named grouping of counters, optionally tied to a device and a counter
/// set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    /// Uids of the counters registered under this category, in registration
    /// order; multi-core counters contribute one uid per core.
    pub counters: Vec<u16>,
    pub device_uid: u16,
    pub counter_set_uid: u16,
}

/// A hardware device counters can be attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub uid: u16,
    pub name: String,
    /// Number of cores; `0` means unspecified.
    pub cores: u16,
}

/// A named set grouping related counters for the observer UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterSet {
    pub uid: u16,
    pub name: String,
    pub count: u16,
}

/// A single counter definition.
///
/// A counter registered for `c` cores owns the contiguous uid range
/// `uid ..= max_counter_uid` with `max_counter_uid = uid + c - 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Counter {
    pub uid: u16,
    pub max_counter_uid: u16,
    /// `0` = delta, `1` = absolute.
    pub class: u16,
    /// `0` = discrete, `1` = interpolated.
    pub interpolation: u16,
    /// Scale applied by the observer; strictly positive and finite.
    pub multiplier: f32,
    pub name: String,
    pub description: String,
    /// Empty when the counter is unitless.
    pub units: String,
    pub device_uid: u16,
    pub counter_set_uid: u16,
    /// Name of the category the counter was registered under.
    pub parent_category: String,
}

impl Counter {
    /// Number of per-core uids this counter occupies.
    pub fn core_count(&self) -> u16 {
        self.max_counter_uid - self.uid + 1
    }
}
