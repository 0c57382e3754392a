//! Protocol version packing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `(major, minor, patch)` triple packed into a 32-bit field.
///
/// Layout: `(major << 22) | (minor << 12) | patch` with 10 bits of major,
/// 10 bits of minor and 12 bits of patch. Equality is bitwise on the
/// encoded form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    encoded: u32,
}

const MAJOR_SHIFT: u32 = 22;
const MINOR_SHIFT: u32 = 12;
const MAJOR_MASK: u32 = 0x3FF;
const MINOR_MASK: u32 = 0x3FF;
const PATCH_MASK: u32 = 0xFFF;

impl Version {
    /// Packs a triple. Out-of-range fields are masked to their bit widths.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            encoded: ((major & MAJOR_MASK) << MAJOR_SHIFT)
                | ((minor & MINOR_MASK) << MINOR_SHIFT)
                | (patch & PATCH_MASK),
        }
    }

    /// Wraps an already-encoded 32-bit value.
    pub const fn from_encoded(encoded: u32) -> Self {
        Self { encoded }
    }

    pub fn major(&self) -> u32 {
        (self.encoded >> MAJOR_SHIFT) & MAJOR_MASK
    }

    pub fn minor(&self) -> u32 {
        (self.encoded >> MINOR_SHIFT) & MINOR_MASK
    }

    pub fn patch(&self) -> u32 {
        self.encoded & PATCH_MASK
    }

    /// The packed 32-bit representation.
    pub fn encoded(&self) -> u32 {
        self.encoded
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}
