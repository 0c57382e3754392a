//! Process-wide uid allocation for profiling objects.
//!
//! A single monotonic sequence serves every schema entity (devices, counter
//! sets, counters). `0` is reserved to mean "no parent / not associated" and
//! is never returned. Multi-core counters draw a contiguous range from the
//! same sequence so per-core uids stay adjacent on the wire.

use std::sync::atomic::{AtomicU16, Ordering};

static NEXT_UID: AtomicU16 = AtomicU16::new(1);

/// Reserves `count` consecutive uids and returns the first one.
///
/// # Panics
///
/// Panics when the 16-bit uid space is exhausted. Registration happens a
/// bounded number of times during runtime initialisation; running out is a
/// setup programming error, not a recoverable condition.
fn reserve(count: u16) -> u16 {
    NEXT_UID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
            current.checked_add(count)
        })
        .unwrap_or_else(|_| panic!("profiling uid space exhausted (16-bit)"))
}

/// Returns the next object uid. Strictly increasing, never `0`.
pub fn next_uid() -> u16 {
    reserve(1)
}

/// Returns `max(cores, 1)` contiguous uids for a counter.
///
/// The first element is the counter's uid and the last is
/// `first + len - 1`. `cores == 0` still consumes and returns a single uid,
/// so single-core and unspecified-core counters are handled uniformly.
pub fn next_counter_uids(cores: u16) -> Vec<u16> {
    let count = cores.max(1);
    let first = reserve(count);
    (first..first + count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn uids_are_nonzero_and_increasing() {
        let uid = next_uid();
        assert!(uid >= 1);

        let next = next_uid();
        assert!(next > uid);
    }

    #[test]
    fn zero_cores_yields_a_single_uid() {
        let uids = next_counter_uids(0);
        assert_eq!(uids.len(), 1);
        assert!(uids[0] >= 1);

        let more = next_counter_uids(1);
        assert_eq!(more.len(), 1);
        assert!(more[0] > uids[0]);
    }

    #[test]
    fn multi_core_range_is_contiguous() {
        let before = next_uid();

        let cores = 13;
        let uids = next_counter_uids(cores);
        assert_eq!(uids.len(), cores as usize);
        assert!(uids[0] > before);
        for window in uids.windows(2) {
            assert_eq!(window[1], window[0] + 1);
        }
        assert_eq!(*uids.last().unwrap(), uids[0] + cores - 1);

        // The shared sequence continues past the reserved range.
        assert!(next_uid() > *uids.last().unwrap());
    }

    #[test]
    fn concurrent_allocation_never_overlaps() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                thread::spawn(|| {
                    let mut seen = Vec::new();
                    for _ in 0..50 {
                        seen.push(next_uid());
                    }
                    seen.extend(next_counter_uids(4));
                    seen
                })
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            for uid in handle.join().expect("allocator thread panicked") {
                assert!(uid >= 1);
                assert!(all.insert(uid), "uid {uid} allocated twice");
            }
        }
    }
}
