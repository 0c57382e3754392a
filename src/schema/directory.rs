//! The counter directory.
//!
//! Runtime components register categories, devices, counter sets and
//! counters here during initialisation; the observer addresses counters by
//! the uids allocated here when it selects them for capture. The
//! directory is internally synchronised (exclusive writes, shared reads) and
//! every mutating operation validates its arguments up front: on any rule
//! violation it fails with `InvalidArgument` and leaves the directory
//! untouched.
//!
//! # Validation rules
//!
//! One charset governs every name, description and unit string:
//! `[A-Za-z0-9_]+`, non-empty, no spaces. Cross-references must resolve: a
//! non-zero `device_uid`/`counter_set_uid` must name a registered entity,
//! and a counter's parent category must exist at registration time.
//! Category, device and counter-set names are unique per kind.
//!
//! # Multi-core counters
//!
//! A counter registered for `c` cores draws `c` contiguous uids from the
//! process-wide allocator; all of them are appended to the parent category's
//! counter list in order, each resolves through [`get_counter`], and the
//! directory's counter count reflects one entry per uid. When `cores` is not
//! given explicitly but the counter is attributed to a device, the device's
//! core count is used.
//!
//! [`get_counter`]: CounterDirectory::get_counter

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::schema::entities::{Category, Counter, CounterSet, Device};
use crate::uid;
use crate::{ProfilingError, Result};

/// Optional attributes for [`CounterDirectory::register_counter`].
///
/// Required fields are plain values; everything optional defaults to absent,
/// so call sites fill what they need:
///
/// ```
/// use periscope::schema::CounterRegistration;
///
/// let registration = CounterRegistration {
///     class: 0,
///     interpolation: 1,
///     multiplier: 1.0,
///     name: "inference_count".to_string(),
///     description: "completed_inferences".to_string(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub struct CounterRegistration {
    /// `0` = delta, `1` = absolute.
    pub class: u16,
    /// `0` = discrete, `1` = interpolated.
    pub interpolation: u16,
    /// Strictly positive, finite.
    pub multiplier: f32,
    pub name: String,
    pub description: String,
    pub units: Option<String>,
    /// Explicit per-core replication; must be greater than zero when given.
    pub cores: Option<u16>,
    /// `Some(0)` means explicitly unassociated, like `None`.
    pub device_uid: Option<u16>,
    pub counter_set_uid: Option<u16>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    categories: HashMap<String, Category>,
    devices: BTreeMap<u16, Device>,
    counter_sets: BTreeMap<u16, CounterSet>,
    counters: BTreeMap<u16, Counter>,
}

/// Directory of the counter schema, safe for concurrent registration and
/// lookup.
#[derive(Debug, Default)]
pub struct CounterDirectory {
    state: RwLock<DirectoryState>,
}

/// Uniform charset check for names, descriptions and units.
fn is_valid_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl CounterDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a category.
    ///
    /// `device_uid` and `counter_set_uid` of `0` mean "not associated";
    /// non-zero values must resolve to registered entities.
    pub fn register_category(
        &self,
        name: &str,
        device_uid: u16,
        counter_set_uid: u16,
    ) -> Result<Category> {
        let mut state = self.write();

        if !is_valid_name(name) {
            return Err(ProfilingError::invalid_argument(
                "category",
                format!("invalid name {name:?}"),
            ));
        }
        if state.categories.contains_key(name) {
            return Err(ProfilingError::invalid_argument(
                "category",
                format!("name {name:?} already registered"),
            ));
        }
        if device_uid != 0 && !state.devices.contains_key(&device_uid) {
            return Err(ProfilingError::invalid_argument(
                "category",
                format!("device uid {device_uid} does not resolve"),
            ));
        }
        if counter_set_uid != 0 && !state.counter_sets.contains_key(&counter_set_uid) {
            return Err(ProfilingError::invalid_argument(
                "category",
                format!("counter set uid {counter_set_uid} does not resolve"),
            ));
        }

        let category = Category {
            name: name.to_string(),
            counters: Vec::new(),
            device_uid,
            counter_set_uid,
        };
        state.categories.insert(name.to_string(), category.clone());
        debug!(name, device_uid, counter_set_uid, "registered category");
        Ok(category)
    }

    /// Registers a device.
    ///
    /// `cores == 0` means unspecified. When a parent category name is given
    /// it must name an existing category, which is then associated with the
    /// new device.
    pub fn register_device(
        &self,
        name: &str,
        cores: u16,
        parent_category: Option<&str>,
    ) -> Result<Device> {
        let mut state = self.write();

        if !is_valid_name(name) {
            return Err(ProfilingError::invalid_argument(
                "device",
                format!("invalid name {name:?}"),
            ));
        }
        if state.devices.values().any(|d| d.name == name) {
            return Err(ProfilingError::invalid_argument(
                "device",
                format!("name {name:?} already registered"),
            ));
        }
        if let Some(category_name) = parent_category {
            if !is_valid_name(category_name) {
                return Err(ProfilingError::invalid_argument(
                    "device",
                    format!("invalid parent category name {category_name:?}"),
                ));
            }
            if !state.categories.contains_key(category_name) {
                return Err(ProfilingError::invalid_argument(
                    "device",
                    format!("parent category {category_name:?} is not registered"),
                ));
            }
        }

        let device = Device {
            uid: uid::next_uid(),
            name: name.to_string(),
            cores,
        };
        if let Some(category_name) = parent_category {
            let category = state
                .categories
                .get_mut(category_name)
                .expect("existence checked above");
            category.device_uid = device.uid;
        }
        state.devices.insert(device.uid, device.clone());
        debug!(name, uid = device.uid, cores, "registered device");
        Ok(device)
    }

    /// Registers a counter set. Symmetric to [`register_device`].
    ///
    /// [`register_device`]: CounterDirectory::register_device
    pub fn register_counter_set(
        &self,
        name: &str,
        count: u16,
        parent_category: Option<&str>,
    ) -> Result<CounterSet> {
        let mut state = self.write();

        if !is_valid_name(name) {
            return Err(ProfilingError::invalid_argument(
                "counter set",
                format!("invalid name {name:?}"),
            ));
        }
        if state.counter_sets.values().any(|s| s.name == name) {
            return Err(ProfilingError::invalid_argument(
                "counter set",
                format!("name {name:?} already registered"),
            ));
        }
        if let Some(category_name) = parent_category {
            if !is_valid_name(category_name) {
                return Err(ProfilingError::invalid_argument(
                    "counter set",
                    format!("invalid parent category name {category_name:?}"),
                ));
            }
            if !state.categories.contains_key(category_name) {
                return Err(ProfilingError::invalid_argument(
                    "counter set",
                    format!("parent category {category_name:?} is not registered"),
                ));
            }
        }

        let counter_set = CounterSet {
            uid: uid::next_uid(),
            name: name.to_string(),
            count,
        };
        if let Some(category_name) = parent_category {
            let category = state
                .categories
                .get_mut(category_name)
                .expect("existence checked above");
            category.counter_set_uid = counter_set.uid;
        }
        state.counter_sets.insert(counter_set.uid, counter_set.clone());
        debug!(name, uid = counter_set.uid, count, "registered counter set");
        Ok(counter_set)
    }

    /// Registers a counter under an existing category.
    ///
    /// See [`CounterRegistration`] for the optional attributes. Returns the
    /// counter record, whose `uid ..= max_counter_uid` range covers one uid
    /// per core.
    pub fn register_counter(
        &self,
        parent_category: &str,
        registration: CounterRegistration,
    ) -> Result<Counter> {
        let mut state = self.write();

        if !is_valid_name(parent_category) {
            return Err(ProfilingError::invalid_argument(
                "counter",
                format!("invalid parent category name {parent_category:?}"),
            ));
        }
        if registration.class > 1 {
            return Err(ProfilingError::invalid_argument(
                "counter",
                format!("class {} out of range", registration.class),
            ));
        }
        if registration.interpolation > 1 {
            return Err(ProfilingError::invalid_argument(
                "counter",
                format!("interpolation {} out of range", registration.interpolation),
            ));
        }
        if !(registration.multiplier > 0.0 && registration.multiplier.is_finite()) {
            return Err(ProfilingError::invalid_argument(
                "counter",
                format!("multiplier {} must be positive and finite", registration.multiplier),
            ));
        }
        if !is_valid_name(&registration.name) {
            return Err(ProfilingError::invalid_argument(
                "counter",
                format!("invalid name {:?}", registration.name),
            ));
        }
        if !is_valid_name(&registration.description) {
            return Err(ProfilingError::invalid_argument(
                "counter",
                format!("invalid description {:?}", registration.description),
            ));
        }
        if let Some(units) = registration.units.as_deref() {
            if !is_valid_name(units) {
                return Err(ProfilingError::invalid_argument(
                    "counter",
                    format!("invalid units {units:?}"),
                ));
            }
        }
        if !state.categories.contains_key(parent_category) {
            return Err(ProfilingError::invalid_argument(
                "counter",
                format!("parent category {parent_category:?} is not registered"),
            ));
        }
        if let Some(cores) = registration.cores {
            if cores == 0 {
                return Err(ProfilingError::invalid_argument(
                    "counter",
                    "explicit core count must be greater than zero",
                ));
            }
        }

        let device_uid = registration.device_uid.unwrap_or(0);
        if device_uid != 0 && !state.devices.contains_key(&device_uid) {
            return Err(ProfilingError::invalid_argument(
                "counter",
                format!("device uid {device_uid} does not resolve"),
            ));
        }
        let counter_set_uid = registration.counter_set_uid.unwrap_or(0);
        if counter_set_uid != 0 && !state.counter_sets.contains_key(&counter_set_uid) {
            return Err(ProfilingError::invalid_argument(
                "counter",
                format!("counter set uid {counter_set_uid} does not resolve"),
            ));
        }

        // Explicit cores win; otherwise an attributed device replicates the
        // counter across its cores.
        let cores = registration
            .cores
            .or_else(|| (device_uid != 0).then(|| state.devices[&device_uid].cores))
            .unwrap_or(0);

        let uids = uid::next_counter_uids(cores);
        let counter = Counter {
            uid: uids[0],
            max_counter_uid: *uids.last().expect("range is never empty"),
            class: registration.class,
            interpolation: registration.interpolation,
            multiplier: registration.multiplier,
            name: registration.name,
            description: registration.description,
            units: registration.units.unwrap_or_default(),
            device_uid,
            counter_set_uid,
            parent_category: parent_category.to_string(),
        };

        let category = state
            .categories
            .get_mut(parent_category)
            .expect("existence checked above");
        category.counters.extend(&uids);
        for core_uid in &uids {
            state.counters.insert(*core_uid, counter.clone());
        }
        debug!(
            name = %counter.name,
            uid = counter.uid,
            max_uid = counter.max_counter_uid,
            category = parent_category,
            "registered counter"
        );
        Ok(counter)
    }

    /// Looks up a category by name; absent names yield `None`.
    pub fn get_category(&self, name: &str) -> Option<Category> {
        self.read().categories.get(name).cloned()
    }

    /// Looks up a device by uid.
    pub fn get_device(&self, uid: u16) -> Option<Device> {
        self.read().devices.get(&uid).cloned()
    }

    /// Looks up a counter set by uid.
    pub fn get_counter_set(&self, uid: u16) -> Option<CounterSet> {
        self.read().counter_sets.get(&uid).cloned()
    }

    /// Looks up a counter by any uid in its per-core range.
    pub fn get_counter(&self, uid: u16) -> Option<Counter> {
        self.read().counters.get(&uid).cloned()
    }

    pub fn category_count(&self) -> usize {
        self.read().categories.len()
    }

    pub fn device_count(&self) -> usize {
        self.read().devices.len()
    }

    pub fn counter_set_count(&self) -> usize {
        self.read().counter_sets.len()
    }

    /// Number of counter uids (multi-core counters count once per core).
    pub fn counter_count(&self) -> usize {
        self.read().counters.len()
    }

    /// All registered counter uids in ascending order.
    pub fn counter_uids(&self) -> Vec<u16> {
        self.read().counters.keys().copied().collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, DirectoryState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, DirectoryState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn valid_counter() -> CounterRegistration {
        CounterRegistration {
            class: 0,
            interpolation: 1,
            multiplier: 123.45,
            name: "valid_name".to_string(),
            description: "valid_description".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_directory_has_no_entities() {
        let directory = CounterDirectory::new();
        assert_eq!(directory.category_count(), 0);
        assert_eq!(directory.device_count(), 0);
        assert_eq!(directory.counter_set_count(), 0);
        assert_eq!(directory.counter_count(), 0);
    }

    #[test]
    fn category_registration_and_lookup() {
        let directory = CounterDirectory::new();

        // Bad names are rejected without mutating the directory.
        assert!(directory.register_category("", 0, 0).is_err());
        assert!(directory.register_category("invalid category", 0, 0).is_err());
        assert_eq!(directory.category_count(), 0);

        let category = directory
            .register_category("some_category", 0, 0)
            .expect("valid category");
        assert_eq!(directory.category_count(), 1);
        assert_eq!(category.name, "some_category");
        assert!(category.counters.is_empty());
        assert_eq!(category.device_uid, 0);
        assert_eq!(category.counter_set_uid, 0);

        let found = directory.get_category("some_category").expect("registered");
        assert_eq!(found, category);
        assert!(directory.get_category("not_registered_category").is_none());

        // Duplicate names are rejected.
        assert!(matches!(
            directory.register_category("some_category", 0, 0),
            Err(ProfilingError::InvalidArgument { .. })
        ));
        assert_eq!(directory.category_count(), 1);
    }

    #[test]
    fn category_cross_references_must_resolve() {
        let directory = CounterDirectory::new();
        let device = directory
            .register_device("some_device", 0, None)
            .expect("valid device");
        let counter_set = directory
            .register_counter_set("some_counter_set", 0, None)
            .expect("valid counter set");

        // Unresolvable uids fail atomically.
        assert!(directory
            .register_category("with_bad_device", device.uid + 10, 0)
            .is_err());
        assert!(directory
            .register_category("with_bad_set", 0, counter_set.uid + 10)
            .is_err());
        assert_eq!(directory.category_count(), 0);

        let linked = directory
            .register_category("linked", device.uid, counter_set.uid)
            .expect("both uids resolve");
        assert_eq!(linked.device_uid, device.uid);
        assert_eq!(linked.counter_set_uid, counter_set.uid);
    }

    #[test]
    fn device_registration_updates_parent_category() {
        let directory = CounterDirectory::new();

        assert!(directory.register_device("", 0, None).is_err());
        assert!(directory.register_device("inv@lid nam", 0, None).is_err());
        assert_eq!(directory.device_count(), 0);

        let device = directory
            .register_device("some_device", 0, None)
            .expect("valid device");
        assert!(device.uid >= 1);
        assert_eq!(device.cores, 0);
        assert_eq!(directory.get_device(device.uid), Some(device.clone()));

        // Duplicate device names are rejected.
        assert!(directory.register_device("some_device", 2, None).is_err());

        // Parent category must be a valid, registered name.
        assert!(directory
            .register_device("with_parent", 3, Some(""))
            .is_err());
        assert!(directory
            .register_device("with_parent", 3, Some("missing_category"))
            .is_err());
        assert_eq!(directory.device_count(), 1);

        directory
            .register_category("some_category", 0, 0)
            .expect("valid category");
        let attached = directory
            .register_device("with_parent", 4, Some("some_category"))
            .expect("parent exists");
        assert!(attached.uid > device.uid);
        assert_eq!(attached.cores, 4);
        assert_eq!(
            directory.get_category("some_category").unwrap().device_uid,
            attached.uid
        );
    }

    #[test]
    fn counter_set_registration_updates_parent_category() {
        let directory = CounterDirectory::new();

        assert!(directory.register_counter_set("invalid name", 0, None).is_err());

        let counter_set = directory
            .register_counter_set("some_counter_set", 37, None)
            .expect("valid counter set");
        assert_eq!(counter_set.count, 37);
        assert_eq!(
            directory.get_counter_set(counter_set.uid),
            Some(counter_set.clone())
        );

        assert!(directory
            .register_counter_set("another", 42, Some("missing_category"))
            .is_err());

        directory
            .register_category("some_category", 0, 0)
            .expect("valid category");
        let attached = directory
            .register_counter_set("another", 42, Some("some_category"))
            .expect("parent exists");
        assert_eq!(
            directory
                .get_category("some_category")
                .unwrap()
                .counter_set_uid,
            attached.uid
        );
    }

    #[test]
    fn counter_rejection_matrix_leaves_count_unchanged() {
        let directory = CounterDirectory::new();
        directory
            .register_category("valid_parent_category", 0, 0)
            .expect("valid category");

        let rejected: Vec<(&str, CounterRegistration)> = vec![
            ("empty parent", valid_counter()),
            ("missing parent", valid_counter()),
            (
                "class out of range",
                CounterRegistration {
                    class: 2,
                    ..valid_counter()
                },
            ),
            (
                "interpolation out of range",
                CounterRegistration {
                    interpolation: 3,
                    ..valid_counter()
                },
            ),
            (
                "zero multiplier",
                CounterRegistration {
                    multiplier: 0.0,
                    ..valid_counter()
                },
            ),
            (
                "empty name",
                CounterRegistration {
                    name: String::new(),
                    ..valid_counter()
                },
            ),
            (
                "charset-invalid name",
                CounterRegistration {
                    name: "inv@lid nam€".to_string(),
                    ..valid_counter()
                },
            ),
            (
                "empty description",
                CounterRegistration {
                    description: String::new(),
                    ..valid_counter()
                },
            ),
            (
                "charset-invalid description",
                CounterRegistration {
                    description: "inv@lid description".to_string(),
                    ..valid_counter()
                },
            ),
            (
                "charset-invalid units",
                CounterRegistration {
                    units: Some("Mb/s2".to_string()),
                    ..valid_counter()
                },
            ),
            (
                "unregistered device",
                CounterRegistration {
                    device_uid: Some(100),
                    ..valid_counter()
                },
            ),
            (
                "unregistered counter set",
                CounterRegistration {
                    counter_set_uid: Some(100),
                    ..valid_counter()
                },
            ),
            (
                "zero cores",
                CounterRegistration {
                    cores: Some(0),
                    ..valid_counter()
                },
            ),
        ];

        for (case, registration) in rejected {
            let parent = match case {
                "empty parent" => "",
                "missing parent" => "invalid_parent_category",
                _ => "valid_parent_category",
            };
            let result = directory.register_counter(parent, registration);
            assert!(
                matches!(result, Err(ProfilingError::InvalidArgument { .. })),
                "case {case:?} should be rejected"
            );
            assert_eq!(directory.counter_count(), 0, "case {case:?} mutated state");
        }
    }

    #[test]
    fn counter_registration_appends_to_parent_category() {
        let directory = CounterDirectory::new();
        directory
            .register_category("some_category", 0, 0)
            .expect("valid category");

        let counter = directory
            .register_counter("some_category", valid_counter())
            .expect("valid counter");
        assert_eq!(directory.counter_count(), 1);
        assert_eq!(counter.max_counter_uid, counter.uid);
        assert_eq!(counter.class, 0);
        assert_eq!(counter.interpolation, 1);
        assert_eq!(counter.multiplier, 123.45);
        assert_eq!(counter.units, "");
        assert_eq!(counter.device_uid, 0);
        assert_eq!(counter.counter_set_uid, 0);
        assert_eq!(counter.parent_category, "some_category");

        let with_units = directory
            .register_counter(
                "some_category",
                CounterRegistration {
                    name: "second_counter".to_string(),
                    units: Some("Mnnsq2".to_string()),
                    ..valid_counter()
                },
            )
            .expect("valid counter");
        assert!(with_units.uid > counter.uid);
        assert_eq!(with_units.units, "Mnnsq2");

        let category = directory.get_category("some_category").unwrap();
        assert_eq!(category.counters, vec![counter.uid, with_units.uid]);
    }

    #[test]
    fn multi_core_counter_occupies_a_contiguous_range() {
        let directory = CounterDirectory::new();
        directory
            .register_category("some_category", 0, 0)
            .expect("valid category");

        let cores = 15u16;
        let counter = directory
            .register_counter(
                "some_category",
                CounterRegistration {
                    cores: Some(cores),
                    ..valid_counter()
                },
            )
            .expect("valid counter");

        assert_eq!(directory.counter_count(), cores as usize);
        assert_eq!(counter.max_counter_uid, counter.uid + cores - 1);
        assert_eq!(counter.core_count(), cores);

        let category = directory.get_category("some_category").unwrap();
        assert_eq!(category.counters.len(), cores as usize);
        for (i, uid) in category.counters.iter().enumerate() {
            assert_eq!(*uid, counter.uid + i as u16);
        }

        // Every uid in the range resolves to the same counter record, and
        // the record knows which category owns it.
        for uid in counter.uid..=counter.max_counter_uid {
            let resolved = directory.get_counter(uid).unwrap();
            assert_eq!(resolved.uid, counter.uid);
            assert_eq!(resolved.parent_category, "some_category");
        }
    }

    #[test]
    fn device_attribution_implies_core_replication() {
        let directory = CounterDirectory::new();
        directory
            .register_category("some_category", 0, 0)
            .expect("valid category");
        let device = directory
            .register_device("some_multi_core_device", 4, None)
            .expect("valid device");

        let counter = directory
            .register_counter(
                "some_category",
                CounterRegistration {
                    device_uid: Some(device.uid),
                    ..valid_counter()
                },
            )
            .expect("valid counter");

        assert_eq!(directory.counter_count(), 4);
        assert_eq!(counter.max_counter_uid, counter.uid + 3);
        assert_eq!(counter.device_uid, device.uid);

        let tail: Vec<u16> = directory
            .get_category("some_category")
            .unwrap()
            .counters
            .iter()
            .rev()
            .take(4)
            .rev()
            .copied()
            .collect();
        assert_eq!(
            tail,
            (counter.uid..=counter.max_counter_uid).collect::<Vec<u16>>()
        );
    }

    #[test]
    fn counter_with_device_and_counter_set() {
        let directory = CounterDirectory::new();
        directory
            .register_category("some_category", 0, 0)
            .expect("valid category");
        let device = directory
            .register_device("some_device", 0, None)
            .expect("valid device");
        let counter_set = directory
            .register_counter_set("some_counter_set", 0, None)
            .expect("valid counter set");

        let counter = directory
            .register_counter(
                "some_category",
                CounterRegistration {
                    class: 1,
                    interpolation: 0,
                    multiplier: 0.00043,
                    device_uid: Some(device.uid),
                    counter_set_uid: Some(counter_set.uid),
                    ..valid_counter()
                },
            )
            .expect("valid counter");

        assert_eq!(counter.class, 1);
        assert_eq!(counter.interpolation, 0);
        assert_eq!(counter.device_uid, device.uid);
        assert_eq!(counter.counter_set_uid, counter_set.uid);
    }

    #[test]
    fn concurrent_registration_is_linearisable() {
        use std::sync::Arc;
        use std::thread;

        let directory = Arc::new(CounterDirectory::new());
        directory
            .register_category("shared_category", 0, 0)
            .expect("valid category");

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let directory = Arc::clone(&directory);
                thread::spawn(move || {
                    for i in 0..25 {
                        directory
                            .register_counter(
                                "shared_category",
                                CounterRegistration {
                                    name: format!("counter_{worker}_{i}"),
                                    ..valid_counter()
                                },
                            )
                            .expect("valid counter");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("registration thread panicked");
        }

        assert_eq!(directory.counter_count(), 200);
        assert_eq!(directory.counter_uids().len(), 200);
        let category = directory.get_category("shared_category").unwrap();
        assert_eq!(category.counters.len(), 200);
        // Every appended uid resolves.
        for uid in &category.counters {
            assert!(directory.get_counter(*uid).is_some());
        }
    }

    proptest! {
        #[test]
        fn charset_accepts_exactly_word_characters(name in "[A-Za-z0-9_]{1,24}") {
            prop_assert!(is_valid_name(&name));
        }

        #[test]
        fn charset_rejects_anything_else(name in "[ -~]*[^A-Za-z0-9_]+[ -~]*") {
            prop_assert!(!is_valid_name(&name));
        }

        #[test]
        fn rejected_multipliers_never_register(multiplier in prop::sample::select(
            vec![0.0f32, -1.5, f32::NAN, f32::INFINITY, f32::NEG_INFINITY]
        )) {
            let directory = CounterDirectory::new();
            directory.register_category("cat", 0, 0).unwrap();
            let result = directory.register_counter(
                "cat",
                CounterRegistration { multiplier, ..valid_counter() },
            );
            prop_assert!(result.is_err());
            prop_assert_eq!(directory.counter_count(), 0);
        }
    }
}
