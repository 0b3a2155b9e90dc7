//! Test fixtures for Oly development.
//!
//! Provides [`sample_world`], a deterministic store exercising every
//! facet, and [`TestWorldBuilder`] for building small ad hoc stores.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{id, sample_world, SampleWorld, SAMPLE_SEED};

use oly_core::{EntityId, Kind, SubKind};
use oly_store::{Store, StoreConfig};

/// Builder for small stores with named entities at chosen ids.
///
/// ```
/// use oly_core::{Kind, SubKind};
/// use oly_test_utils::{id, TestWorldBuilder};
///
/// let store = TestWorldBuilder::new()
///     .entity(10101, Kind::Location, SubKind::Forest, "Forest")
///     .entity(5001, Kind::Character, SubKind::None, "Osswid")
///     .build();
/// assert_eq!(store.get(id(5001)).unwrap().name(), "Osswid");
/// ```
pub struct TestWorldBuilder {
    config: StoreConfig,
    entities: Vec<(EntityId, Kind, SubKind, String)>,
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
            entities: Vec::new(),
        }
    }

    /// Use `seed` for the store's allocator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Add an entity at a fixed id.
    pub fn entity(mut self, raw: u32, kind: Kind, sub_kind: SubKind, name: &str) -> Self {
        self.entities.push((id(raw), kind, sub_kind, name.to_string()));
        self
    }

    /// Build the store.
    ///
    /// # Panics
    ///
    /// If the same id was added twice.
    pub fn build(self) -> Store {
        let mut store = Store::new(self.config);
        for (at, kind, sub_kind, name) in self.entities {
            store
                .allocate_at(at, kind, sub_kind)
                .unwrap_or_else(|e| panic!("allocate_at({at}): {e}"));
            if let Some(record) = store.get_mut(at) {
                record.set_name(&name);
            }
        }
        store
    }
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}
