//! Oly: world-state store for a play-by-mail fantasy strategy game.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Oly sub-crates and adds [`World`], a store bound to its save
//! directory.
//!
//! # Quick start
//!
//! ```rust
//! use oly::prelude::*;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut world = World::create(dir.path(), StoreConfig::default());
//!
//! let forest = world.store_mut().allocate(Kind::Location, SubKind::Forest).unwrap();
//! let noble = world.store_mut().allocate(Kind::Character, SubKind::None).unwrap();
//! let record = world.store_mut().record_mut(noble).unwrap();
//! record.set_name("Osswid");
//! record.character_mut().location = Some(forest);
//! world.save().unwrap();
//!
//! let (reopened, report) = World::open(dir.path(), StoreConfig::default()).unwrap();
//! assert!(report.is_clean());
//! let ch = reopened.store().record(noble).unwrap().character().unwrap();
//! assert_eq!(ch.location, Some(forest));
//! assert_eq!(display_name("Osswid", noble), format!("Osswid [{}]", encode(noble)));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `oly-core` | Entity ids, the id codec, kinds and sub-kinds |
//! | [`store`] | `oly-store` | Entity arena, allocator, type indices, facets |
//! | [`persist`] | `oly-persist` | Text save format and master index |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use tracing::info;

/// Entity ids, codec and kinds (`oly-core`).
pub use oly_core as types;

/// Entity arena, allocator and type indices (`oly-store`).
pub use oly_store as store;

/// Text save format and master index (`oly-persist`).
pub use oly_persist as persist;

use oly_persist::{LoadReport, PersistConfig, PersistError, SaveReport};
use oly_store::{Store, StoreConfig};

/// A [`Store`] together with the directory it is saved to.
pub struct World {
    store: Store,
    dir: PathBuf,
    persist: PersistConfig,
}

impl World {
    /// An empty world that will save to `dir`. Nothing is written until
    /// [`save`](Self::save).
    pub fn create(dir: impl Into<PathBuf>, config: StoreConfig) -> Self {
        Self {
            store: Store::new(config),
            dir: dir.into(),
            persist: PersistConfig::default(),
        }
    }

    /// Load the world saved in `dir`.
    ///
    /// # Errors
    ///
    /// Any fatal [`PersistError`]. Tolerated problems are in the report.
    pub fn open(
        dir: impl Into<PathBuf>,
        config: StoreConfig,
    ) -> Result<(Self, LoadReport), PersistError> {
        let mut world = Self::create(dir, config);
        let report = oly_persist::load(&mut world.store, &world.dir)?;
        info!(
            dir = %world.dir.display(),
            entities = world.store.len(),
            warnings = report.warnings.len(),
            "world opened"
        );
        Ok((world, report))
    }

    /// Replace the save options.
    #[must_use]
    pub fn with_persist_config(mut self, persist: PersistConfig) -> Self {
        self.persist = persist;
        self
    }

    /// Save the store to the world's directory.
    pub fn save(&self) -> Result<SaveReport, PersistError> {
        oly_persist::save_with(&self.store, &self.dir, &self.persist)
    }

    /// Discard in-memory state and load the directory again.
    ///
    /// On error the store is left empty.
    pub fn reload(&mut self) -> Result<LoadReport, PersistError> {
        self.store.clear();
        oly_persist::load(&mut self.store, &self.dir)
    }

    /// The save directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The store, mutably.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Unbind the store from its directory.
    pub fn into_store(self) -> Store {
        self.store
    }
}

/// Common imports for typical Oly usage.
///
/// ```rust
/// use oly::prelude::*;
/// ```
pub mod prelude {
    // Ids and kinds
    pub use oly_core::{decode, display_name, encode, EntityId, IdRange, Kind, SubKind};

    // Store
    pub use oly_store::{EntityRecord, Facet, IdSet, Store, StoreConfig, StoreError};

    // Persistence
    pub use oly_persist::{LoadReport, PersistConfig, PersistError, SaveReport};

    // Facade
    pub use crate::World;
}
