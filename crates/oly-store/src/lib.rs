//! Entity arena, allocator and type indices for the Oly world store.
//!
//! # Architecture
//!
//! ```text
//! Store
//! ├── slots: Vec<Option<Box<EntityRecord>>>   (one per id, 0..=102,400)
//! │   └── EntityRecord
//! │       ├── header: id, kind, sub-kind, name
//! │       ├── items / trades / effects
//! │       └── facets: Option<Box<...Facet>> × 12, created on first write
//! ├── by_kind:     TypeIndex<Kind>    → ascending Chain per kind
//! ├── by_sub_kind: TypeIndex<SubKind> → ascending Chain per sub-kind
//! └── rng: ChaCha8Rng                 (seeded random start for pick_free)
//! ```
//!
//! # Invariants
//!
//! - A slot, once occupied, is never emptied. Deletion leaves a tombstone.
//! - Every live record is linked in exactly one kind chain and one
//!   sub-kind chain; tombstones are linked nowhere.
//! - Chains are strictly ascending by id.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod facet;
pub mod idset;
pub mod index;
pub mod record;
pub mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use facet::{
    CharacterFacet, CommandFacet, CommandState, Facet, GateFacet, ItemFacet, LocationFacet,
    MagicFacet, MiscFacet, NationFacet, PlayerFacet, ShipFacet, SkillEntry, SkillFacet,
    SubLocationFacet,
};
pub use idset::IdSet;
pub use index::{Chain, IndexStats, TypeIndex};
pub use record::{sanitize_name, Effect, EntityRecord, ItemStack, Trade, TradeKind};
pub use store::Store;
