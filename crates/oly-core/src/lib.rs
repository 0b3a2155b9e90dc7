//! Core types for the Oly world store.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! fundamental vocabulary used throughout the Oly workspace: entity ids
//! and the static partition of the id space, the human-readable id codec,
//! and the two-level kind / sub-kind classification.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod id;
pub mod kind;

pub use codec::{bracketed, decode, display_name, encode};
pub use error::KindError;
pub use id::{EntityId, IdRange, MAX_ENTITY_ID};
pub use kind::{Kind, SubKind};
