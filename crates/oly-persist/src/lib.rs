//! Text save format for the Oly world store.
//!
//! A store directory holds one text file per primary kind, a leftovers
//! file for everything else, and a master index naming every allocated
//! id. Loading runs in two passes so that references can point at
//! entities defined anywhere in the directory.
//!
//! # Architecture
//!
//! - [`save`] / [`save_with`] walk the kind chains and write blocks with
//!   [`EntityWriter`], then write the [`MasterIndex`]
//! - [`load`] rebuilds the id table (master index, or a header scan
//!   with [`EntityReader::allocate_headers`]), then fills in attributes
//!   with [`EntityReader::read_attributes`]
//! - [`LineReader`] joins `\`-continued physical lines
//! - Per-facet codecs map two-character field tags to typed values
//!
//! # Format
//!
//! ```text
//! 10101 loc forest          header: id, kind, sub-kind (0 = none)
//! na Forest of Doom         box-level field
//! il 77 10 78 2             item/quantity pairs
//! lo                        facet tag
//!  pd 10001 10102 0 10100   facet field
//!  hi 1
//!                           blank line ends the block
//! ```
//!
//! Lists longer than the wrap width continue on the next physical line:
//! the current line ends in ` \` and the next is indented.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
mod facets;
mod fields;
pub mod lines;
mod load;
pub mod master;
pub mod reader;
mod save;
pub mod skills;
pub mod types;
pub mod writer;

use oly_core::Kind;

pub use config::PersistConfig;
pub use error::{PersistError, Problem};
pub use lines::{Line, LineReader};
pub use load::load;
pub use master::{MasterEntry, MasterIndex};
pub use reader::{parse_header, EntityReader};
pub use save::{save, save_with};
pub use skills::current_skill_id;
pub use types::{IndexSource, LoadReport, LoadWarning, SaveReport};
pub use writer::EntityWriter;

/// Legacy text master index.
pub const MASTER_FILE: &str = "master";

/// Transitional JSON master index.
pub const MASTER_JSON_FILE: &str = "master.json";

/// File holding every record whose kind has no file of its own.
pub const LEFTOVERS_FILE: &str = "misc";

/// Every store file name, in the order files are written and read.
pub fn store_files() -> impl Iterator<Item = &'static str> {
    Kind::ALL
        .into_iter()
        .filter_map(Kind::file_name)
        .chain(std::iter::once(LEFTOVERS_FILE))
}

/// Whether `name` is one of [`store_files`].
pub fn is_store_file(name: &str) -> bool {
    store_files().any(|file| file == name)
}
