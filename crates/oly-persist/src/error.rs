//! Error types for loading and saving.
//!
//! [`PersistError`] covers only the fatal cases: anything returned here
//! aborts the load or save. Tolerated data-quality problems are reported
//! as [`Problem`]s inside a [`LoadReport`](crate::LoadReport) instead.

use std::io;
use std::path::PathBuf;

use oly_core::EntityId;
use oly_store::StoreError;

/// Fatal errors that abort a load or save.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// An I/O error while reading or writing a store file.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// Allocation failed while rebuilding the id table (double
    /// allocation is the usual cause: the same id listed twice).
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A line ended in a continuation backslash but no continuation
    /// line followed.
    #[error("{file}:{line}: continuation line missing")]
    ContinuationDesync {
        /// The file being read.
        file: String,
        /// Line number of the line that asked for a continuation.
        line: usize,
    },
    /// The master index exists but cannot be trusted.
    #[error("master index {file}:{line}: {detail}")]
    MasterIndex {
        /// `master` or `master.json`.
        file: String,
        /// Offending line (0 for whole-file problems).
        line: usize,
        /// What is wrong.
        detail: String,
    },
}

impl PersistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A tolerated problem found during the attribute pass.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Problem {
    /// A box-level or facet field tag the reader does not know.
    #[error("unknown field tag '{tag}'")]
    UnknownField {
        /// The tag.
        tag: String,
    },
    /// A record tag that names no facet; its field lines are skipped.
    #[error("unknown record tag '{tag}'")]
    UnknownFacet {
        /// The tag.
        tag: String,
    },
    /// A numeric token that does not parse; defaulted to 0.
    #[error("bad number '{token}'")]
    BadNumber {
        /// The token.
        token: String,
    },
    /// A reference to an id that is not allocated; defaulted to none.
    #[error("reference to unallocated entity {raw}")]
    DanglingReference {
        /// The raw referenced id.
        raw: u32,
    },
    /// A tuple list whose length is not a multiple of the tuple size;
    /// the trailing partial tuple is dropped.
    #[error("field '{tag}' holds a partial tuple")]
    PartialTuple {
        /// The tag.
        tag: String,
    },
    /// A value outside the field's domain (e.g. an unknown trade kind).
    #[error("bad value '{token}' for field '{tag}'")]
    BadValue {
        /// The tag.
        tag: String,
        /// The token.
        token: String,
    },
    /// A block header that cannot be parsed.
    #[error("bad block header")]
    BadHeader,
    /// A block whose id the allocate pass never saw; the block is skipped.
    #[error("block for unallocated entity {id}")]
    UnallocatedBlock {
        /// The block id.
        id: EntityId,
    },
    /// A field line outside any record tag, or a line outside any block.
    #[error("line outside any record")]
    StrayLine,
    /// A line holding bytes that are not valid UTF-8; they were replaced
    /// with U+FFFD and the line read as usual.
    #[error("invalid UTF-8 replaced")]
    BadEncoding,
}
