//! Reports returned by load and save.

use std::fmt;

use oly_core::EntityId;

use crate::error::Problem;

/// Where the allocate pass found the id table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexSource {
    /// The legacy text `master` file.
    Master,
    /// The transitional `master.json` file.
    Json,
    /// No index was present; every kind file's headers were scanned.
    HeaderScan,
}

/// A tolerated problem, with enough context to find the offending line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadWarning {
    /// File the line came from.
    pub file: String,
    /// Line number (1-based) of the logical line.
    pub line: usize,
    /// Enclosing entity, when the line is inside a block.
    pub id: Option<EntityId>,
    /// The offending line as read.
    pub text: String,
    /// What was wrong and how it was handled.
    pub problem: Problem,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: ", self.file, self.line)?;
        if let Some(id) = self.id {
            write!(f, "[{id}] ")?;
        }
        write!(f, "{}: {:?}", self.problem, self.text)
    }
}

/// Summary of a completed load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadReport {
    /// How the id table was rebuilt.
    pub source: IndexSource,
    /// Ids allocated by the allocate pass, tombstones included.
    pub allocated: usize,
    /// Blocks whose attributes were read.
    pub blocks_read: usize,
    /// Store files that were present and read.
    pub files_read: Vec<String>,
    /// Every tolerated problem, in the order it was found.
    pub warnings: Vec<LoadWarning>,
}

impl LoadReport {
    /// Whether the load found nothing to complain about.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Summary of a completed save.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Records written, tombstones included.
    pub records_written: usize,
    /// Records per file, in the order the files were written.
    pub files: Vec<(String, usize)>,
}

impl SaveReport {
    /// Records written to `file`.
    pub fn records_in(&self, file: &str) -> usize {
        self.files
            .iter()
            .find(|(name, _)| name == file)
            .map_or(0, |(_, n)| *n)
    }
}
