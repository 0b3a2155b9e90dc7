//! The master index: every allocated id with its kind, sub-kind and
//! the store file holding its block.
//!
//! The legacy form is a text file named `master`, one entry per line:
//!
//! ```text
//! 10101 loc forest loc
//! 5001 deleted 0 misc
//! ```
//!
//! The transitional form `master.json` carries the same entries as JSON.
//! Either lets the allocate pass rebuild the id table without reading
//! any kind file.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use oly_core::{EntityId, Kind, SubKind};
use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::types::IndexSource;
use crate::{is_store_file, MASTER_FILE, MASTER_JSON_FILE};

/// Version written into `master.json`.
pub const JSON_INDEX_VERSION: u32 = 1;

/// One allocated id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterEntry {
    /// The id.
    pub id: EntityId,
    /// Primary type.
    pub kind: Kind,
    /// Secondary type.
    pub sub_kind: SubKind,
    /// Store file holding the block.
    pub file: String,
}

#[derive(Deserialize)]
struct JsonIndex {
    version: u32,
    entries: Vec<MasterEntry>,
}

/// The full index, in file-walk order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MasterIndex {
    entries: Vec<MasterEntry>,
}

impl MasterIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: MasterEntry) {
        self.entries.push(entry);
    }

    /// Entries in order.
    pub fn entries(&self) -> &[MasterEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse the legacy text form. Blank and `#` lines are skipped.
    ///
    /// # Errors
    ///
    /// [`PersistError::MasterIndex`] for any line that does not hold a
    /// valid id, a known kind and sub-kind, and a store file name.
    pub fn parse_legacy(text: &str) -> Result<Self, PersistError> {
        let mut index = Self::new();
        for (n, line) in text.lines().enumerate() {
            let line_no = n + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let bad = |detail: String| PersistError::MasterIndex {
                file: MASTER_FILE.to_string(),
                line: line_no,
                detail,
            };
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let [id, kind, sub_kind, file] = tokens[..] else {
                return Err(bad(format!("expected 4 fields, found {}", tokens.len())));
            };
            let id = id
                .parse()
                .ok()
                .and_then(EntityId::new)
                .ok_or_else(|| bad(format!("bad id '{id}'")))?;
            let kind = kind.parse().map_err(|e| bad(format!("{e}")))?;
            let sub_kind = sub_kind.parse().map_err(|e| bad(format!("{e}")))?;
            let entry = MasterEntry {
                id,
                kind,
                sub_kind,
                file: file.to_string(),
            };
            check_file(&entry, MASTER_FILE, line_no)?;
            index.push(entry);
        }
        Ok(index)
    }

    /// Write the legacy text form.
    pub fn write_legacy(&self, out: &mut dyn Write) -> io::Result<()> {
        for e in &self.entries {
            writeln!(out, "{} {} {} {}", e.id, e.kind, e.sub_kind, e.file)?;
        }
        Ok(())
    }

    /// Parse the JSON form.
    ///
    /// # Errors
    ///
    /// [`PersistError::MasterIndex`] when the JSON is malformed, names an
    /// unknown kind, or names a file that is not a store file.
    pub fn parse_json(text: &str) -> Result<Self, PersistError> {
        let bad = |line: usize, detail: String| PersistError::MasterIndex {
            file: MASTER_JSON_FILE.to_string(),
            line,
            detail,
        };
        let json: JsonIndex =
            serde_json::from_str(text).map_err(|e| bad(e.line(), e.to_string()))?;
        if json.version != JSON_INDEX_VERSION {
            return Err(bad(0, format!("unsupported version {}", json.version)));
        }
        for entry in &json.entries {
            check_file(entry, MASTER_JSON_FILE, 0)?;
        }
        Ok(Self {
            entries: json.entries,
        })
    }

    /// Render the JSON form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonIndexRef {
            version: JSON_INDEX_VERSION,
            entries: &self.entries,
        })
    }

    /// Read the index from `dir`: `master` first, then `master.json`.
    ///
    /// Returns `Ok(None)` when neither file exists.
    pub fn read_dir(dir: &Path) -> Result<Option<(Self, IndexSource)>, PersistError> {
        if let Some(text) = read_optional(&dir.join(MASTER_FILE))? {
            return Ok(Some((Self::parse_legacy(&text)?, IndexSource::Master)));
        }
        if let Some(text) = read_optional(&dir.join(MASTER_JSON_FILE))? {
            return Ok(Some((Self::parse_json(&text)?, IndexSource::Json)));
        }
        Ok(None)
    }
}

#[derive(Serialize)]
struct JsonIndexRef<'a> {
    version: u32,
    entries: &'a [MasterEntry],
}

fn check_file(entry: &MasterEntry, index_file: &str, line: usize) -> Result<(), PersistError> {
    if is_store_file(&entry.file) {
        return Ok(());
    }
    Err(PersistError::MasterIndex {
        file: index_file.to_string(),
        line,
        detail: format!("entity {} is in unknown file '{}'", entry.id, entry.file),
    })
}

fn read_optional(path: &Path) -> Result<Option<String>, PersistError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PersistError::io(path, e)),
    }
}
