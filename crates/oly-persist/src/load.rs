//! Two-pass load of a store directory.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use oly_store::{IdSet, Store};
use tracing::{debug, info};

use crate::error::PersistError;
use crate::master::MasterIndex;
use crate::reader::EntityReader;
use crate::store_files;
use crate::types::{IndexSource, LoadReport};

fn open_optional(path: &Path) -> Result<Option<BufReader<File>>, PersistError> {
    match File::open(path) {
        Ok(file) => Ok(Some(BufReader::new(file))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PersistError::io(path, e)),
    }
}

/// Load every store file in `dir` into `store`.
///
/// Pass one rebuilds the id table, from the master index when one exists
/// and otherwise by scanning each kind file's headers. Pass two re-reads
/// every kind file and fills in records, checking references against the
/// table from pass one. Missing kind files are skipped.
///
/// `store` is expected to be empty; ids it already holds collide with
/// ids on disk as double allocations.
///
/// # Errors
///
/// Fatal problems only: I/O failure, an untrustworthy master index, a
/// continuation desync, or an id allocated twice. Everything else is
/// tolerated and listed in [`LoadReport::warnings`].
pub fn load(store: &mut Store, dir: impl AsRef<Path>) -> Result<LoadReport, PersistError> {
    let dir = dir.as_ref();
    let mut warnings = Vec::new();

    let (source, allocated) = match MasterIndex::read_dir(dir)? {
        Some((index, source)) => {
            for entry in index.entries() {
                store.allocate_at(entry.id, entry.kind, entry.sub_kind)?;
            }
            (source, index.len())
        }
        None => {
            let mut allocated = 0;
            for file in store_files() {
                let Some(input) = open_optional(&dir.join(file))? else {
                    continue;
                };
                // Bad headers are reported by the attribute pass.
                allocated += EntityReader::new(input, file).allocate_headers(store)?;
            }
            (IndexSource::HeaderScan, allocated)
        }
    };
    debug!(?source, allocated, "allocate pass done");

    let table: IdSet = store.ids().collect();
    let mut blocks_read = 0;
    let mut files_read = Vec::new();
    for file in store_files() {
        let Some(input) = open_optional(&dir.join(file))? else {
            debug!(file, "store file missing");
            continue;
        };
        let mut reader = EntityReader::new(input, file);
        blocks_read += reader.read_attributes(store, &table)?;
        warnings.extend(reader.into_warnings());
        files_read.push(file.to_string());
    }

    info!(
        dir = %dir.display(),
        allocated,
        blocks_read,
        warnings = warnings.len(),
        "store loaded"
    );
    Ok(LoadReport {
        source,
        allocated,
        blocks_read,
        files_read,
        warnings,
    })
}
