//! Save of a store to a directory.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use oly_core::{EntityId, Kind};
use oly_store::{IdSet, Store};
use tracing::{debug, info};

use crate::config::PersistConfig;
use crate::error::PersistError;
use crate::master::{MasterEntry, MasterIndex};
use crate::types::SaveReport;
use crate::writer::EntityWriter;
use crate::{LEFTOVERS_FILE, MASTER_FILE, MASTER_JSON_FILE};

/// A file being written under a temporary name.
struct Staged {
    tmp: PathBuf,
    path: PathBuf,
}

impl Staged {
    fn create(dir: &Path, name: &str) -> Result<(Self, BufWriter<File>), PersistError> {
        let tmp = dir.join(format!("{name}.new"));
        let file = File::create(&tmp).map_err(|e| PersistError::io(&tmp, e))?;
        let staged = Self {
            tmp,
            path: dir.join(name),
        };
        Ok((staged, BufWriter::new(file)))
    }

    fn commit(self) -> Result<(), PersistError> {
        fs::rename(&self.tmp, &self.path).map_err(|e| PersistError::io(&self.path, e))
    }
}

struct SaveState<'s> {
    store: &'s Store,
    dir: &'s Path,
    wrap: usize,
    written: IdSet,
    index: MasterIndex,
}

impl SaveState<'_> {
    fn write_file(
        &mut self,
        file: &str,
        ids: impl IntoIterator<Item = EntityId>,
    ) -> Result<usize, PersistError> {
        let (staged, out) = Staged::create(self.dir, file)?;
        let mut writer = EntityWriter::new(out, file, self.wrap);
        for id in ids {
            let record = self.store.record(id)?;
            writer.write_record(record)?;
            self.written.insert(id);
            self.index.push(MasterEntry {
                id,
                kind: record.kind(),
                sub_kind: record.sub_kind(),
                file: file.to_string(),
            });
        }
        writer.flush()?;
        let count = writer.records_written();
        drop(writer);
        staged.commit()?;
        debug!(file, records = count, "store file written");
        Ok(count)
    }

    fn write_index(&self, json: bool) -> Result<(), PersistError> {
        let (staged, mut out) = Staged::create(self.dir, MASTER_FILE)?;
        self.index
            .write_legacy(&mut out)
            .and_then(|()| out.flush())
            .map_err(|e| PersistError::io(&staged.tmp, e))?;
        drop(out);
        staged.commit()?;

        if json {
            let (staged, mut out) = Staged::create(self.dir, MASTER_JSON_FILE)?;
            self.index
                .to_json()
                .map_err(io::Error::from)
                .and_then(|text| out.write_all(text.as_bytes()))
                .and_then(|()| out.flush())
                .map_err(|e| PersistError::io(&staged.tmp, e))?;
            drop(out);
            staged.commit()?;
        } else {
            let stale = self.dir.join(MASTER_JSON_FILE);
            match fs::remove_file(&stale) {
                Ok(()) => debug!("stale json index removed"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(PersistError::io(&stale, e)),
            }
        }
        Ok(())
    }
}

/// Save `store` to `dir` with the default [`PersistConfig`].
pub fn save(store: &Store, dir: impl AsRef<Path>) -> Result<SaveReport, PersistError> {
    save_with(store, dir, &PersistConfig::default())
}

/// Save `store` to `dir`, creating the directory if needed.
///
/// Each kind with its own file is written by walking its chain in
/// ascending id order. Every allocated record not written that way
/// (posts, storms, dead characters, tombstones) then goes to the
/// leftovers file. The master index lists every record in the same
/// order. Each file is written under a temporary name and renamed into
/// place once complete. A `master.json` left by an earlier save is
/// removed unless [`PersistConfig::write_json_index`] is set.
///
/// Each rename is atomic but the set is not: the directory is only
/// consistent once this returns `Ok`. After an error, kind files may be
/// newer than the master index.
pub fn save_with(
    store: &Store,
    dir: impl AsRef<Path>,
    config: &PersistConfig,
) -> Result<SaveReport, PersistError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| PersistError::io(dir, e))?;

    let mut state = SaveState {
        store,
        dir,
        wrap: config.effective_wrap(),
        written: IdSet::new(),
        index: MasterIndex::new(),
    };
    let mut report = SaveReport::default();

    for kind in Kind::ALL {
        let Some(file) = kind.file_name() else {
            continue;
        };
        let count = state.write_file(file, store.of_kind(kind))?;
        report.files.push((file.to_string(), count));
    }
    let leftovers: Vec<EntityId> = store
        .ids()
        .filter(|&id| !state.written.contains(id))
        .collect();
    let count = state.write_file(LEFTOVERS_FILE, leftovers)?;
    report.files.push((LEFTOVERS_FILE.to_string(), count));

    state.write_index(config.write_json_index)?;
    report.records_written = state.index.len();

    info!(
        dir = %dir.display(),
        records = report.records_written,
        "store saved"
    );
    Ok(report)
}
