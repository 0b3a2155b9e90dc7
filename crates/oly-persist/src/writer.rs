//! Block writer for one store file.
//!
//! [`EntityWriter`] renders entity records as text blocks: a header line,
//! box-level fields, then every non-empty facet under its record tag,
//! with a blank line after each block.

use std::io::{self, Write};

use oly_store::EntityRecord;

use crate::error::PersistError;
use crate::facets::{write_box_fields, FACETS};

/// Writes entity blocks to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use oly_core::{Kind, SubKind};
/// use oly_persist::EntityWriter;
/// use oly_store::{Store, StoreConfig};
///
/// let mut store = Store::new(StoreConfig::default());
/// let id = store.allocate(Kind::Location, SubKind::Forest).unwrap();
/// store.get_mut(id).unwrap().location_mut().hidden = true;
///
/// let mut writer = EntityWriter::new(Vec::new(), "loc", 11);
/// writer.write_record(store.get(id).unwrap()).unwrap();
/// assert_eq!(writer.records_written(), 1);
///
/// let text = String::from_utf8(writer.into_inner()).unwrap();
/// assert_eq!(text, format!("{id} loc forest\nlo\n hi 1\n\n"));
/// ```
pub struct EntityWriter<W: Write> {
    writer: W,
    file: String,
    wrap: usize,
    records_written: usize,
}

impl<W: Write> EntityWriter<W> {
    /// Create a writer for the store file `file`, wrapping lists every
    /// `wrap` values.
    pub fn new(writer: W, file: impl Into<String>, wrap: usize) -> Self {
        Self {
            writer,
            file: file.into(),
            wrap: wrap.max(1),
            records_written: 0,
        }
    }

    fn io_err(&self, e: io::Error) -> PersistError {
        PersistError::io(&self.file, e)
    }

    /// Write one record as a block.
    ///
    /// Tombstones have been stripped to their header, so they come out
    /// as a header line alone.
    pub fn write_record(&mut self, record: &EntityRecord) -> Result<(), PersistError> {
        self.write_block(record).map_err(|e| self.io_err(e))?;
        self.records_written += 1;
        Ok(())
    }

    fn write_block(&mut self, record: &EntityRecord) -> io::Result<()> {
        let out: &mut dyn Write = &mut self.writer;
        writeln!(
            out,
            "{} {} {}",
            record.id(),
            record.kind(),
            record.sub_kind()
        )?;
        write_box_fields(record, out, self.wrap)?;
        for entry in FACETS {
            (entry.write)(record, out, self.wrap)?;
        }
        writeln!(out)
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), PersistError> {
        self.writer.flush().map_err(|e| self.io_err(e))
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Consume the writer and return the underlying `Write` sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
