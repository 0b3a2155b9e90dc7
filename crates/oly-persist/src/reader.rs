//! Block reader for one store file.
//!
//! [`EntityReader`] drives both load passes over a single file: the
//! header scan that rebuilds the id table when no master index exists,
//! and the attribute pass that fills in records.

use std::io::BufRead;

use oly_core::{EntityId, Kind, SubKind};
use oly_store::{IdSet, Store};
use tracing::debug;

use crate::error::{PersistError, Problem};
use crate::facets::{facet_for, read_box_field, FacetEntry};
use crate::fields::FieldCtx;
use crate::lines::{Line, LineReader};
use crate::types::LoadWarning;

/// Parse a block header: `<id> <kind> [<sub_kind>]`.
pub fn parse_header(text: &str) -> Option<(EntityId, Kind, SubKind)> {
    let mut tokens = text.split_whitespace();
    let id = tokens.next()?.parse().ok().and_then(EntityId::new)?;
    let kind = tokens.next()?.parse().ok()?;
    let sub_kind = match tokens.next() {
        Some(token) => token.parse().ok()?,
        None => SubKind::None,
    };
    Some((id, kind, sub_kind))
}

#[derive(Clone, Copy)]
enum Section {
    /// Box-level fields, before any record tag.
    Box,
    /// Inside a known facet.
    Facet(&'static FacetEntry),
    /// Inside an unknown record tag; its field lines are skipped.
    Unknown,
}

#[derive(Clone, Copy)]
enum Block {
    Outside,
    Skipping,
    Reading { id: EntityId, section: Section },
}

/// Reads entity blocks from a byte stream.
///
/// Each pass consumes the stream, so a reader serves one pass.
pub struct EntityReader<R: BufRead> {
    lines: LineReader<R>,
    blocks_read: usize,
    warnings: Vec<LoadWarning>,
}

impl<R: BufRead> EntityReader<R> {
    /// Create a reader for the store file `file`.
    pub fn new(reader: R, file: impl Into<String>) -> Self {
        Self {
            lines: LineReader::new(reader, file),
            blocks_read: 0,
            warnings: Vec::new(),
        }
    }

    /// Blocks processed so far.
    pub fn blocks_read(&self) -> usize {
        self.blocks_read
    }

    /// Tolerated problems found so far.
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Consume the reader, returning its warnings.
    pub fn into_warnings(self) -> Vec<LoadWarning> {
        self.warnings
    }

    fn ctx<'a>(
        &'a mut self,
        allocated: &'a IdSet,
        line: &'a Line,
        id: Option<EntityId>,
    ) -> FieldCtx<'a> {
        FieldCtx {
            allocated,
            file: self.lines.file(),
            line: line.number,
            text: &line.text,
            id,
            warnings: &mut self.warnings,
        }
    }

    /// Allocate pass without a master index: allocate every header.
    ///
    /// Only lines starting with a digit are looked at. Unparsable headers
    /// are reported and skipped. Returns the number of ids allocated.
    ///
    /// # Errors
    ///
    /// I/O and continuation errors, and [`StoreError::DoubleAllocation`]
    /// (as [`PersistError::Store`]) when an id appears twice.
    ///
    /// [`StoreError::DoubleAllocation`]: oly_store::StoreError::DoubleAllocation
    pub fn allocate_headers(&mut self, store: &mut Store) -> Result<usize, PersistError> {
        let empty = IdSet::new();
        let mut allocated = 0;
        while let Some(line) = self.lines.next_line()? {
            if !line.is_header() {
                continue;
            }
            match parse_header(&line.text) {
                Some((id, kind, sub_kind)) => {
                    store.allocate_at(id, kind, sub_kind)?;
                    allocated += 1;
                }
                None => self.ctx(&empty, &line, None).warn(Problem::BadHeader),
            }
        }
        self.blocks_read += allocated;
        debug!(file = self.lines.file(), allocated, "header scan");
        Ok(allocated)
    }

    /// Attribute pass: apply every block's fields to its record.
    ///
    /// `allocated` is the id table left by the allocate pass; references
    /// are checked against it. Returns the number of blocks read.
    pub fn read_attributes(
        &mut self,
        store: &mut Store,
        allocated: &IdSet,
    ) -> Result<usize, PersistError> {
        let mut block = Block::Outside;
        let mut read = 0;
        while let Some(line) = self.lines.next_line()? {
            if line.is_blank() {
                block = Block::Outside;
                continue;
            }
            if line.is_comment() {
                continue;
            }
            if line.lossy {
                let id = match block {
                    Block::Reading { id, .. } => Some(id),
                    Block::Outside | Block::Skipping => None,
                };
                self.ctx(allocated, &line, id).warn(Problem::BadEncoding);
            }
            if line.is_header() {
                block = match parse_header(&line.text) {
                    None => {
                        // Inside a block this is a junk field line, not
                        // the start of a new block.
                        let id = match block {
                            Block::Reading { id, .. } => Some(id),
                            Block::Outside | Block::Skipping => None,
                        };
                        self.ctx(allocated, &line, id).warn(Problem::BadHeader);
                        match block {
                            Block::Reading { .. } => block,
                            Block::Outside | Block::Skipping => Block::Skipping,
                        }
                    }
                    Some((id, ..)) if !allocated.contains(id) => {
                        self.ctx(allocated, &line, Some(id))
                            .warn(Problem::UnallocatedBlock { id });
                        Block::Skipping
                    }
                    Some((id, ..)) => {
                        read += 1;
                        Block::Reading {
                            id,
                            section: Section::Box,
                        }
                    }
                };
                continue;
            }
            let (id, section) = match block {
                Block::Skipping => continue,
                Block::Outside => {
                    self.ctx(allocated, &line, None).warn(Problem::StrayLine);
                    block = Block::Skipping;
                    continue;
                }
                Block::Reading { id, section } => (id, section),
            };
            let Some(record) = store.get_mut(id).filter(|r| !r.is_tombstone()) else {
                continue;
            };
            let mut ctx = self.ctx(allocated, &line, Some(id));
            let text = line.text.as_str();

            if let Some(field) = text.strip_prefix(' ') {
                let (tag, value) = split_field(field);
                match section {
                    Section::Facet(entry) => {
                        if !(entry.read)(record, tag, value, &mut ctx) {
                            ctx.warn(Problem::UnknownField {
                                tag: tag.to_string(),
                            });
                        }
                    }
                    Section::Unknown => {}
                    Section::Box => ctx.warn(Problem::StrayLine),
                }
            } else if text.trim_end().chars().count() == 2 {
                let tag = text.trim_end();
                let section = match facet_for(tag) {
                    Some(entry) => Section::Facet(entry),
                    None => {
                        ctx.warn(Problem::UnknownFacet {
                            tag: tag.to_string(),
                        });
                        Section::Unknown
                    }
                };
                block = Block::Reading { id, section };
            } else {
                let (tag, value) = split_field(text);
                if !read_box_field(record, tag, value, &mut ctx) {
                    ctx.warn(Problem::UnknownField {
                        tag: tag.to_string(),
                    });
                }
                block = Block::Reading {
                    id,
                    section: Section::Box,
                };
            }
        }
        self.blocks_read += read;
        debug!(file = self.lines.file(), blocks = read, "attribute pass");
        Ok(read)
    }
}

/// Split `xx value` into tag and trimmed value.
fn split_field(text: &str) -> (&str, &str) {
    let split = text.char_indices().nth(2).map_or(text.len(), |(i, _)| i);
    let (tag, value) = text.split_at(split);
    (tag, value.trim())
}
