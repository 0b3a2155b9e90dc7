//! Value-level reading and writing of field lines.
//!
//! [`FieldSink`] renders typed values into tagged field lines, skipping
//! defaults and wrapping long lists. [`FieldCtx`] goes the other way,
//! converting value text back into typed values and recording every
//! tolerated problem as a [`LoadWarning`].

use std::io::{self, Write};

use oly_core::EntityId;
use oly_store::IdSet;
use smallvec::SmallVec;
use tracing::warn;

use crate::error::Problem;
use crate::skills::current_skill_id;
use crate::types::LoadWarning;

// ── Writing ─────────────────────────────────────────────────────

/// Strip what the line format cannot carry: control characters become
/// spaces, and trailing backslashes (which would read as continuations)
/// are dropped along with surrounding whitespace.
pub(crate) fn clean_text(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    mapped
        .trim()
        .trim_end_matches(|c: char| c == '\\' || c.is_whitespace())
        .to_string()
}

/// Writes tagged field lines at one indentation level.
pub(crate) struct FieldSink<'a> {
    out: &'a mut dyn Write,
    indent: &'static str,
    wrap: usize,
}

impl<'a> FieldSink<'a> {
    /// Box-level fields: no indentation.
    pub(crate) fn box_level(out: &'a mut dyn Write, wrap: usize) -> Self {
        Self {
            out,
            indent: "",
            wrap,
        }
    }

    /// Facet fields: one leading space.
    pub(crate) fn facet(out: &'a mut dyn Write, wrap: usize) -> Self {
        Self {
            out,
            indent: " ",
            wrap,
        }
    }

    pub(crate) fn int(&mut self, tag: &str, value: i32) -> io::Result<()> {
        if value == 0 {
            return Ok(());
        }
        writeln!(self.out, "{}{tag} {value}", self.indent)
    }

    pub(crate) fn flag(&mut self, tag: &str, value: bool) -> io::Result<()> {
        self.int(tag, i32::from(value))
    }

    pub(crate) fn reference(&mut self, tag: &str, value: Option<EntityId>) -> io::Result<()> {
        match value {
            Some(id) => writeln!(self.out, "{}{tag} {id}", self.indent),
            None => Ok(()),
        }
    }

    pub(crate) fn text(&mut self, tag: &str, value: &str) -> io::Result<()> {
        let value = clean_text(value);
        if value.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "{}{tag} {value}", self.indent)
    }

    /// A space-separated list, `wrap` values per physical line. Every
    /// line but the last ends in ` \`; continuation lines are indented
    /// three spaces past the field.
    pub(crate) fn list<T: std::fmt::Display>(
        &mut self,
        tag: &str,
        values: impl IntoIterator<Item = T>,
    ) -> io::Result<()> {
        let mut written = 0usize;
        for value in values {
            if written == 0 {
                write!(self.out, "{}{tag}", self.indent)?;
            } else if written % self.wrap == 0 {
                write!(self.out, " \\\n{}  ", self.indent)?;
            }
            write!(self.out, " {value}")?;
            written += 1;
        }
        if written > 0 {
            writeln!(self.out)?;
        }
        Ok(())
    }

    pub(crate) fn refs(&mut self, tag: &str, ids: &[EntityId]) -> io::Result<()> {
        self.list(tag, ids)
    }

    pub(crate) fn set(&mut self, tag: &str, set: &IdSet) -> io::Result<()> {
        self.list(tag, set.iter())
    }

    /// Positional references: a missing entry is written as `0` so later
    /// positions keep their place. Trailing missing entries are dropped.
    pub(crate) fn positional(&mut self, tag: &str, ids: &[Option<EntityId>]) -> io::Result<()> {
        let len = ids.iter().rposition(Option::is_some).map_or(0, |p| p + 1);
        self.list(tag, ids[..len].iter().map(|id| id.map_or(0, EntityId::get)))
    }
}

// ── Reading ─────────────────────────────────────────────────────

/// Conversion context for one logical line.
///
/// Reference checks go against `allocated`, the table rebuilt by the
/// allocate pass, so a reference to an entity defined later in the same
/// file (or in a later file) resolves.
pub(crate) struct FieldCtx<'a> {
    pub(crate) allocated: &'a IdSet,
    pub(crate) file: &'a str,
    pub(crate) line: usize,
    pub(crate) text: &'a str,
    pub(crate) id: Option<EntityId>,
    pub(crate) warnings: &'a mut Vec<LoadWarning>,
}

impl FieldCtx<'_> {
    /// Record a tolerated problem against the current line.
    pub(crate) fn warn(&mut self, problem: Problem) {
        warn!(
            file = self.file,
            line = self.line,
            id = self.id.map(EntityId::get),
            text = self.text,
            "{problem}"
        );
        self.warnings.push(LoadWarning {
            file: self.file.to_string(),
            line: self.line,
            id: self.id,
            text: self.text.to_string(),
            problem,
        });
    }

    pub(crate) fn int(&mut self, token: &str) -> i32 {
        match token.parse() {
            Ok(n) => n,
            Err(_) => {
                self.warn(Problem::BadNumber {
                    token: token.to_string(),
                });
                0
            }
        }
    }

    pub(crate) fn flag(&mut self, token: &str) -> bool {
        self.int(token) != 0
    }

    fn raw_id(&mut self, token: &str) -> Option<u32> {
        match token.parse::<u32>() {
            Ok(raw) => Some(raw),
            Err(_) => {
                self.warn(Problem::BadNumber {
                    token: token.to_string(),
                });
                None
            }
        }
    }

    fn check(&mut self, raw: u32) -> Option<EntityId> {
        if raw == 0 {
            return None;
        }
        match EntityId::new(raw) {
            Some(id) if self.allocated.contains(id) => Some(id),
            _ => {
                self.warn(Problem::DanglingReference { raw });
                None
            }
        }
    }

    /// A scalar reference; `0` is the null reference.
    pub(crate) fn reference(&mut self, token: &str) -> Option<EntityId> {
        let raw = self.raw_id(token)?;
        self.check(raw)
    }

    /// A scalar skill reference. An obsolete id is renumbered before it
    /// is checked, unless an entity is allocated at that id.
    pub(crate) fn skill(&mut self, token: &str) -> Option<EntityId> {
        let raw = self.raw_id(token)?;
        let in_use = EntityId::new(raw).is_some_and(|id| self.allocated.contains(id));
        self.check(if in_use { raw } else { current_skill_id(raw) })
    }

    /// A reference list; null and dangling elements are dropped.
    pub(crate) fn refs(&mut self, value: &str) -> Vec<EntityId> {
        value
            .split_whitespace()
            .filter_map(|t| self.reference(t))
            .collect()
    }

    pub(crate) fn skills(&mut self, value: &str) -> Vec<EntityId> {
        value
            .split_whitespace()
            .filter_map(|t| self.skill(t))
            .collect()
    }

    pub(crate) fn set(&mut self, value: &str) -> IdSet {
        value
            .split_whitespace()
            .filter_map(|t| self.reference(t))
            .collect()
    }

    /// Positional references: every position is kept, `None` where the
    /// token is null or dangling.
    pub(crate) fn positional(&mut self, value: &str) -> SmallVec<[Option<EntityId>; 6]> {
        value
            .split_whitespace()
            .map(|t| self.reference(t))
            .collect()
    }

    pub(crate) fn ints(&mut self, value: &str) -> Vec<i32> {
        value.split_whitespace().map(|t| self.int(t)).collect()
    }

    /// Split a tuple list into `N`-token groups, dropping (with a
    /// warning) a trailing partial group.
    pub(crate) fn tuples<'v, const N: usize>(
        &mut self,
        tag: &str,
        value: &'v str,
    ) -> Vec<[&'v str; N]> {
        let tokens: Vec<&str> = value.split_whitespace().collect();
        let chunks = tokens.chunks_exact(N);
        if !chunks.remainder().is_empty() {
            self.warn(Problem::PartialTuple {
                tag: tag.to_string(),
            });
        }
        chunks
            .filter_map(|chunk| <[&str; N]>::try_from(chunk).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::LineReader;
    use proptest::prelude::*;

    fn id(raw: u32) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    fn render(f: impl FnOnce(&mut FieldSink<'_>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut FieldSink::facet(&mut buf, 11)).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn defaults_are_not_written() {
        let out = render(|s| {
            s.int("he", 0)?;
            s.flag("si", false)?;
            s.reference("wh", None)?;
            s.text("pl", "  ")?;
            s.refs("ct", &[])
        });
        assert_eq!(out, "");
    }

    #[test]
    fn scalars_render_one_line_each() {
        let out = render(|s| {
            s.int("he", -1)?;
            s.flag("gu", true)?;
            s.reference("wh", Some(id(10101)))?;
            s.text("pl", "swords\u{7}\\")
        });
        assert_eq!(out, " he -1\n gu 1\n wh 10101\n pl swords\n");
    }

    #[test]
    fn long_lists_wrap_every_eleven_values() {
        let out = render(|s| s.list("ar", 1..=25));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], " ar 1 2 3 4 5 6 7 8 9 10 11 \\");
        assert_eq!(lines[1], "    12 13 14 15 16 17 18 19 20 21 22 \\");
        assert_eq!(lines[2], "    23 24 25");
    }

    #[test]
    fn positional_keeps_inner_gaps_and_drops_trailing_ones() {
        let out = render(|s| s.positional("pd", &[Some(id(10101)), None, Some(id(10102)), None]));
        assert_eq!(out, " pd 10101 0 10102\n");
    }

    fn ctx<'a>(allocated: &'a IdSet, warnings: &'a mut Vec<LoadWarning>) -> FieldCtx<'a> {
        FieldCtx {
            allocated,
            file: "test",
            line: 7,
            text: "",
            id: Some(id(5001)),
            warnings,
        }
    }

    #[test]
    fn bad_numbers_default_to_zero_with_a_warning() {
        let allocated = IdSet::new();
        let mut warnings = Vec::new();
        let mut c = ctx(&allocated, &mut warnings);
        assert_eq!(c.int("12"), 12);
        assert_eq!(c.int("-3"), -3);
        assert_eq!(c.int("x7"), 0);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].line, 7);
        assert_eq!(warnings[0].id, Some(id(5001)));
    }

    #[test]
    fn references_resolve_against_the_allocation_table() {
        let allocated: IdSet = [id(10101), id(600)].into_iter().collect();
        let mut warnings = Vec::new();
        let mut c = ctx(&allocated, &mut warnings);
        assert_eq!(c.reference("10101"), Some(id(10101)));
        assert_eq!(c.reference("0"), None);
        assert_eq!(c.reference("10102"), None);
        assert_eq!(c.reference("999999"), None);
        assert_eq!(c.refs("10101 10102 0 10101"), vec![id(10101), id(10101)]);
        assert_eq!(c.skill("1"), Some(id(600)));
        assert_eq!(c.skill("600"), Some(id(600)));
        assert_eq!(
            warnings
                .iter()
                .filter(|w| matches!(w.problem, Problem::DanglingReference { .. }))
                .count(),
            3
        );
    }

    #[test]
    fn allocated_low_skill_ids_are_not_renumbered() {
        let allocated: IdSet = [id(5), id(600)].into_iter().collect();
        let mut warnings = Vec::new();
        let mut c = ctx(&allocated, &mut warnings);
        assert_eq!(c.skill("5"), Some(id(5)));
        assert_eq!(c.skill("1"), Some(id(600)));
        assert_eq!(c.skills("5 1"), vec![id(5), id(600)]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn positional_keeps_dangling_slots() {
        let allocated: IdSet = [id(10101)].into_iter().collect();
        let mut warnings = Vec::new();
        let mut c = ctx(&allocated, &mut warnings);
        let got = c.positional("10101 0 10199 10101");
        assert_eq!(got.as_slice(), &[Some(id(10101)), None, None, Some(id(10101))]);
    }

    #[test]
    fn partial_tuples_are_dropped() {
        let allocated = IdSet::new();
        let mut warnings = Vec::new();
        let mut c = ctx(&allocated, &mut warnings);
        let pairs = c.tuples::<2>("il", "1 10 2 20 3");
        assert_eq!(pairs, vec![["1", "10"], ["2", "20"]]);
        assert!(matches!(
            warnings[0].problem,
            Problem::PartialTuple { ref tag } if tag == "il"
        ));
    }

    proptest! {
        #[test]
        fn wrapped_lists_join_back_in_order(
            values in proptest::collection::vec(-5000i32..5000, 1..60),
            wrap in 1usize..20,
        ) {
            let mut buf = Vec::new();
            FieldSink::facet(&mut buf, wrap).list("ar", &values).unwrap();
            let physical = String::from_utf8(buf.clone()).unwrap().lines().count();
            prop_assert_eq!(physical, values.len().div_ceil(wrap));

            let mut reader = LineReader::new(buf.as_slice(), "test");
            let line = reader.next_line().unwrap().unwrap();
            let mut tokens = line.text.split_whitespace();
            prop_assert_eq!(tokens.next(), Some("ar"));
            let read: Vec<i32> = tokens.map(|t| t.parse().unwrap()).collect();
            prop_assert_eq!(read, values);
            prop_assert!(reader.next_line().unwrap().is_none());
        }
    }
}
