//! Physical-to-logical line reading.
//!
//! A physical line ending in `\` continues on the next physical line.
//! [`LineReader`] joins such runs into one logical [`Line`], numbered by
//! its first physical line. A continuation that runs into end-of-file or
//! a blank line is fatal: the rest of the file can no longer be trusted
//! to line up with block boundaries.
//!
//! Bytes that are not valid UTF-8 are replaced with U+FFFD and the line
//! is flagged [`Line::lossy`]; the reader above decides what to report.

use std::borrow::Cow;
use std::io::BufRead;
use std::path::Path;

use crate::error::PersistError;

/// One logical line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    /// 1-based number of the first physical line.
    pub number: usize,
    /// Text with continuations joined by single spaces and the line
    /// terminator removed.
    pub text: String,
    /// Whether any physical line held invalid UTF-8.
    pub lossy: bool,
}

impl Line {
    /// Whether the line separates blocks.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Whether the line is a `#` comment.
    pub fn is_comment(&self) -> bool {
        self.text.starts_with('#')
    }

    /// Whether the line starts a block (leading ASCII digit).
    pub fn is_header(&self) -> bool {
        self.text.as_bytes().first().is_some_and(u8::is_ascii_digit)
    }
}

/// Reads logical lines from a store file.
pub struct LineReader<R: BufRead> {
    reader: R,
    file: String,
    physical: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    /// Wrap `reader`; `file` names the source in errors.
    pub fn new(reader: R, file: impl Into<String>) -> Self {
        Self {
            reader,
            file: file.into(),
            physical: 0,
            buf: Vec::new(),
        }
    }

    /// Name of the file being read.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Number of physical lines consumed so far.
    pub fn physical_lines(&self) -> usize {
        self.physical
    }

    /// Next physical line and whether it needed lossy decoding.
    fn next_physical(&mut self) -> Result<Option<(String, bool)>, PersistError> {
        self.buf.clear();
        let n = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| PersistError::io(Path::new(&self.file), e))?;
        if n == 0 {
            return Ok(None);
        }
        self.physical += 1;
        while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
            self.buf.pop();
        }
        let (text, lossy) = match String::from_utf8_lossy(&self.buf) {
            Cow::Borrowed(text) => (text.to_string(), false),
            Cow::Owned(text) => (text, true),
        };
        Ok(Some((text, lossy)))
    }

    /// Next logical line, or `None` at end of file.
    ///
    /// Comment lines are returned as-is, without continuation joining.
    pub fn next_line(&mut self) -> Result<Option<Line>, PersistError> {
        let Some((mut text, mut lossy)) = self.next_physical()? else {
            return Ok(None);
        };
        let number = self.physical;
        if text.starts_with('#') {
            return Ok(Some(Line {
                number,
                text,
                lossy,
            }));
        }
        while text.ends_with('\\') {
            text.pop();
            let keep = text.trim_end().len();
            text.truncate(keep);
            let asking = self.physical;
            match self.next_physical()? {
                Some((next, next_lossy)) if !next.trim().is_empty() => {
                    text.push(' ');
                    text.push_str(next.trim());
                    lossy |= next_lossy;
                }
                _ => {
                    return Err(PersistError::ContinuationDesync {
                        file: self.file.clone(),
                        line: asking,
                    })
                }
            }
        }
        Ok(Some(Line {
            number,
            text,
            lossy,
        }))
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<Line, PersistError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
