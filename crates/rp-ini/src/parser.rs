//! Byte-offset INI tokenizer
//!
//! The parser walks the buffer with a single cursor and builds the symbol
//! tree as it goes. Line numbers count CR, LF and CRLF breaks alike.
//!
//! # Rules
//! - Spaces and non-printable bytes between tokens are skipped
//! - `;` starts a comment that runs to the end of the line
//! - `[` opens a section name that must close with `]` before the next
//!   non-printable byte
//! - Any other printable byte inside a section starts a `key=value` line
//!
//! Parsing stops at the first error and the partial tree is dropped.

use tracing::trace;

use crate::document::{IniDocument, SymbolId};
use crate::error::{IniError, SyntaxErrorKind};
use crate::IniConfig;

const CARRIAGE_RETURN: u8 = 0x0D;
const LINE_FEED: u8 = 0x0A;

fn is_printable(b: u8) -> bool {
    (32..=126).contains(&b)
}

fn trim_spaces(mut bytes: &[u8]) -> &[u8] {
    while let [b' ', rest @ ..] = bytes {
        bytes = rest;
    }
    while let [rest @ .., b' '] = bytes {
        bytes = rest;
    }
    bytes
}

fn to_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Parse `data` into a document using `config`
pub fn parse(data: &[u8], config: IniConfig) -> Result<IniDocument, IniError> {
    Parser::new(data, config).run()
}

struct Parser<'a> {
    data: &'a [u8],
    offset: usize,
    /// Zero-based; reported one-based
    line: usize,
    doc: IniDocument,
    section: Option<SymbolId>,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8], config: IniConfig) -> Self {
        Self {
            data,
            offset: 0,
            line: 0,
            doc: IniDocument::empty(config),
            section: None,
        }
    }

    fn run(mut self) -> Result<IniDocument, IniError> {
        self.skip_whitespace();

        while let Some(&c) = self.data.get(self.offset) {
            match (c, self.section) {
                (b';', _) => self.next_line(),
                (b'[', _) => self.read_section()?,
                (c, Some(section)) if is_printable(c) => self.read_key(section)?,
                _ => return Err(self.syntax_error(SyntaxErrorKind::UnexpectedSymbol)),
            }
            self.skip_whitespace();
        }

        trace!(
            "Parsed {} bytes into {} symbols over {} lines",
            self.data.len(),
            self.doc.symbol_count(),
            self.line + 1
        );
        Ok(self.doc)
    }

    fn syntax_error(&self, kind: SyntaxErrorKind) -> IniError {
        IniError::Syntax {
            kind,
            line: self.line + 1,
        }
    }

    /// Length of the line break starting at `at` (0 when there is none)
    fn line_break_len(&self, at: usize) -> usize {
        let mut len = 0;
        if self.data.get(at) == Some(&CARRIAGE_RETURN) {
            len += 1;
        }
        if self.data.get(at + len) == Some(&LINE_FEED) {
            len += 1;
        }
        len
    }

    /// Start offset and length of the next line break at or after `from`
    fn find_line_break(&self, from: usize) -> Option<(usize, usize)> {
        (from..self.data.len()).find_map(|at| {
            let len = self.line_break_len(at);
            (len > 0).then_some((at, len))
        })
    }

    fn next_line(&mut self) {
        match self.find_line_break(self.offset) {
            Some((start, len)) => {
                self.offset = start + len;
                self.line += 1;
            }
            None => self.offset = self.data.len(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.data.get(self.offset) {
            let len = self.line_break_len(self.offset);
            if len > 0 {
                self.offset += len;
                self.line += 1;
            } else if !is_printable(c) || c == b' ' {
                self.offset += 1;
            } else {
                break;
            }
        }
    }

    /// Offset of `target` at or after `from`, giving up at the first
    /// non-printable byte
    fn find_on_line(&self, target: u8, from: usize) -> Option<usize> {
        let rest = self.data.get(from..)?;
        rest.iter()
            .position(|&b| b == target || !is_printable(b))
            .map(|i| from + i)
            .filter(|&at| self.data[at] == target)
    }

    fn read_section(&mut self) -> Result<(), IniError> {
        let open = self.offset;
        let close = self
            .find_on_line(b']', open + 1)
            .ok_or_else(|| self.syntax_error(SyntaxErrorKind::InvalidSection))?;

        let name = to_text(&self.data[open + 1..close]);
        trace!("Section [{}] at line {}", name, self.line + 1);

        self.section = Some(self.doc.push_section(name)?);
        self.offset = close + 1;
        Ok(())
    }

    fn read_key(&mut self, section: SymbolId) -> Result<(), IniError> {
        let start = self.offset;
        let eq = self
            .find_on_line(b'=', start)
            .ok_or_else(|| self.syntax_error(SyntaxErrorKind::MissingKeyValue))?;

        if eq == start {
            return Err(self.syntax_error(SyntaxErrorKind::InvalidKeyName));
        }

        let key = to_text(trim_spaces(&self.data[start..eq]));

        let value_end = self
            .find_line_break(eq + 1)
            .map_or(self.data.len(), |(at, _)| at);
        let mut value = &self.data[eq + 1..value_end];
        if self.doc.config().trim_values {
            value = trim_spaces(value);
        }

        // Nothing visible left means an explicit empty value, not an absent one
        let value = if value.iter().any(|&b| is_printable(b) && b != b' ') {
            to_text(value)
        } else {
            String::new()
        };

        self.doc.push_key(section, key, value)?;
        self.offset = value_end;
        Ok(())
    }
}
