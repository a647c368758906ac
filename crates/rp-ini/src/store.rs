//! Lookups over a parsed document
//!
//! Every lookup walks a sibling chain in the direction picked by the
//! document's [`DuplicateMode`]: forward from the head for `KeepFirst`,
//! backward from the tail for `KeepLast`. The first match in that direction
//! wins, so duplicates never have to be removed from the tree.

use crate::document::{IniDocument, Symbol, SymbolId, SymbolKind};
use crate::error::IniError;
use crate::{number, DuplicateMode};

/// Iterator over one sibling chain in duplicate-mode direction
#[derive(Debug, Clone)]
struct Chain<'a> {
    doc: &'a IniDocument,
    cursor: Option<SymbolId>,
    backward: bool,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Symbol;

    fn next(&mut self) -> Option<Self::Item> {
        let symbol = self.doc.symbol(self.cursor?)?;
        self.cursor = if self.backward {
            symbol.prev()
        } else {
            symbol.next()
        };
        Some(symbol)
    }
}

impl IniDocument {
    fn chain(&self, head: Option<SymbolId>, tail: Option<SymbolId>) -> Chain<'_> {
        let backward = self.config().duplicate_mode == DuplicateMode::KeepLast;
        Chain {
            doc: self,
            cursor: if backward { tail } else { head },
            backward,
        }
    }

    fn find_section(&self, section: &str) -> Option<&Symbol> {
        self.chain(self.first_section(), self.last_section())
            .find(|s| s.kind() == SymbolKind::SectionName && self.config().names_match(s.text(), section))
    }

    fn value_of(&self, key: &Symbol) -> Option<&Symbol> {
        key.first_child()
            .and_then(|id| self.symbol(id))
            .filter(|s| s.kind() == SymbolKind::KeyValue)
    }

    fn resolve_key(&self, section: &str, key: &str) -> Result<&Symbol, IniError> {
        let section_sym = self
            .find_section(section)
            .ok_or_else(|| IniError::SectionNotFound {
                section: section.to_string(),
            })?;

        let key_sym = self
            .chain(section_sym.first_child(), section_sym.last_child())
            .find(|s| s.kind() == SymbolKind::KeyName && self.config().names_match(s.text(), key))
            .ok_or_else(|| IniError::KeyNotFound {
                section: section.to_string(),
                key: key.to_string(),
            })?;

        self.value_of(key_sym)
            .ok_or_else(|| IniError::MissingKeyValue {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    /// Whether a section with this name exists
    pub fn has_section(&self, section: &str) -> bool {
        self.find_section(section).is_some()
    }

    /// Whether the resolved section contains this key with a value
    pub fn has_key(&self, section: &str, key: &str) -> bool {
        self.resolve_key(section, key).is_ok()
    }

    /// Borrow the resolved value of a key
    pub fn read_key(&self, section: &str, key: &str) -> Result<&str, IniError> {
        self.resolve_key(section, key).map(Symbol::text)
    }

    /// Byte length of the resolved value
    pub fn read_key_length(&self, section: &str, key: &str) -> Result<usize, IniError> {
        self.read_key(section, key).map(str::len)
    }

    /// Copy the resolved value into `dest`
    ///
    /// At most `dest.len() - 1` value bytes are copied; the rest of `dest` is
    /// zero-filled so the copy is always NUL-terminated. Returns the number
    /// of value bytes copied, which is less than
    /// [`read_key_length`](Self::read_key_length) when truncated.
    pub fn read_key_into(&self, section: &str, key: &str, dest: &mut [u8]) -> Result<usize, IniError> {
        if dest.is_empty() {
            return Err(IniError::BadArgument("destination buffer is empty".into()));
        }

        let value = self.read_key(section, key)?.as_bytes();
        let copied = value.len().min(dest.len() - 1);
        dest[..copied].copy_from_slice(&value[..copied]);
        dest[copied..].fill(0);
        Ok(copied)
    }

    /// Read the resolved value as an `i32` literal
    pub fn read_int(&self, section: &str, key: &str) -> Result<i32, IniError> {
        number::parse_integer(self.read_key(section, key)?)
    }

    /// Distinct keys of a section with their resolved values
    ///
    /// Keys come out in duplicate-mode direction (document order for
    /// `KeepFirst`, reverse for `KeepLast`), each name once. The iterator is
    /// lazy and can be cloned to restart from the same point.
    pub fn keys<'a>(&'a self, section: &str) -> Result<Keys<'a>, IniError> {
        let section_sym = self
            .find_section(section)
            .ok_or_else(|| IniError::SectionNotFound {
                section: section.to_string(),
            })?;

        Ok(Keys {
            doc: self,
            section: section_sym.text(),
            chain: self.chain(section_sym.first_child(), section_sym.last_child()),
            seen: Vec::new(),
            done: false,
        })
    }

    /// Distinct section names in duplicate-mode direction
    pub fn sections(&self) -> Sections<'_> {
        Sections {
            doc: self,
            chain: self.chain(self.first_section(), self.last_section()),
            seen: Vec::new(),
        }
    }
}

/// Deduplicated key/value pairs of one section
///
/// A key without a value symbol yields one [`IniError::MissingKeyValue`]
/// and ends the iteration.
#[derive(Debug, Clone)]
pub struct Keys<'a> {
    doc: &'a IniDocument,
    section: &'a str,
    chain: Chain<'a>,
    seen: Vec<&'a str>,
    done: bool,
}

impl<'a> Iterator for Keys<'a> {
    type Item = Result<(&'a str, &'a str), IniError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        for key in self.chain.by_ref() {
            if key.kind() != SymbolKind::KeyName
                || self
                    .seen
                    .iter()
                    .any(|seen| self.doc.config().names_match(seen, key.text()))
            {
                continue;
            }
            self.seen.push(key.text());

            return match self.doc.value_of(key) {
                Some(value) => Some(Ok((key.text(), value.text()))),
                None => {
                    self.done = true;
                    Some(Err(IniError::MissingKeyValue {
                        section: self.section.to_string(),
                        key: key.text().to_string(),
                    }))
                }
            };
        }

        self.done = true;
        None
    }
}

/// Deduplicated section names of a document
#[derive(Debug, Clone)]
pub struct Sections<'a> {
    doc: &'a IniDocument,
    chain: Chain<'a>,
    seen: Vec<&'a str>,
}

impl<'a> Iterator for Sections<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        for section in self.chain.by_ref() {
            if section.kind() != SymbolKind::SectionName
                || self
                    .seen
                    .iter()
                    .any(|seen| self.doc.config().names_match(seen, section.text()))
            {
                continue;
            }
            self.seen.push(section.text());
            return Some(section.text());
        }
        None
    }
}
