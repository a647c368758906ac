//! Parsed document storage
//!
//! All symbols of a document live in one arena and refer to each other by
//! [`SymbolId`]. Sibling chains are doubly linked (document order both ways)
//! and only ever appended to while parsing.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::debug;

use crate::error::IniError;
use crate::{parser, IniConfig};

/// Index of a symbol inside its document's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(usize);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Syntactic level of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    SectionName,
    KeyName,
    KeyValue,
}

/// One node of the section/key/value tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    kind: SymbolKind,
    text: String,
    prev: Option<SymbolId>,
    next: Option<SymbolId>,
    first_child: Option<SymbolId>,
    last_child: Option<SymbolId>,
}

impl Symbol {
    fn new(kind: SymbolKind, text: String, prev: Option<SymbolId>) -> Self {
        Self {
            kind,
            text,
            prev,
            next: None,
            first_child: None,
            last_child: None,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Previous sibling in document order
    pub fn prev(&self) -> Option<SymbolId> {
        self.prev
    }

    /// Next sibling in document order
    pub fn next(&self) -> Option<SymbolId> {
        self.next
    }

    pub fn first_child(&self) -> Option<SymbolId> {
        self.first_child
    }

    pub fn last_child(&self) -> Option<SymbolId> {
        self.last_child
    }
}

/// A parsed INI document
///
/// Produced by [`IniDocument::parse`] or [`IniDocument::open`] and immutable
/// afterwards. Dropping it frees the whole tree in one pass over the arena.
#[derive(Debug, Clone)]
pub struct IniDocument {
    config: IniConfig,
    symbols: Vec<Symbol>,
    first_section: Option<SymbolId>,
    last_section: Option<SymbolId>,
}

impl IniDocument {
    pub(crate) fn empty(config: IniConfig) -> Self {
        Self {
            config,
            symbols: Vec::new(),
            first_section: None,
            last_section: None,
        }
    }

    /// Parse a document from raw bytes
    pub fn parse(data: &[u8], config: IniConfig) -> Result<Self, IniError> {
        parser::parse(data, config)
    }

    /// Read and parse a document from disk
    pub fn open(path: impl AsRef<Path>, config: IniConfig) -> Result<Self, IniError> {
        let path = path.as_ref();
        let classify = |source: io::Error| match source.kind() {
            io::ErrorKind::NotFound => IniError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => IniError::System {
                path: path.to_path_buf(),
                source,
            },
        };

        let metadata = std::fs::metadata(path).map_err(classify)?;
        let size = usize::try_from(metadata.len()).map_err(|_| IniError::AllocationFailure)?;

        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| IniError::AllocationFailure)?;

        let mut file = File::open(path).map_err(classify)?;
        file.read_to_end(&mut data)
            .map_err(|source| IniError::FileIo {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("Parsing {} ({} bytes)", path.display(), data.len());
        Self::parse(&data, config)
    }

    pub fn config(&self) -> &IniConfig {
        &self.config
    }

    /// Look up a symbol by id
    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0)
    }

    /// Total number of symbols of every kind
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Head of the section chain
    pub fn first_section(&self) -> Option<SymbolId> {
        self.first_section
    }

    /// Tail of the section chain
    pub fn last_section(&self) -> Option<SymbolId> {
        self.last_section
    }

    fn alloc(&mut self, symbol: Symbol) -> Result<SymbolId, IniError> {
        self.symbols
            .try_reserve(1)
            .map_err(|_| IniError::AllocationFailure)?;
        let id = SymbolId(self.symbols.len());
        self.symbols.push(symbol);
        Ok(id)
    }

    /// Append a section to the end of the section chain
    pub(crate) fn push_section(&mut self, name: String) -> Result<SymbolId, IniError> {
        let prev = self.last_section;
        let id = self.alloc(Symbol::new(SymbolKind::SectionName, name, prev))?;

        match prev {
            Some(last) => self.symbols[last.0].next = Some(id),
            None => self.first_section = Some(id),
        }
        self.last_section = Some(id);
        Ok(id)
    }

    /// Append a key and its value under `section`
    pub(crate) fn push_key(
        &mut self,
        section: SymbolId,
        key: String,
        value: String,
    ) -> Result<SymbolId, IniError> {
        let key_id = self.append_child(section, SymbolKind::KeyName, key)?;
        self.append_child(key_id, SymbolKind::KeyValue, value)?;
        Ok(key_id)
    }

    fn append_child(
        &mut self,
        parent: SymbolId,
        kind: SymbolKind,
        text: String,
    ) -> Result<SymbolId, IniError> {
        let prev = self.symbols[parent.0].last_child;
        let id = self.alloc(Symbol::new(kind, text, prev))?;

        match prev {
            Some(last) => self.symbols[last.0].next = Some(id),
            None => self.symbols[parent.0].first_child = Some(id),
        }
        self.symbols[parent.0].last_child = Some(id);
        Ok(id)
    }

    #[cfg(test)]
    pub(crate) fn detach_children(&mut self, id: SymbolId) {
        self.symbols[id.0].first_child = None;
        self.symbols[id.0].last_child = None;
    }
}
