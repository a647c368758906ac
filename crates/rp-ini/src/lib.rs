//! RP1210 INI Library
//!
//! This crate parses the INI dialect used by RP1210 registry and vendor
//! configuration files and answers lookups against the parsed tree.
//!
//! # Format
//!
//! - Sections: `[Name]` (empty names are legal)
//! - Keys: `Name=Value` inside a section (empty values are legal and are
//!   distinct from a missing key)
//! - Comments: lines starting with `;`
//! - Line endings: CR, LF or CRLF
//!
//! Duplicate sections and keys are kept in the tree. Lookups resolve them by
//! scan direction: [`DuplicateMode::KeepFirst`] walks forward and returns the
//! earliest match, [`DuplicateMode::KeepLast`] walks backward and returns the
//! latest one.
//!
//! # Example
//!
//! ```rust
//! use rp_ini::{IniConfig, IniDocument};
//!
//! let doc = IniDocument::parse(b"[RP1210Support]\nAPIImplementations=DGDPA5MA\n", IniConfig::default())
//!     .unwrap();
//!
//! assert!(doc.has_section("RP1210Support"));
//! assert_eq!(doc.read_key("RP1210Support", "APIImplementations").unwrap(), "DGDPA5MA");
//! ```

pub mod document;
pub mod error;
pub mod number;
pub mod parser;
pub mod store;

pub use document::{IniDocument, Symbol, SymbolId, SymbolKind};
pub use error::{CodedError, ErrorCode, ErrorContext, IniError, SyntaxErrorKind};
pub use number::parse_integer;
pub use store::{Keys, Sections};

/// Which of several same-named sections or keys a lookup resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DuplicateMode {
    /// The first declaration wins (forward scan)
    #[default]
    KeepFirst,
    /// The last declaration overrides earlier ones (backward scan)
    KeepLast,
}

/// Parse and lookup behaviour of one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct IniConfig {
    /// Duplicate resolution policy
    pub duplicate_mode: DuplicateMode,
    /// Strip surrounding spaces from values
    pub trim_values: bool,
    /// Compare section and key names ignoring ASCII case
    pub case_insensitive_keys: bool,
}

impl IniConfig {
    /// Config with the given duplicate mode and default everything else
    pub fn with_duplicate_mode(duplicate_mode: DuplicateMode) -> Self {
        Self {
            duplicate_mode,
            ..Self::default()
        }
    }

    pub(crate) fn names_match(&self, a: &str, b: &str) -> bool {
        if self.case_insensitive_keys {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }
}

impl Default for IniConfig {
    fn default() -> Self {
        Self {
            duplicate_mode: DuplicateMode::KeepFirst,
            trim_values: true,
            case_insensitive_keys: true,
        }
    }
}
