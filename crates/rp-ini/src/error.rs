//! Error types for INI parsing and lookups
//!
//! Every failure in the workspace maps onto a stable numeric [`ErrorCode`].
//! Callers that want a "last error" slot thread an [`ErrorContext`] through
//! by reference instead of relying on process-wide state.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Stable numeric error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum ErrorCode {
    NoError = 0,
    BadArgument = -1,
    AllocationFailure = -2,
    FileNotFound = -3,
    FileIo = -4,
    ValueOutOfRange = -5,
    General = -6,
    InvalidSection = -7,
    UnexpectedSymbol = -8,
    InvalidKeyName = -9,
    KeyNotFound = -10,
    MissingKeyValue = -11,
    SectionNotFound = -12,
    SystemError = -13,
}

impl ErrorCode {
    /// Raw numeric value of the code
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns true for every code other than [`ErrorCode::NoError`]
    pub fn is_error(self) -> bool {
        self != ErrorCode::NoError
    }

    /// Short human-readable summary of the code
    pub fn summary(self) -> &'static str {
        match self {
            ErrorCode::NoError => "no error",
            ErrorCode::BadArgument => "invalid argument",
            ErrorCode::AllocationFailure => "memory allocation failure",
            ErrorCode::FileNotFound => "file not found",
            ErrorCode::FileIo => "file I/O error",
            ErrorCode::ValueOutOfRange => "value out of range",
            ErrorCode::General => "an error has occurred",
            ErrorCode::InvalidSection => "illegal INI section name",
            ErrorCode::UnexpectedSymbol => "illegal INI character encountered",
            ErrorCode::InvalidKeyName => "illegal INI key name",
            ErrorCode::KeyNotFound => "INI key not found",
            ErrorCode::MissingKeyValue => "INI key value not found",
            ErrorCode::SectionNotFound => "INI section not found",
            ErrorCode::SystemError => "a system call error has occurred",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.summary(), self.as_i32())
    }
}

/// Which syntax rule a malformed line broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    /// `[` without a closing `]` on the same line
    InvalidSection,
    /// Key line without a `=` separator
    MissingKeyValue,
    /// `=` with nothing before it
    InvalidKeyName,
    /// Printable character outside of any section
    UnexpectedSymbol,
}

impl SyntaxErrorKind {
    pub fn code(self) -> ErrorCode {
        match self {
            SyntaxErrorKind::InvalidSection => ErrorCode::InvalidSection,
            SyntaxErrorKind::MissingKeyValue => ErrorCode::MissingKeyValue,
            SyntaxErrorKind::InvalidKeyName => ErrorCode::InvalidKeyName,
            SyntaxErrorKind::UnexpectedSymbol => ErrorCode::UnexpectedSymbol,
        }
    }
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SyntaxErrorKind::InvalidSection => "unterminated section name",
            SyntaxErrorKind::MissingKeyValue => "missing key/value separator",
            SyntaxErrorKind::InvalidKeyName => "empty key name",
            SyntaxErrorKind::UnexpectedSymbol => "unexpected symbol",
        };
        f.write_str(text)
    }
}

/// Errors produced while loading, parsing or querying an INI document
#[derive(Debug, Error)]
pub enum IniError {
    /// Buffer or symbol arena could not grow
    #[error("memory allocation failure")]
    AllocationFailure,

    /// Document file does not exist
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Document file exists but could not be read
    #[error("failed to read {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// OS-level failure other than a missing file
    #[error("system error on {}: {source}", path.display())]
    System {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed input, with the 1-based line it was found on
    #[error("{kind} at line {line}")]
    Syntax { kind: SyntaxErrorKind, line: usize },

    #[error("section not found: [{section}]")]
    SectionNotFound { section: String },

    #[error("key not found: [{section}] {key}")]
    KeyNotFound { section: String, key: String },

    /// Key name exists but has no value symbol attached
    #[error("key has no value: [{section}] {key}")]
    MissingKeyValue { section: String, key: String },

    #[error("not an integer: {value:?}")]
    NotAnInteger { value: String },

    #[error("value out of range: {value}")]
    OutOfRange { value: String },

    #[error("invalid argument: {0}")]
    BadArgument(String),
}

impl IniError {
    /// The 1-based line of a syntax error
    pub fn line(&self) -> Option<usize> {
        match self {
            IniError::Syntax { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// True when the error only reports an absent section or key
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            IniError::SectionNotFound { .. } | IniError::KeyNotFound { .. }
        )
    }
}

/// Errors that carry a stable [`ErrorCode`]
pub trait CodedError: std::error::Error {
    fn code(&self) -> ErrorCode;
}

impl CodedError for IniError {
    fn code(&self) -> ErrorCode {
        match self {
            IniError::AllocationFailure => ErrorCode::AllocationFailure,
            IniError::FileNotFound { .. } => ErrorCode::FileNotFound,
            IniError::FileIo { .. } => ErrorCode::FileIo,
            IniError::System { .. } => ErrorCode::SystemError,
            IniError::Syntax { kind, .. } => kind.code(),
            IniError::SectionNotFound { .. } => ErrorCode::SectionNotFound,
            IniError::KeyNotFound { .. } => ErrorCode::KeyNotFound,
            IniError::MissingKeyValue { .. } => ErrorCode::MissingKeyValue,
            IniError::NotAnInteger { .. } => ErrorCode::BadArgument,
            IniError::OutOfRange { .. } => ErrorCode::ValueOutOfRange,
            IniError::BadArgument(_) => ErrorCode::BadArgument,
        }
    }
}

/// Last-error slot passed explicitly by reference
///
/// Holds the code and description of the most recent failure recorded into
/// it. It is advisory: a later [`ErrorContext::capture`] overwrites it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    code: ErrorCode,
    description: String,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            code: ErrorCode::NoError,
            description: ErrorCode::NoError.summary().to_string(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_error(&self) -> bool {
        self.code.is_error()
    }

    /// Reset to the no-error state
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Store the code and rendered message of `err`
    pub fn record<E: CodedError + ?Sized>(&mut self, err: &E) {
        self.code = err.code();
        self.description = err.to_string();
    }

    /// Record the outcome of a fallible call and hand back its value
    ///
    /// Success clears the slot; failure records the error and returns `None`.
    pub fn capture<T, E: CodedError>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => {
                self.clear();
                Some(value)
            }
            Err(e) => {
                self.record(&e);
                None
            }
        }
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}
