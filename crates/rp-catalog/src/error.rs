//! Error types for driver discovery

use std::io;
use std::path::PathBuf;

use rp_ini::{CodedError, ErrorCode, IniError};
use thiserror::Error;

/// Errors that can occur while discovering or querying drivers
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Registry or driver document could not be loaded or read
    #[error(transparent)]
    Document(#[from] IniError),

    /// Platform could not supply a required directory
    #[error("system error: {0}")]
    System(String),

    /// Index out of bounds or malformed value passed to a query
    #[error("invalid argument: {0}")]
    BadArgument(String),

    /// Discovery configuration file could not be read
    #[error("failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Discovery configuration file is not valid JSON for the schema
    #[error("invalid config {}: {source}", path.display())]
    ConfigFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CodedError for CatalogError {
    fn code(&self) -> ErrorCode {
        match self {
            CatalogError::Document(e) => e.code(),
            CatalogError::System(_) => ErrorCode::SystemError,
            CatalogError::BadArgument(_) => ErrorCode::BadArgument,
            CatalogError::ConfigIo { .. } => ErrorCode::FileIo,
            CatalogError::ConfigFormat { .. } => ErrorCode::BadArgument,
        }
    }
}
