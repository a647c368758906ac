//! Platform file layout
//!
//! Where the registry document, per-driver documents and driver libraries
//! live on disk. Discovery only ever asks a [`PathProvider`]; the stock
//! [`RegistryLayout`] follows the usual per-platform conventions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Environment variable that overrides the registry root directory
pub const RP1210_HOME_ENV: &str = "RP1210_HOME";

/// Supplies every path discovery needs
pub trait PathProvider {
    /// Path of the registry document listing installed drivers
    fn registry_path(&self) -> Result<PathBuf, CatalogError>;

    /// Path of the configuration document of driver `name`
    fn driver_document_path(&self, name: &str) -> Result<PathBuf, CatalogError>;

    /// Path of the shared library implementing driver `name`
    fn library_path(&self, name: &str) -> Result<PathBuf, CatalogError>;
}

/// Directory layout of an RP1210 installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryLayout {
    /// Root directory; the platform default is used when unset
    pub root: Option<PathBuf>,
    /// File name of the registry document inside the root
    pub registry_file: String,
    /// Subdirectory of the root holding driver libraries
    pub library_dir: Option<String>,
    /// Driver library file extension, without the dot
    pub library_extension: String,
}

impl RegistryLayout {
    /// Layout rooted at `root` with this platform's naming conventions
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    /// Resolve the root directory, falling back to the platform default
    pub fn resolve_root(&self) -> Result<PathBuf, CatalogError> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => default_root(),
        }
    }
}

#[cfg(windows)]
impl Default for RegistryLayout {
    fn default() -> Self {
        Self {
            root: None,
            registry_file: "RP121032.ini".to_string(),
            library_dir: None,
            library_extension: "dll".to_string(),
        }
    }
}

#[cfg(not(windows))]
impl Default for RegistryLayout {
    fn default() -> Self {
        Self {
            root: None,
            registry_file: "rp121032.ini".to_string(),
            library_dir: Some("so".to_string()),
            library_extension: "so".to_string(),
        }
    }
}

#[cfg(windows)]
fn default_root() -> Result<PathBuf, CatalogError> {
    Ok(std::env::var_os("SystemRoot")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\Windows")))
}

#[cfg(not(windows))]
fn default_root() -> Result<PathBuf, CatalogError> {
    dirs::home_dir()
        .map(|home| home.join("rp1210"))
        .ok_or_else(|| CatalogError::System("could not determine home directory".to_string()))
}

impl PathProvider for RegistryLayout {
    fn registry_path(&self) -> Result<PathBuf, CatalogError> {
        Ok(self.resolve_root()?.join(&self.registry_file))
    }

    fn driver_document_path(&self, name: &str) -> Result<PathBuf, CatalogError> {
        Ok(self.resolve_root()?.join(format!("{name}.ini")))
    }

    fn library_path(&self, name: &str) -> Result<PathBuf, CatalogError> {
        let mut path = self.resolve_root()?;
        if let Some(dir) = &self.library_dir {
            path.push(dir);
        }
        path.push(format!("{name}.{}", self.library_extension));
        Ok(path)
    }
}
