//! Discovery configuration

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use rp_ini::IniConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CatalogError;
use crate::platform::{RegistryLayout, RP1210_HOME_ENV};

/// RP1210 revision whose vendor fields are read
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Rp1210Revision {
    A,
    B,
    #[default]
    C,
}

/// Settings for one discovery run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Where the registry and driver files live
    pub layout: RegistryLayout,
    /// Parser settings applied to every document
    pub ini: IniConfig,
    /// Which vendor fields to read
    pub revision: Rp1210Revision,
}

impl DiscoveryConfig {
    /// Load settings from a JSON file
    ///
    /// Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| CatalogError::ConfigFormat {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded discovery config from {}", path.display());
        Ok(config)
    }

    /// Apply the `RP1210_HOME` environment override
    pub fn with_env_overrides(self) -> Self {
        self.with_home_override(std::env::var_os(RP1210_HOME_ENV))
    }

    fn with_home_override(mut self, home: Option<OsString>) -> Self {
        if let Some(home) = home.filter(|h| !h.is_empty()) {
            debug!("Registry root overridden by {}", RP1210_HOME_ENV);
            self.layout.root = Some(PathBuf::from(home));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_ini::DuplicateMode;

    #[test]
    fn test_default_config() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.revision, Rp1210Revision::C);
        assert_eq!(config.ini, IniConfig::default());
        assert_eq!(config.layout.root, None);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("discovery.json");
        std::fs::write(
            &path,
            r#"{"revision": "A", "ini": {"duplicate_mode": "KeepLast"}}"#,
        )
        .unwrap();

        let config = DiscoveryConfig::load(&path).unwrap();
        assert_eq!(config.revision, Rp1210Revision::A);
        assert_eq!(config.ini.duplicate_mode, DuplicateMode::KeepLast);
        assert!(config.ini.trim_values);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = DiscoveryConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(missing, CatalogError::ConfigIo { .. }));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let bad = DiscoveryConfig::load(&path).unwrap_err();
        assert!(matches!(bad, CatalogError::ConfigFormat { .. }));
    }

    #[test]
    fn test_home_override() {
        let config = DiscoveryConfig::default().with_home_override(Some("/data/rp1210".into()));
        assert_eq!(config.layout.root, Some(PathBuf::from("/data/rp1210")));

        let config = DiscoveryConfig::default().with_home_override(Some(OsString::new()));
        assert_eq!(config.layout.root, None);
    }

    #[test]
    fn test_revision_ordering() {
        assert!(Rp1210Revision::A < Rp1210Revision::B);
        assert!(Rp1210Revision::B < Rp1210Revision::C);
    }
}
