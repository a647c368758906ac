//! Inspector settings
//!
//! Discovery settings come from, in increasing priority: built-in defaults,
//! `~/.config/rp-inspect/discovery.json` (or `--config`), the `RP1210_HOME`
//! environment variable, and `--root`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rp_catalog::DiscoveryConfig;
use tracing::{debug, warn};

/// Default settings file location
fn settings_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".config").join("rp-inspect").join("discovery.json"))
}

/// Build the discovery config for this run
pub fn resolve(explicit: Option<&Path>, root: Option<PathBuf>) -> Result<DiscoveryConfig> {
    let config = match explicit {
        Some(path) => DiscoveryConfig::load(path)
            .with_context(|| format!("could not load config {}", path.display()))?,
        None => load_default(),
    };

    Ok(apply_root(config.with_env_overrides(), root))
}

/// Load the default settings file, ignoring it when absent or unreadable
fn load_default() -> DiscoveryConfig {
    let Some(path) = settings_path().filter(|p| p.exists()) else {
        return DiscoveryConfig::default();
    };

    match DiscoveryConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring settings file: {}", e);
            DiscoveryConfig::default()
        }
    }
}

fn apply_root(mut config: DiscoveryConfig, root: Option<PathBuf>) -> DiscoveryConfig {
    if let Some(root) = root {
        debug!("Using RP1210 root {}", root.display());
        config.layout.root = Some(root);
    }
    config
}
