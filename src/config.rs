// src/config.rs

//! Versionlock configuration
//!
//! Read from a TOML file:
//!
//! ```toml
//! [main]
//! locklist = "/etc/versionlock/versionlock.list"
//! follow_obsoletes = false
//! show_hint = true
//! ```

use crate::error::{Error, Result};
use crate::locklist::LockListStore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/versionlock/versionlock.toml";

/// Default lock list location
pub const DEFAULT_LOCKLIST: &str = "/etc/versionlock/versionlock.list";

/// Settings shared by every command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lock list path or URL
    pub locklist: String,

    /// Also hold back packages that obsolete a locked one
    pub follow_obsoletes: bool,

    /// Log how many updates the locks are holding back
    pub show_hint: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locklist: DEFAULT_LOCKLIST.to_string(),
            follow_obsoletes: false,
            show_hint: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    main: Config,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {}", e)))?;
        Ok(file.main)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Load an explicit file, or the default one if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    debug!("No configuration at {}, using defaults", DEFAULT_CONFIG_PATH);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Store for the configured lock list
    pub fn store(&self) -> Result<LockListStore> {
        if self.locklist.trim().is_empty() {
            return Err(Error::ConfigError("Locklist not set".to_string()));
        }
        Ok(LockListStore::open(&self.locklist))
    }
}
