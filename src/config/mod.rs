//! Configuration management for `softnav.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── error.rs    # ConfigError
//! ├── nav.rs      # [nav] section
//! └── mod.rs      # Config (this file)
//! ```
//!
//! Every field has a default, so a missing file is equivalent to an empty one.

mod error;
mod nav;

pub use error::ConfigError;
pub use nav::{DEFAULT_CACHE_CAPACITY, NavConfig};

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{debug, log};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing softnav.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Navigation engine settings
    #[serde(default)]
    pub nav: NavConfig,
}

impl Config {
    /// Load and validate a config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        for field in &ignored {
            log!("config"; "unknown field `{}` in {}, ignoring", field, path.display());
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a config file, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_path(path)
        } else {
            debug!("config"; "{} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.nav.validate()
    }
}

/// Parse config content in tests, rejecting unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    let (parsed, ignored) = Config::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
