//! `[nav]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [nav]
//! marker = "data-softnav"                  # opt-in attribute on links
//! id_attribute = "data-softnav-id"         # explicit resource identity
//! divider_attribute = "data-softnav-divider"
//! divider = "."                            # default identity/version divider
//! cache_capacity = 15                      # page snapshots kept for back/forward
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default number of page snapshots kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 15;

/// Navigation engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Attribute that opts a link into soft navigation.
    pub marker: String,

    /// Attribute supplying an explicit resource identity on `<script>`/`<link>`.
    pub id_attribute: String,

    /// Attribute overriding the identity/version divider per element.
    pub divider_attribute: String,

    /// Divider used when an element does not override it.
    pub divider: String,

    /// Maximum number of cached page snapshots.
    pub cache_capacity: usize,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            marker: "data-softnav".into(),
            id_attribute: "data-softnav-id".into(),
            divider_attribute: "data-softnav-divider".into(),
            divider: ".".into(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl NavConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::Validation(
                "nav.cache_capacity must be at least 1".into(),
            ));
        }
        for (field, value) in [
            ("nav.marker", &self.marker),
            ("nav.id_attribute", &self.id_attribute),
            ("nav.divider_attribute", &self.divider_attribute),
            ("nav.divider", &self.divider),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Validation(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_nav_config() {
        let config = test_parse_config("[nav]\nmarker = \"data-swap\"\ncache_capacity = 4");
        assert_eq!(config.nav.marker, "data-swap");
        assert_eq!(config.nav.cache_capacity, 4);
        assert_eq!(config.nav.divider, ".");
    }

    #[test]
    fn test_nav_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.nav.marker, "data-softnav");
        assert_eq!(config.nav.id_attribute, "data-softnav-id");
        assert_eq!(config.nav.divider_attribute, "data-softnav-divider");
        assert_eq!(config.nav.cache_capacity, 15);
    }

    #[test]
    fn test_nav_config_rejects_zero_capacity() {
        let config = test_parse_config("[nav]\ncache_capacity = 0");
        assert!(config.nav.validate().is_err());
    }

    #[test]
    fn test_nav_config_rejects_empty_divider() {
        let config = test_parse_config("[nav]\ndivider = \"\"");
        assert!(config.nav.validate().is_err());
    }
}
