//! Tracked head resources of the live document.

use rustc_hash::FxHashMap;

use super::resource::classify;
use crate::config::NavConfig;
use crate::markup::HeadElement;

/// Resource identity -> version for everything present in the live head.
#[derive(Debug, Default, Clone)]
pub struct HeadRegistry {
    entries: FxHashMap<String, String>,
}

impl HeadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the elements currently in the live head.
    pub fn from_live_head(elements: &[HeadElement], config: &NavConfig) -> Self {
        let mut registry = Self::new();
        registry.seed(elements, config);
        registry
    }

    /// Register every trackable element. Titles are not tracked.
    pub fn seed(&mut self, elements: &[HeadElement], config: &NavConfig) {
        for element in elements {
            if let Some((identity, version)) = classify(element, config).registry_pair() {
                self.insert(identity, version);
            }
        }
    }

    pub fn insert(&mut self, identity: impl Into<String>, version: impl Into<String>) {
        self.entries.insert(identity.into(), version.into());
    }

    pub fn version(&self, identity: &str) -> Option<&str> {
        self.entries.get(identity).map(String::as_str)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_from_live_head() {
        let head = vec![
            HeadElement::new("meta", vec![("charset".into(), Some("utf-8".into()))], ""),
            HeadElement::title("Home"),
            HeadElement::stylesheet("/site.v1.css"),
            HeadElement::script("/blog.a.js"),
        ];
        let registry = HeadRegistry::from_live_head(&head, &NavConfig::default());

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.version("/blog"), Some("a"));
        assert_eq!(registry.version("/site"), Some("v1"));
        assert_eq!(registry.version(r#"<meta charset="utf-8">"#), Some(""));
    }

    #[test]
    fn test_unversioned_resource_is_known() {
        let head = vec![HeadElement::script("/vendor/htmx")];
        let registry = HeadRegistry::from_live_head(&head, &NavConfig::default());
        assert!(registry.contains("/vendor/htmx"));
        assert_eq!(registry.version("/vendor/htmx"), Some(""));
    }
}
