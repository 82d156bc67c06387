//! Opaque page state carried from `beforeunload` to `onload`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// String-keyed state object supplied by page code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageState(Map<String, Value>);

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Copy every key of `other` into `self`, overwriting on collision.
    pub fn merge(&mut self, other: PageState) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for PageState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Non-object values become an empty state.
impl From<Value> for PageState {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_overwrites() {
        let mut state = PageState::from(json!({ "a": 1, "b": 2 }));
        state.merge(PageState::from(json!({ "b": 3, "c": 4 })));
        assert_eq!(state.len(), 3);
        assert_eq!(state.get("b"), Some(&json!(3)));
    }

    #[test]
    fn test_non_object_is_empty() {
        assert!(PageState::from(json!([1, 2])).is_empty());
        assert!(PageState::from(Value::Null).is_empty());
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let mut state = PageState::new();
        state.insert("scroll", 120);
        assert_eq!(serde_json::to_string(&state).unwrap(), r#"{"scroll":120}"#);
    }
}
