//! Free-form key/value payload carried by nodes.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON object used for node `data` and configuration patches.
///
/// Insertion order is not significant; equality is structural.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Vars {
    inner: Map<String, Value>,
}

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one.
    pub fn set<V: Into<Value>>(
        &mut self,
        key: &str,
        value: V,
    ) {
        self.inner.insert(key.to_string(), value.into());
    }

    /// Builder form of [`Vars::set`].
    pub fn with<V: Into<Value>>(
        mut self,
        key: &str,
        value: V,
    ) -> Self {
        self.set(key, value);
        self
    }

    pub fn get_str(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.inner.get(key).and_then(Value::as_str)
    }

    /// Shallow merge: every key of `patch` overwrites the same key here.
    pub fn merge(
        &mut self,
        patch: &Vars,
    ) {
        for (k, v) in patch.inner.iter() {
            self.inner.insert(k.clone(), v.clone());
        }
    }
}

impl Deref for Vars {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for Vars {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl From<Map<String, Value>> for Vars {
    fn from(inner: Map<String, Value>) -> Self {
        Self {
            inner,
        }
    }
}

/// Non-object values become an empty map.
impl From<Value> for Vars {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(inner) => Self {
                inner,
            },
            _ => Self::default(),
        }
    }
}

impl From<Vars> for Value {
    fn from(vars: Vars) -> Self {
        Value::Object(vars.inner)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_merge_overwrites_and_keeps() {
        let mut data = Vars::from(json!({"label": "Score", "threshold": 10}));
        data.merge(&Vars::new().with("threshold", 42).with("outputField", "score"));

        assert_eq!(Value::from(data), json!({"label": "Score", "threshold": 42, "outputField": "score"}));
    }

    #[test]
    fn test_from_non_object_is_empty() {
        assert!(Vars::from(json!([1, 2])).is_empty());
    }
}
