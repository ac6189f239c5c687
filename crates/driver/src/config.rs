use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Keyword arguments forwarded verbatim to the policy and every callback.
///
/// The driver never reads these values; they exist so that collaborators can
/// be parameterised per run (e.g. `{"training": true}` for a train driver and
/// `{"training": false}` for an eval driver sharing the same callbacks).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config(BTreeMap<String, Value>);

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object.
    ///
    /// # Errors
    ///
    /// Returns the parse error if `json` is not a JSON object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_getters() {
        let config = Config::new().with("training", true).with("lr", 0.5).with("name", "eval");
        assert_eq!(config.get_bool("training"), Some(true));
        assert_eq!(config.get_f64("lr"), Some(0.5));
        assert_eq!(config.get_str("name"), Some("eval"));
        assert_eq!(config.get_u64("missing"), None);
        assert_eq!(config.len(), 3);
    }

    #[test]
    fn parses_json_objects_only() {
        let config = Config::from_json(r#"{"horizon": 15, "mode": "train"}"#).unwrap();
        assert_eq!(config.get_u64("horizon"), Some(15));
        assert!(Config::from_json("[1, 2]").is_err());
    }
}
