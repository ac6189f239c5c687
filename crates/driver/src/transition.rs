use crate::array::Array;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named arrays with a schema chosen at runtime by the environment.
pub type Fields = BTreeMap<String, Array>;
pub type Observation = Fields;
pub type Action = Fields;

pub const REWARD: &str = "reward";
pub const DISCOUNT: &str = "discount";

/// One slot's record of a single step: observation, action, reward and
/// discount merged into a single field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transition(Fields);

impl Transition {
    #[must_use]
    pub fn new(fields: Fields) -> Self {
        Self(fields)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Array> {
        self.0.get(key)
    }

    #[must_use]
    pub fn reward(&self) -> Option<&Array> {
        self.get(REWARD)
    }

    #[must_use]
    pub fn discount(&self) -> Option<&Array> {
        self.get(DISCOUNT)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.0
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Fields {
        &mut self.0
    }

    #[must_use]
    pub fn into_fields(self) -> Fields {
        self.0
    }
}

/// A finished episode stored field by field: every array's leading axis is
/// time, with index 0 holding the reset observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Episode(Fields);

impl Episode {
    pub(crate) fn new(fields: Fields) -> Self {
        Self(fields)
    }

    /// Number of time steps, including the reset step.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0
            .values()
            .next()
            .and_then(|a| a.shape().first().copied())
            .unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Array> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Sum of the `reward` sequence.
    #[must_use]
    pub fn total_reward(&self) -> f64 {
        self.get(REWARD).map_or(0.0, Array::sum)
    }

    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.0
    }

    #[must_use]
    pub fn into_fields(self) -> Fields {
        self.0
    }
}
