//! Explicit join between field keys and PDF widget names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::FieldKey;

#[cfg(test)]
#[path = "mapping_test.rs"]
mod tests;

/// `field key -> fully qualified widget name`.
///
/// Serializes as a flat JSON object so a mapping file can be edited by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: BTreeMap<FieldKey, String>,
}

impl FieldMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every key to the widget of the same name.
    #[must_use]
    pub fn identity<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<FieldKey>,
    {
        let entries = keys
            .into_iter()
            .map(|k| {
                let key = k.into();
                (key.clone(), key)
            })
            .collect();
        Self { entries }
    }

    /// Map `key` to `widget`, replacing any previous target.
    pub fn insert(&mut self, key: impl Into<FieldKey>, widget: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), widget.into())
    }

    #[must_use]
    pub fn widget_for(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Keys from `keys` with no entry in this table, sorted and deduplicated.
    #[must_use]
    pub fn validate<I, K>(&self, keys: I) -> Vec<FieldKey>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut unmapped: Vec<FieldKey> = keys
            .into_iter()
            .filter(|k| !self.entries.contains_key(k.as_ref()))
            .map(|k| k.as_ref().to_string())
            .collect();
        unmapped.sort();
        unmapped.dedup();
        unmapped
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &str)> {
        self.entries.iter().map(|(k, w)| (k, w.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
