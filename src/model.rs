//! Committed position model: the authoritative `{field key -> position}` map.
//!
//! DESIGN
//! ======
//! `PositionMap` is the single writer-visible copy of every field's position. It is
//! loaded once per document-open and mutated only through whole-position writes: a drag
//! commit, a batch [`PositionPatch`], or a programmatic `set`. Every write clamps into
//! `[0, 95]`, so the commit invariant holds no matter which entry point produced it.
//!
//! Iteration order is insertion order. Snapping walks neighbours in this order, so the
//! map keeps it explicitly instead of relying on hash order.

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::coords::FieldPosition;
use crate::field::FieldKey;

// =============================================================================
// PATCH
// =============================================================================

/// A batch of whole-position writes produced by a layout operation.
///
/// Positions in a patch are not yet clamped; [`PositionMap::apply`] clamps on write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionPatch {
    updates: Vec<(FieldKey, FieldPosition)>,
}

impl PositionPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<FieldKey>, position: FieldPosition) {
        self.updates.push((key.into(), position));
    }

    /// Look up the pending position for `key`, if the patch touches it.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<FieldPosition> {
        self.updates
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, FieldPosition)> {
        self.updates.iter().map(|(k, p)| (k, *p))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

// =============================================================================
// POSITION MAP
// =============================================================================

/// Insertion-ordered map of committed field positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionMap {
    order: Vec<FieldKey>,
    positions: HashMap<FieldKey, FieldPosition>,
}

impl PositionMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all positions with a snapshot from external persistence.
    ///
    /// Later duplicates of a key overwrite earlier ones but keep the first slot.
    pub fn load(&mut self, entries: impl IntoIterator<Item = (FieldKey, FieldPosition)>) {
        self.order.clear();
        self.positions.clear();
        for (key, position) in entries {
            self.set(key, position);
        }
    }

    /// Write a whole position for `key`, clamped. New keys go to the end of the order.
    ///
    /// Returns the position actually stored.
    pub fn set(&mut self, key: impl Into<FieldKey>, position: FieldPosition) -> FieldPosition {
        let key = key.into();
        let clamped = position.clamped();
        if self.positions.insert(key.clone(), clamped).is_none() {
            self.order.push(key);
        }
        clamped
    }

    /// Apply every write in `patch`. Returns the number of writes.
    pub fn apply(&mut self, patch: &PositionPatch) -> usize {
        for (key, position) in patch.iter() {
            self.set(key.clone(), position);
        }
        patch.len()
    }

    /// Remove a field, returning its last position.
    pub fn remove(&mut self, key: &str) -> Option<FieldPosition> {
        let removed = self.positions.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<FieldPosition> {
        self.positions.get(key).copied()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, FieldPosition)> {
        self.order
            .iter()
            .filter_map(|k| self.positions.get(k).map(|p| (k, *p)))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.order.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<(FieldKey, FieldPosition)> for PositionMap {
    fn from_iter<I: IntoIterator<Item = (FieldKey, FieldPosition)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.load(iter);
        map
    }
}

// Serialized as a JSON object in insertion order, which is the shape the
// document store persists.
impl Serialize for PositionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, position) in self.iter() {
            map.serialize_entry(key, &position)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PositionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PositionMapVisitor;

        impl<'de> Visitor<'de> for PositionMapVisitor {
            type Value = PositionMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field keys to {top, left} positions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = PositionMap::new();
                while let Some((key, position)) = access.next_entry::<FieldKey, FieldPosition>()? {
                    map.set(key, position);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(PositionMapVisitor)
    }
}
