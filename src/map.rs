//! Ordered field map for record values.
//!
//! [`RecordMap`] wraps an [`IndexMap`] so a record's fields keep their declaration
//! order, which is the order the layout model assigns columns in.
//!
//! ## Examples
//!
//! ```rust
//! use serde_sheet::{RecordMap, Value};
//!
//! let mut map = RecordMap::new();
//! map.insert("code".to_string(), Value::from("a"));
//! map.insert("num".to_string(), Value::from(1));
//!
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["code", "num"]);
//! ```

use indexmap::IndexMap;

use crate::Value;

/// An ordered map of field names to values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordMap(IndexMap<String, Value>);

impl RecordMap {
    /// Creates an empty `RecordMap`.
    #[must_use]
    pub fn new() -> Self {
        RecordMap(IndexMap::new())
    }

    /// Creates an empty `RecordMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RecordMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a field, returning the previous value if the field was present.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value of a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the value of a field.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Returns the value of a field, inserting the result of `default` when absent.
    pub fn get_or_insert_with<F>(&mut self, key: &str, default: F) -> &mut Value
    where
        F: FnOnce() -> Value,
    {
        self.0.entry(key.to_string()).or_insert_with(default)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the field names, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the fields, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl IntoIterator for RecordMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Value)> for RecordMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        RecordMap(IndexMap::from_iter(iter))
    }
}
