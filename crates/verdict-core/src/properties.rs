//! Declared properties attached to tests and fixtures
//!
//! Discovery fills these bags from attributes; the engine only reads them.
//! A key may carry several values (categories, for example). Lookups that
//! expect a single value use the first one.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known property keys
pub mod keys {
    /// Case timeout in milliseconds
    pub const TIMEOUT: &str = "Timeout";
    /// Explicit request to run on a dedicated thread
    pub const REQUIRES_THREAD: &str = "RequiresThread";
    /// Free-form description
    pub const DESCRIPTION: &str = "Description";
    /// Category tag, may repeat
    pub const CATEGORY: &str = "Category";
    /// Why a case was marked ignored or not runnable
    pub const IGNORE_REASON: &str = "IgnoreReason";
}

/// A single property value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean flag
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Text value
    Text(String),
}

impl PropertyValue {
    /// Integer view of the value
    ///
    /// Text values that parse as integers are accepted, since attribute
    /// arguments frequently arrive as strings.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Boolean view of the value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Int(_) => None,
        }
    }

    /// Text view of the value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Ordered, multi-valued property map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyBag {
    entries: IndexMap<String, Vec<PropertyValue>>,
}

impl PropertyBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `key`
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.entries.entry(key.into()).or_default().push(value.into());
    }

    /// Replace all values under `key` with a single value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.entries.insert(key.into(), vec![value.into()]);
    }

    /// Builder-style [`PropertyBag::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Remove a key, returning its values
    pub fn remove(&mut self, key: &str) -> Option<Vec<PropertyValue>> {
        self.entries.shift_remove(key)
    }

    /// First value under `key`
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key).and_then(|values| values.first())
    }

    /// All values under `key`
    pub fn get_all(&self, key: &str) -> &[PropertyValue] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value under `key` as an integer
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(PropertyValue::as_int)
    }

    /// First value under `key` as a boolean
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(PropertyValue::as_bool)
    }

    /// Whether any value is declared under `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|values| !values.is_empty())
    }

    /// Whether the bag holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, values)` in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PropertyValue])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }
}
