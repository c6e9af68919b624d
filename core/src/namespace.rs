//! Parse results keyed by destination name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parsed values keyed by destination field name.
///
/// Serializes as a plain JSON object, so a namespace can be printed or
/// compared against `serde_json::json!` literals directly.
///
/// # Examples
///
/// ```
/// use argpass::Namespace;
/// use serde_json::json;
///
/// let ns: Namespace = [
///     ("file".to_string(), json!("test.txt")),
///     ("rest".to_string(), json!(["-v", "x"])),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(ns.get_str("file"), Some("test.txt"));
/// assert_eq!(ns.get_strings("rest"), Some(vec!["-v", "x"]));
/// assert_eq!(serde_json::to_value(&ns).unwrap()["file"], "test.txt");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace {
    values: BTreeMap<String, Value>,
}

impl Namespace {
    /// Creates an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value stored at `dest`.
    pub fn get(&self, dest: &str) -> Option<&Value> {
        self.values.get(dest)
    }

    /// Returns the value at `dest` if it is a string.
    pub fn get_str(&self, dest: &str) -> Option<&str> {
        self.get(dest).and_then(Value::as_str)
    }

    /// Returns the value at `dest` if it is an integer.
    pub fn get_i64(&self, dest: &str) -> Option<i64> {
        self.get(dest).and_then(Value::as_i64)
    }

    /// Returns the value at `dest` if it is a boolean.
    pub fn get_bool(&self, dest: &str) -> Option<bool> {
        self.get(dest).and_then(Value::as_bool)
    }

    /// Returns the value at `dest` if it is a list made only of strings.
    pub fn get_strings(&self, dest: &str) -> Option<Vec<&str>> {
        self.get(dest)?
            .as_array()?
            .iter()
            .map(Value::as_str)
            .collect()
    }

    /// Returns `true` if `dest` holds a value (including `null`).
    pub fn contains(&self, dest: &str) -> bool {
        self.values.contains_key(dest)
    }

    /// Stores `value` at `dest`, returning the previous value.
    pub fn insert(&mut self, dest: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(dest.into(), value)
    }

    /// Iterates over destinations in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of destinations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no destination is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consumes the namespace, returning the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.values
    }

    pub(crate) fn get_mut(&mut self, dest: &str) -> Option<&mut Value> {
        self.values.get_mut(dest)
    }
}

impl FromIterator<(String, Value)> for Namespace {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
