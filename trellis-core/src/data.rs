//! The keyed value store accumulated during a pass.

use indexmap::IndexMap;

use crate::sys::{self, Os};

/// A value stored under a key in [`Data`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A string value.
    String(String),
    /// A 64-bit integer value.
    Int(i64),
    /// A 64-bit float value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// A list of strings.
    StringList(Vec<String>),
    /// A list of integers.
    IntList(Vec<i64>),
    /// A list of floats.
    FloatList(Vec<f64>),
}

impl Value {
    /// Returns the name of this value's type.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::StringList(_) => "string list",
            Self::IntList(_) => "int list",
            Self::FloatList(_) => "float list",
        }
    }

    /// Appends the elements of `other` to this value, when both are lists of
    /// the same type; otherwise replaces this value with `other`.
    pub(crate) fn append(&mut self, other: Self) {
        match (self, other) {
            (Self::StringList(list), Self::StringList(mut new)) => list.append(&mut new),
            (Self::IntList(list), Self::IntList(mut new)) => list.append(&mut new),
            (Self::FloatList(list), Self::FloatList(mut new)) => list.append(&mut new),
            (slot, other) => *slot = other,
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Self::StringList(value)
    }
}

impl From<Vec<i64>> for Value {
    fn from(value: Vec<i64>) -> Self {
        Self::IntList(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Self::FloatList(value)
    }
}

/// The keyed heterogeneous value map built up while a graph is traversed.
/// Also carries the host-OS adapter consulted by shell-facing processors.
///
/// A `Data` lives for exactly one pass; no state crosses passes.
pub struct Data {
    values: IndexMap<String, Value>,
    os: &'static dyn Os,
}

impl Data {
    /// Returns an empty store using the current platform's OS adapter.
    pub fn new() -> Self {
        Self::with_os(sys::current_platform())
    }

    /// Returns an empty store using the given OS adapter.
    pub fn with_os(os: &'static dyn Os) -> Self {
        Self {
            values: IndexMap::new(),
            os,
        }
    }

    /// Returns the OS adapter for this pass.
    pub fn os(&self) -> &'static dyn Os {
        self.os
    }

    /// Returns whether a value has been stored under the key.
    pub fn provided(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Stores a value under the key, replacing any existing slot.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Removes the value stored under the key, if any.
    pub fn unset(&mut self, key: &str) {
        self.values.shift_remove(key);
    }

    /// Appends to the list stored under the key, or stores the value when
    /// the key is absent. Used by accumulating list flags.
    pub(crate) fn append_to_list(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.values.get_mut(&key) {
            Some(existing) => existing.append(value),
            None => {
                self.values.insert(key, value);
            }
        }
    }

    /// Returns the raw value stored under the key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the string stored under the key.
    pub fn string(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer stored under the key.
    pub fn int(&self, key: &str) -> Option<i64> {
        match self.values.get(key) {
            Some(Value::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float stored under the key.
    pub fn float(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(Value::Float(f)) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean stored under the key.
    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string list stored under the key.
    pub fn string_list(&self, key: &str) -> Option<&[String]> {
        match self.values.get(key) {
            Some(Value::StringList(list)) => Some(list),
            _ => None,
        }
    }

    /// Returns the integer list stored under the key.
    pub fn int_list(&self, key: &str) -> Option<&[i64]> {
        match self.values.get(key) {
            Some(Value::IntList(list)) => Some(list),
            _ => None,
        }
    }

    /// Returns the float list stored under the key.
    pub fn float_list(&self, key: &str) -> Option<&[f64]> {
        match self.values.get(key) {
            Some(Value::FloatList(list)) => Some(list),
            _ => None,
        }
    }

    /// Returns the stored keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl Default for Data {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.values.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_absent_keys() {
        let data = Data::new();
        assert!(!data.provided("missing"));
        assert_eq!(data.string("missing"), None);
        assert_eq!(data.int("missing"), None);
    }

    #[test]
    fn test_typed_accessors() {
        let mut data = Data::new();
        data.set("s", "hello");
        data.set("i", 42_i64);
        data.set("f", 1.5_f64);
        data.set("b", true);
        data.set("list", vec!["a".to_string(), "b".to_string()]);

        assert_eq!(data.string("s"), Some("hello"));
        assert_eq!(data.int("i"), Some(42));
        assert_eq!(data.float("f"), Some(1.5));
        assert_eq!(data.bool("b"), Some(true));
        assert_eq!(
            data.string_list("list"),
            Some(["a".to_string(), "b".to_string()].as_slice())
        );
    }

    #[test]
    fn test_mismatched_type_reads_as_absent() {
        let mut data = Data::new();
        data.set("key", 42_i64);
        assert_eq!(data.string("key"), None);
        assert!(data.provided("key"));
    }

    #[test]
    fn test_set_replaces_slot() {
        let mut data = Data::new();
        data.set("key", "text");
        data.set("key", 7_i64);
        assert_eq!(data.get("key"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_unset_and_keys() {
        let mut data = Data::new();
        data.set("first", 1_i64);
        data.set("second", 2_i64);
        data.unset("first");

        assert!(!data.provided("first"));
        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["second"]);
    }

    #[test]
    fn test_append_to_list() {
        let mut data = Data::new();
        data.append_to_list("list", Value::StringList(vec!["a".into()]));
        data.append_to_list("list", Value::StringList(vec!["b".into(), "c".into()]));
        assert_eq!(
            data.string_list("list"),
            Some(["a".to_string(), "b".to_string(), "c".to_string()].as_slice())
        );
    }
}
