//! # Value Container
//!
//! [`Item`] is the identity-less, order-preserving attribute bag an
//! inspection resolves into: a list of name/value pairs built per call and
//! discarded (or stashed) afterwards. The [`Record`] trait is the minimal
//! capability the rest of the crate asks of anything record-like, so
//! adapters can wrap other shapes without reflection.

use serde::Serialize;
use serde_json::Value;

/// Minimal record capability: named values that can be read and enumerated.
///
/// Implemented by [`Item`], by `serde_json::Map`, and by
/// [`Scope`](crate::args::Scope).
pub trait Record {
    fn field(&self, name: &str) -> Option<Value>;
    fn field_names(&self) -> Vec<String>;
}

/// An order-preserving bag of named values.
///
/// Attributes keep their insertion order; setting an existing name replaces
/// the value in place. Equality and cloning are deep, so stash rows can be
/// copied out without aliasing the stored state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    atts: Vec<(String, Value)>,
}

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut item = Self::new();
        for (name, value) in pairs {
            item.set(name, value);
        }
        item
    }

    /// Insert or overwrite, keeping the original position on overwrite.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.atts.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.atts.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.atts.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Attribute names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.atts.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.atts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.atts.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl Record for Item {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn field_names(&self) -> Vec<String> {
        self.names().map(String::from).collect()
    }
}

impl Record for serde_json::Map<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn field_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

/// Convert any serializable value into the crate's dynamic value type.
///
/// Conversion failures degrade to `Value::Null` rather than erroring: a
/// debugging aid should never make the host program fail over a value it was
/// merely asked to display.
pub fn value_of<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Display form of a value: strings verbatim, everything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
