//! # Call Payload
//!
//! [`Args`] is the per-call payload handed to a terminal action: requested
//! attribute names, at most one subject record, keyword-style data pairs, and
//! an optional [`Scope`] snapshot standing in for the calling scope's local
//! variables.
//!
//! Rust has no frame introspection, so the ambient-scope collaborator is an
//! explicit snapshot the caller supplies, normally via the [`snapshot!`]
//! macro which captures local bindings by name.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::item::{value_of, Record};

/// A snapshot of locally visible bindings at a call site.
///
/// Names come back sorted, which matches the display contract for
/// scope-sourced inspections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    vars: BTreeMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl Record for Scope {
    fn field(&self, name: &str) -> Option<Value> {
        self.vars.get(name).cloned()
    }

    fn field_names(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Scope
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut scope = Scope::new();
        for (name, value) in iter {
            scope.bind(name, value);
        }
        scope
    }
}

/// Capture local bindings into a [`Scope`] by name.
///
/// ```
/// use behold::snapshot;
///
/// let x = 1;
/// let label = "warmup";
/// let scope = snapshot!(x, label);
/// ```
#[macro_export]
macro_rules! snapshot {
    ($($name:ident),* $(,)?) => {{
        let mut scope = $crate::Scope::new();
        $(scope.bind(stringify!($name), $crate::value_of(&$name));)*
        scope
    }};
}

/// The arguments of one inspection call.
///
/// Mirrors the call shapes the terminals accept: any number of attribute
/// names, at most one subject (enforced at resolution time), keyword data
/// pairs that take priority over every other source, and an optional scope
/// snapshot used when no subject is given.
#[derive(Debug, Default)]
pub struct Args {
    pub(crate) names: Vec<String>,
    pub(crate) subjects: Vec<Value>,
    pub(crate) data: Vec<(String, Value)>,
    pub(crate) scope: Option<Scope>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request one attribute by name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Request several attributes by name.
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Supply a subject record via serialization.
    ///
    /// A subject that does not serialize to an attribute mapping (a bare
    /// number, a sequence) is a usage error, reported when the terminal
    /// resolves.
    pub fn subject<T: Serialize>(mut self, subject: &T) -> Self {
        self.subjects.push(value_of(subject));
        self
    }

    /// Supply a subject through the [`Record`] capability instead of serde.
    pub fn record(mut self, record: &dyn Record) -> Self {
        let mut map = serde_json::Map::new();
        for name in record.field_names() {
            if let Some(value) = record.field(&name) {
                map.insert(name, value);
            }
        }
        self.subjects.push(Value::Object(map));
        self
    }

    /// Keyword-style data: merged with priority over the subject and scope.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.push((key.into(), value.into()));
        self
    }

    /// Attach the calling scope's snapshot, used when no subject is given.
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }
}

impl From<Scope> for Args {
    fn from(scope: Scope) -> Self {
        Args::new().scope(scope)
    }
}
