//! # Context Store
//!
//! Process-wide key/value state that is orthogonal to any call site. Callers
//! set context where they know *where* the program is ("phase: warmup",
//! "request: 42"), and inspection points elsewhere gate on it without the two
//! sites sharing any data directly.
//!
//! The store is one flat mapping: no namespacing, no stacking. A nested
//! [`in_context`] guard that reuses a key overwrites it, and the inner exit
//! removes the key entirely rather than restoring the outer value. That quirk
//! is part of the contract; see the guard docs.
//!
//! Absence of a key is distinct from presence with `Value::Null`, and filters
//! rely on that distinction.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use serde_json::Value;

static CONTEXT: Lazy<Mutex<HashMap<String, Value>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn store() -> MutexGuard<'static, HashMap<String, Value>> {
    // The design assumes a single logical thread; the mutex only exists
    // because statics must be Sync. A poisoned lock still holds valid data.
    CONTEXT.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Set one context variable, overwriting any previous value.
pub fn set_context(key: impl Into<String>, value: impl Into<Value>) {
    store().insert(key.into(), value.into());
}

/// Merge a batch of context variables, overwriting existing keys.
pub fn set_context_all<K, V, I>(pairs: I)
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    let mut context = store();
    for (key, value) in pairs {
        context.insert(key.into(), value.into());
    }
}

/// Remove the named context variables. Absent keys are silently ignored.
pub fn unset_context<I, S>(keys: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut context = store();
    for key in keys {
        context.remove(key.as_ref());
    }
}

/// Snapshot read of one context variable.
pub fn context_value(key: &str) -> Option<Value> {
    store().get(key).cloned()
}

pub(crate) fn context_has(key: &str) -> bool {
    store().contains_key(key)
}

/// Scoped context: sets its key/values on creation and unsets exactly those
/// key names when dropped.
///
/// Drop runs on every exit path, including unwinding, which gives the
/// guaranteed-cleanup semantics the store requires.
///
/// Known quirk, preserved from the original design: the guard *unsets* its
/// keys on exit, it does not restore prior values. A key that already existed
/// with a different value before the scope began is gone once the scope ends.
#[must_use = "the context is unset as soon as the guard is dropped"]
pub struct ContextGuard {
    keys: Vec<String>,
}

/// Enter a scoped context. See [`ContextGuard`].
pub fn in_context<K, V, I>(pairs: I) -> ContextGuard
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    let mut keys = Vec::new();
    let mut context = store();
    for (key, value) in pairs {
        let key = key.into();
        keys.push(key.clone());
        context.insert(key, value.into());
    }
    drop(context);
    ContextGuard { keys }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        unset_context(self.keys.drain(..));
    }
}

/// Run a closure inside a scoped context, the function-wrapping form of
/// [`in_context`]. The keys are unset when the closure returns or panics.
pub fn with_context<K, V, I, R>(pairs: I, f: impl FnOnce() -> R) -> R
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    let _guard = in_context(pairs);
    f()
}
