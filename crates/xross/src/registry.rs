//! Operation registry keyed by lookup key.
//!
//! Keys are `op_` followed by the operation name, which keeps operation
//! lookups apart from anything else a handler exposes. Registration and
//! merging never fail: a later operation under the same key replaces the
//! earlier one.

use std::collections::HashMap;
use std::fmt;

use crate::operation::Operation;

/// Prefix joined to an operation name to form its lookup key.
pub const LOOKUP_PREFIX: &str = "op_";

/// Returns the lookup key for an operation name.
#[must_use]
pub fn lookup_key(name: &str) -> String {
    format!("{LOOKUP_PREFIX}{name}")
}

/// Mapping from lookup key to operation.
pub struct Registry<R> {
    operations: HashMap<String, Operation<R>>,
}

impl<R> Registry<R> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            operations: HashMap::new(),
        }
    }

    /// Builds a registry from operations, in order.
    ///
    /// When two operations share a name the later one is kept.
    #[must_use]
    pub fn register(operations: impl IntoIterator<Item = Operation<R>>) -> Self {
        let mut registry = Self::new();
        for operation in operations {
            registry.insert(operation);
        }
        registry
    }

    /// Adds an operation, returning the one it replaced.
    pub fn insert(&mut self, operation: Operation<R>) -> Option<Operation<R>> {
        self.operations.insert(operation.lookup_key(), operation)
    }

    /// Copies every operation of `other` into `self`.
    ///
    /// Operations under keys `other` does not define are left alone; shared
    /// keys take `other`'s operation.
    pub fn merge(&mut self, other: &Self) {
        self.operations.extend(
            other
                .operations
                .iter()
                .map(|(key, operation)| (key.clone(), operation.clone())),
        );
    }

    /// Looks up an operation by lookup key (for example `op_greet`).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Operation<R>> {
        self.operations.get(key)
    }

    /// Returns `true` when `key` is registered.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.operations.contains_key(key)
    }

    /// Registered lookup keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of registered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl<R> Default for Registry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for Registry<R> {
    fn clone(&self) -> Self {
        Self {
            operations: self.operations.clone(),
        }
    }
}

impl<R> fmt::Debug for Registry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("keys", &self.keys())
            .finish()
    }
}

impl<R> FromIterator<Operation<R>> for Registry<R> {
    fn from_iter<I: IntoIterator<Item = Operation<R>>>(iter: I) -> Self {
        Self::register(iter)
    }
}
