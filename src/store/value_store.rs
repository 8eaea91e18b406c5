//! ValueStore: the per-run, type-indexed slot map
//!
//! Every handler in a chain reads its inputs from and publishes its output to
//! the same store. There is exactly one slot per type; lookups never walk a
//! type hierarchy. Misses are answered by a replaceable fallback producer
//! whose results are handed out but never stored.

use super::key::{AnyValue, TypeKey, Value};
use crate::error::{HandlerError, HandlerResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Produces a value for a type that has no slot.
pub type Fallback = Box<dyn Fn(&TypeKey) -> Option<AnyValue> + Send + Sync>;

/// A value paired with the key of its own runtime type.
///
/// Used by hosting code to seed a store from values whose static types have
/// already been erased.
#[derive(Clone)]
pub struct Seed {
    key: TypeKey,
    value: AnyValue,
}

impl Seed {
    pub fn new<T: Value>(value: T) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            value: Arc::new(value),
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed").field("key", &self.key).finish()
    }
}

/// Type-indexed value map scoped to a single chain run.
pub struct ValueStore {
    slots: HashMap<TypeKey, AnyValue>,
    fallback: Fallback,
}

impl ValueStore {
    /// Create an empty store with the default fallback: zero values for
    /// value-like types, absence for everything else.
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            fallback: Box::new(default_fallback),
        }
    }

    /// Create an empty store with a custom fallback producer.
    pub fn with_fallback<F>(fallback: F) -> Self
    where
        F: Fn(&TypeKey) -> Option<AnyValue> + Send + Sync + 'static,
    {
        Self {
            slots: HashMap::new(),
            fallback: Box::new(fallback),
        }
    }

    /// Get the value stored under `key`, or whatever the fallback produces.
    ///
    /// Fallback results are not persisted: a second miss invokes the
    /// fallback again.
    pub fn get(&self, key: &TypeKey) -> Option<AnyValue> {
        match self.slots.get(key) {
            Some(value) => Some(value.clone()),
            None => (self.fallback)(key),
        }
    }

    /// Typed form of [`get`](Self::get). A fallback value of the wrong
    /// runtime type reads as absent.
    pub fn get_typed<T: Value>(&self) -> Option<T> {
        self.get(&TypeKey::of::<T>())
            .and_then(|value| value.downcast_ref::<T>().cloned())
    }

    /// Store `value` under its own type, replacing any previous slot.
    pub fn set_typed<T: Value>(&mut self, value: T) {
        self.slots.insert(TypeKey::of::<T>(), Arc::new(value));
    }

    /// Store an optional value under `T`.
    ///
    /// `None` is a no-op for reference-like types (an existing slot is kept)
    /// and an `InvalidArgument` for value-like types.
    pub fn set_typed_opt<T: Value>(&mut self, value: Option<T>) -> HandlerResult<()> {
        match value {
            Some(value) => {
                self.set_typed(value);
                Ok(())
            }
            None => self.set(TypeKey::of::<T>(), None),
        }
    }

    /// Store a type-erased value under `key`.
    ///
    /// Fails with `TypeMismatch` if the value's runtime type is not exactly
    /// `key`; the store is left unchanged. Absent values follow the rules of
    /// [`set_typed_opt`](Self::set_typed_opt).
    pub fn set(&mut self, key: TypeKey, value: Option<AnyValue>) -> HandlerResult<()> {
        match value {
            None if key.is_value_like() => Err(HandlerError::invalid(
                "value",
                format!("absent value for value-like type {}", key),
            )),
            None => {
                tracing::trace!(key = key.name(), "ignoring absent write");
                Ok(())
            }
            Some(value) if !key.matches(&value) => Err(HandlerError::TypeMismatch {
                key: key.name(),
                found: format!("{:?}", (*value).type_id()),
            }),
            Some(value) => {
                self.slots.insert(key, value);
                Ok(())
            }
        }
    }

    /// Insert a batch of values, each keyed by its own runtime type.
    pub fn seed<I>(&mut self, seeds: I)
    where
        I: IntoIterator<Item = Seed>,
    {
        for seed in seeds {
            self.slots.insert(seed.key, seed.value);
        }
    }

    /// Replace the fallback producer.
    pub fn set_fallback<F>(&mut self, fallback: F)
    where
        F: Fn(&TypeKey) -> Option<AnyValue> + Send + Sync + 'static,
    {
        self.fallback = Box::new(fallback);
    }

    /// Restore the default fallback.
    pub fn reset_fallback(&mut self) {
        self.fallback = Box::new(default_fallback);
    }

    /// True if a slot exists for `key` (the fallback is not consulted).
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.slots.contains_key(key)
    }

    /// True if a slot exists for `key` and its value is not the type's zero
    /// value. For reference-like types this is the same as
    /// [`contains`](Self::contains).
    pub fn holds_value(&self, key: &TypeKey) -> bool {
        self.slots.get(key).is_some_and(|value| !key.is_zero(value))
    }

    pub fn contains_typed<T: Value>(&self) -> bool {
        self.contains(&TypeKey::of::<T>())
    }

    pub fn remove(&mut self, key: &TypeKey) -> Option<AnyValue> {
        self.slots.remove(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Keys of all occupied slots, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.slots.keys()
    }
}

impl Default for ValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ValueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueStore")
            .field("slots", &self.slots.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn default_fallback(key: &TypeKey) -> Option<AnyValue> {
    key.zero()
}
