//! Type-indexed value storage for a single chain run

mod key;
mod value_store;

pub use key::{AnyValue, TypeKey, Value};
pub use value_store::{Fallback, Seed, ValueStore};
