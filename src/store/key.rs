//! Runtime type keys and the `Value` contract for storable types

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A type-erased, shareable stored value.
pub type AnyValue = Arc<dyn Any + Send + Sync>;

/// A type that can live in a [`ValueStore`](super::ValueStore) slot.
///
/// Types with a zero value (numbers, `bool`, `char`) are *value-like*: a miss
/// reads as their zero value under the default fallback. Everything else is
/// *reference-like*: a miss reads as absence. Implementors opt into
/// value-like behaviour by overriding [`Value::zero`].
pub trait Value: Clone + Send + Sync + 'static {
    /// The zero value handed out on a miss, or `None` for reference-like types.
    fn zero() -> Option<Self> {
        None
    }

    /// True if this is the type's zero value. Always false for
    /// reference-like types.
    fn is_zero(&self) -> bool {
        false
    }
}

macro_rules! value_like {
    ($($t:ty),* $(,)?) => {
        $(
            impl Value for $t {
                fn zero() -> Option<Self> {
                    Some(<$t>::default())
                }

                fn is_zero(&self) -> bool {
                    *self == <$t>::default()
                }
            }
        )*
    };
}

value_like!(bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

impl Value for String {}
impl Value for &'static str {}
impl<T: Clone + Send + Sync + 'static> Value for Vec<T> {}
impl<T: Send + Sync + ?Sized + 'static> Value for Arc<T> {}

/// Stable runtime descriptor of a storable type.
///
/// Equality and hashing consider only the `TypeId`; the name and the zero
/// constructor ride along for diagnostics and the default fallback.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    zero: fn() -> Option<AnyValue>,
    is_zero: fn(&AnyValue) -> bool,
}

impl TypeKey {
    /// The key for `T`.
    pub fn of<T: Value>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            zero: zero_of::<T>,
            is_zero: is_zero_of::<T>,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// A fresh zero value for value-like types.
    pub fn zero(&self) -> Option<AnyValue> {
        (self.zero)()
    }

    pub fn is_value_like(&self) -> bool {
        (self.zero)().is_some()
    }

    /// True if `value` is this type's zero value. A value of another
    /// runtime type is never zero.
    pub fn is_zero(&self, value: &AnyValue) -> bool {
        (self.is_zero)(value)
    }

    /// True if `value`'s runtime type is exactly this key's type.
    pub fn matches(&self, value: &AnyValue) -> bool {
        (**value).type_id() == self.id
    }
}

fn zero_of<T: Value>() -> Option<AnyValue> {
    T::zero().map(|v| Arc::new(v) as AnyValue)
}

fn is_zero_of<T: Value>(value: &AnyValue) -> bool {
    value.downcast_ref::<T>().is_some_and(T::is_zero)
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
