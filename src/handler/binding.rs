//! Parameter and result binding between processing operations and the store
//!
//! A processing operation is any `Fn(&H, A1, .., An) -> R` with up to eight
//! parameters. Each parameter type implements [`Param`] and is looked up in
//! the store by its own type; the return type implements [`Output`] and is
//! published back under its own type.

use crate::error::{HandlerError, HandlerResult};
use crate::store::{TypeKey, Value, ValueStore};
use std::fmt;

/// A parameter resolved from the store by its declared type.
pub trait Param: Sized + 'static {
    /// The store key this parameter is read from.
    fn key() -> TypeKey;

    fn fetch(store: &ValueStore, handler: &'static str) -> HandlerResult<Self>;
}

/// Required parameter: absence is a `MissingValue` error.
impl<T: Value> Param for T {
    fn key() -> TypeKey {
        TypeKey::of::<T>()
    }

    fn fetch(store: &ValueStore, handler: &'static str) -> HandlerResult<Self> {
        store.get_typed::<T>().ok_or(HandlerError::MissingValue {
            handler,
            input: std::any::type_name::<T>(),
        })
    }
}

/// Optional parameter: absence is passed through as `None`.
impl<T: Value> Param for Option<T> {
    fn key() -> TypeKey {
        TypeKey::of::<T>()
    }

    fn fetch(store: &ValueStore, _handler: &'static str) -> HandlerResult<Self> {
        Ok(store.get_typed::<T>())
    }
}

/// The result of a processing operation.
pub trait Output: 'static {
    /// The store key the result is published under, `None` for `()`.
    fn key() -> Option<TypeKey>;

    fn publish(self, store: &mut ValueStore) -> HandlerResult<()>;
}

impl Output for () {
    fn key() -> Option<TypeKey> {
        None
    }

    fn publish(self, _store: &mut ValueStore) -> HandlerResult<()> {
        Ok(())
    }
}

impl<T: Value> Output for T {
    fn key() -> Option<TypeKey> {
        Some(TypeKey::of::<T>())
    }

    fn publish(self, store: &mut ValueStore) -> HandlerResult<()> {
        store.set_typed(self);
        Ok(())
    }
}

impl<T: Value> Output for Option<T> {
    fn key() -> Option<TypeKey> {
        Some(TypeKey::of::<T>())
    }

    fn publish(self, store: &mut ValueStore) -> HandlerResult<()> {
        store.set_typed_opt(self)
    }
}

impl<R, E> Output for Result<R, E>
where
    R: Output,
    E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    fn key() -> Option<TypeKey> {
        R::key()
    }

    fn publish(self, store: &mut ValueStore) -> HandlerResult<()> {
        match self {
            Ok(result) => result.publish(store),
            Err(e) => Err(HandlerError::Failed(e.into())),
        }
    }
}

/// The parameter and result types of a processing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    inputs: Vec<TypeKey>,
    output: Option<TypeKey>,
}

impl Signature {
    pub fn inputs(&self) -> &[TypeKey] {
        &self.inputs
    }

    pub fn output(&self) -> Option<TypeKey> {
        self.output
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inputs: Vec<&str> = self.inputs.iter().map(TypeKey::name).collect();
        write!(f, "({})", inputs.join(", "))?;
        match self.output {
            Some(output) => write!(f, " -> {}", output.name()),
            None => Ok(()),
        }
    }
}

/// A function usable as the processing operation of handler type `H`.
///
/// Implemented for every `Fn(&H, A1, .., An) -> R` whose parameters are
/// [`Param`]s and whose result is an [`Output`]. `Args` only disambiguates
/// arities.
pub trait ProcessFn<H, Args>: Send + Sync + 'static {
    fn signature() -> Signature;

    /// Fetch the arguments, call the function and publish its result.
    fn invoke(&self, handler: &H, store: &mut ValueStore, name: &'static str) -> HandlerResult<()>;
}

macro_rules! impl_process_fn {
    ($($arg:ident),*) => {
        impl<H, F, R, $($arg,)*> ProcessFn<H, ($($arg,)*)> for F
        where
            H: 'static,
            F: Fn(&H, $($arg),*) -> R + Send + Sync + 'static,
            R: Output,
            $($arg: Param,)*
        {
            fn signature() -> Signature {
                Signature {
                    inputs: vec![$($arg::key()),*],
                    output: R::key(),
                }
            }

            #[allow(non_snake_case, unused_variables)]
            fn invoke(&self, handler: &H, store: &mut ValueStore, name: &'static str) -> HandlerResult<()> {
                $(let $arg = $arg::fetch(store, name)?;)*
                (self)(handler, $($arg),*).publish(store)
            }
        }
    };
}

impl_process_fn!();
impl_process_fn!(A1);
impl_process_fn!(A1, A2);
impl_process_fn!(A1, A2, A3);
impl_process_fn!(A1, A2, A3, A4);
impl_process_fn!(A1, A2, A3, A4, A5);
impl_process_fn!(A1, A2, A3, A4, A5, A6);
impl_process_fn!(A1, A2, A3, A4, A5, A6, A7);
impl_process_fn!(A1, A2, A3, A4, A5, A6, A7, A8);
