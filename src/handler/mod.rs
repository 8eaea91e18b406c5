//! Handler layer: the handler contract and invocation adapters
//!
//! A [`Handler`] declares its processing operation; the [`AdapterFactory`]
//! binds that operation's parameters and result to a
//! [`ValueStore`](crate::store::ValueStore); the [`AdapterCache`] keeps one
//! adapter per handler type.

mod binding;
mod cache;
mod factory;
mod traits;

pub use binding::{Output, Param, ProcessFn, Signature};
pub use cache::AdapterCache;
pub use factory::{AdapterFactory, BuildAdapter, InvocationAdapter};
pub use traits::{AnyHandler, Handler, HandlerRef, HandlerType, Operations};
