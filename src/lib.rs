//! Handlers: type-indexed handler chains
//!
//! An ordered list of independent handlers cooperates on one request by
//! reading and writing a shared, type-indexed value store. No handler knows
//! about the others; each declares a single processing operation whose
//! parameters are looked up in the store by type and whose result is written
//! back under its own type.
//!
//! # Core Concepts
//!
//! - **ValueStore**: one slot per type, with a fallback for misses
//! - **Handler**: a type that declares its processing operation
//! - **AdapterCache**: binds each handler type once and shares the result
//! - **ChainExecutor**: runs handlers in order until a marker type appears
//!
//! # Example
//!
//! ```
//! use handlers::{AdapterCache, ChainExecutor, Completion, Handler, HandlerRef, Operations, Value, ValueStore};
//! use std::sync::Arc;
//!
//! #[derive(Clone)]
//! struct Reply(String);
//! impl Value for Reply {}
//!
//! struct Hello;
//!
//! impl Handler for Hello {
//!     fn declare(ops: &mut Operations<Self>) {
//!         ops.process(|_hello: &Hello| String::from("hello"));
//!     }
//! }
//!
//! struct Upper;
//!
//! impl Handler for Upper {
//!     fn declare(ops: &mut Operations<Self>) {
//!         ops.process(|_upper: &Upper, text: String| Reply(text.to_uppercase()));
//!     }
//! }
//!
//! let hello: HandlerRef = Arc::new(Hello);
//! let upper: HandlerRef = Arc::new(Upper);
//! let mut executor = ChainExecutor::for_result::<Reply>(
//!     Arc::new(AdapterCache::new()),
//!     vec![Some(hello), Some(upper)],
//!     ValueStore::new(),
//! );
//!
//! assert_eq!(executor.run().unwrap(), Completion::Early { index: 1 });
//! let reply = executor.store().get_typed::<Reply>().unwrap();
//! assert_eq!(reply.0, "HELLO");
//! ```

pub mod chain;
pub mod config;
mod error;
pub mod handler;
pub mod store;

pub use chain::{ChainExecutor, ChainRegistration, ChainRegistry, Completion, HandlerCatalog};
pub use config::{ChainEntry, ChainsConfig};
pub use error::{HandlerError, HandlerResult};
pub use handler::{AdapterCache, AdapterFactory, AnyHandler, Handler, HandlerRef, HandlerType, Operations};
pub use store::{AnyValue, Seed, TypeKey, Value, ValueStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
