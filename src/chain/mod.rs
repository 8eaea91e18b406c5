//! Handler chains: execution, registration and name resolution

mod catalog;
mod executor;
mod registry;

pub use catalog::HandlerCatalog;
pub use executor::{ChainExecutor, Completion};
pub use registry::{ChainRegistration, ChainRegistry};
