//! Error type shared by the store, the adapter layer and the chain executor

use thiserror::Error;

/// Errors that can occur while binding or running handlers
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A mandatory collaborator or value is missing or empty
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The handler type declares no processing operation
    #[error("process operation does not exist on {0}")]
    HandlerMethodMissing(&'static str),

    /// A value was offered under a key of a different type. `found` is the
    /// offered type's name when known, otherwise its `TypeId`.
    #[error("type mismatch: expected {key}, found {found}")]
    TypeMismatch { key: &'static str, found: String },

    /// A required parameter had no value in the store
    #[error("{handler} requires a value of type {input}, none was available")]
    MissingValue {
        handler: &'static str,
        input: &'static str,
    },

    /// A handler's operation reported an error
    #[error("handler failed: {0}")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("chain not found: {0}")]
    ChainNotFound(String),

    #[error("no handler named '{0}' in the catalog")]
    UnknownHandler(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl HandlerError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

impl From<serde_yaml::Error> for HandlerError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Result type for handler operations
pub type HandlerResult<T> = Result<T, HandlerError>;
