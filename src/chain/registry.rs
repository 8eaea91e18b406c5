//! ChainRegistry: named, validated handler chains
//!
//! Every chain in a registry shares one marker type and one adapter cache.
//! Handlers are validated as they are registered by building their adapter,
//! so a type without a processing operation never reaches an executor.

use super::catalog::HandlerCatalog;
use super::executor::ChainExecutor;
use crate::config::ChainsConfig;
use crate::error::{HandlerError, HandlerResult};
use crate::handler::{AdapterCache, Handler, HandlerRef};
use crate::store::{TypeKey, Value, ValueStore};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Named handler chains producing [`ChainExecutor`]s.
pub struct ChainRegistry {
    marker: TypeKey,
    cache: Arc<AdapterCache>,
    chains: BTreeMap<String, Vec<HandlerRef>>,
}

impl ChainRegistry {
    /// Create an empty registry whose executors stop on `marker`.
    pub fn new(marker: TypeKey, cache: Arc<AdapterCache>) -> Self {
        Self {
            marker,
            cache,
            chains: BTreeMap::new(),
        }
    }

    /// Create an empty registry whose executors stop on result type `M`.
    pub fn for_result<M: Value>(cache: Arc<AdapterCache>) -> Self {
        Self::new(TypeKey::of::<M>(), cache)
    }

    /// Start (or restart) the chain called `name`.
    ///
    /// Registering an existing name discards its previous handlers.
    pub fn register(&mut self, name: &str) -> HandlerResult<ChainRegistration<'_>> {
        if name.trim().is_empty() {
            return Err(HandlerError::invalid("name", "chain name must not be empty"));
        }

        let handlers = self.chains.entry(name.to_string()).or_default();
        handlers.clear();

        Ok(ChainRegistration {
            cache: &self.cache,
            handlers,
        })
    }

    /// Build every chain in `config`, resolving handler names via `catalog`.
    pub fn from_config(
        marker: TypeKey,
        cache: Arc<AdapterCache>,
        config: &ChainsConfig,
        catalog: &HandlerCatalog,
    ) -> HandlerResult<Self> {
        config.validate()?;

        let mut registry = Self::new(marker, cache);
        for entry in &config.chains {
            if entry.handlers.is_empty() {
                return Err(HandlerError::invalid(
                    "handlers",
                    format!("chain '{}' has no handlers", entry.name),
                ));
            }

            let mut chain = registry.register(&entry.name)?;
            for handler_name in &entry.handlers {
                let handler = catalog
                    .get(handler_name)
                    .ok_or_else(|| HandlerError::UnknownHandler(handler_name.clone()))?;
                chain.processes_shared(handler)?;
            }
            tracing::debug!(chain = %entry.name, handlers = entry.handlers.len(), "registered chain");
        }

        Ok(registry)
    }

    /// An executor over the chain called `name`, running against `store`.
    pub fn executor(&self, name: &str, store: ValueStore) -> HandlerResult<ChainExecutor> {
        let handlers = self
            .chains
            .get(name)
            .ok_or_else(|| HandlerError::ChainNotFound(name.to_string()))?;

        Ok(ChainExecutor::new(
            self.marker,
            Arc::clone(&self.cache),
            handlers.iter().cloned().map(Some).collect(),
            store,
        ))
    }

    /// The handlers of chain `name`, in execution order.
    pub fn handlers(&self, name: &str) -> Option<&[HandlerRef]> {
        self.chains.get(name).map(Vec::as_slice)
    }

    pub fn marker(&self) -> TypeKey {
        self.marker
    }

    pub fn cache(&self) -> &Arc<AdapterCache> {
        &self.cache
    }

    /// Chain names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.chains.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.chains.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl std::fmt::Debug for ChainRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainRegistry")
            .field("marker", &self.marker)
            .field("chains", &self.names())
            .finish()
    }
}

/// Appends handlers to one chain. Returned by [`ChainRegistry::register`].
pub struct ChainRegistration<'a> {
    cache: &'a AdapterCache,
    handlers: &'a mut Vec<HandlerRef>,
}

impl ChainRegistration<'_> {
    /// Append `handler` to the chain.
    ///
    /// Fails with `HandlerMethodMissing` if its type declares no operation;
    /// the handler is then not added and earlier ones stay registered.
    pub fn processes<H: Handler>(&mut self, handler: H) -> HandlerResult<&mut Self> {
        self.processes_shared(Arc::new(handler))
    }

    /// Append an already shared handler to the chain.
    pub fn processes_shared(&mut self, handler: HandlerRef) -> HandlerResult<&mut Self> {
        self.cache.get(&handler.handler_type())?;
        self.handlers.push(handler);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
