//! Named handler instances for resolving chain configuration

use crate::handler::{Handler, HandlerRef};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Maps configuration names to shared handler instances.
#[derive(Default, Clone)]
pub struct HandlerCatalog {
    handlers: BTreeMap<String, HandlerRef>,
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `handler` under `name`, replacing any previous entry.
    pub fn insert<H: Handler>(&mut self, name: impl Into<String>, handler: H) -> &mut Self {
        self.insert_shared(name, Arc::new(handler))
    }

    /// Add an already shared handler under `name`.
    pub fn insert_shared(&mut self, name: impl Into<String>, handler: HandlerRef) -> &mut Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn get(&self, name: &str) -> Option<HandlerRef> {
        self.handlers.get(name).cloned()
    }

    /// Catalog names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}
