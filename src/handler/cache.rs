//! AdapterCache: one invocation adapter per handler type
//!
//! Shared across executors (and threads). Concurrent first requests for the
//! same type may each build an adapter, but only the first insert wins and
//! every caller gets that one back.

use super::binding::Signature;
use super::factory::{AdapterFactory, BuildAdapter, InvocationAdapter};
use super::traits::{Handler, HandlerType};
use crate::error::HandlerResult;
use dashmap::DashMap;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// Memoizes adapter construction per handler type.
pub struct AdapterCache {
    adapters: DashMap<TypeId, Arc<InvocationAdapter>>,
    builder: Box<dyn BuildAdapter>,
}

impl AdapterCache {
    /// Create an empty cache that builds through [`AdapterFactory`].
    pub fn new() -> Self {
        Self::with_builder(AdapterFactory)
    }

    /// Create an empty cache with a custom builder.
    pub fn with_builder<B: BuildAdapter + 'static>(builder: B) -> Self {
        Self {
            adapters: DashMap::new(),
            builder: Box::new(builder),
        }
    }

    /// Get the adapter for `handler_type`, building it on first request.
    ///
    /// Failed builds are not cached; a later request tries again.
    pub fn get(&self, handler_type: &HandlerType) -> HandlerResult<Arc<InvocationAdapter>> {
        if let Some(hit) = self.adapters.get(&handler_type.id()) {
            tracing::trace!(handler = handler_type.name(), "adapter cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        let built = Arc::new(self.builder.build(handler_type)?);
        tracing::debug!(
            handler = handler_type.name(),
            signature = %built.signature(),
            "built invocation adapter"
        );

        let entry = self.adapters.entry(handler_type.id()).or_insert(built);
        Ok(Arc::clone(entry.value()))
    }

    /// Build and cache the adapter for `H` ahead of any run.
    pub fn warm<H: Handler>(&self) -> HandlerResult<Arc<InvocationAdapter>> {
        self.get(&HandlerType::of::<H>())
    }

    pub fn contains(&self, handler_type: &HandlerType) -> bool {
        self.adapters.contains_key(&handler_type.id())
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Handler names and bound signatures of every cached adapter, sorted by
    /// handler name.
    pub fn signatures(&self) -> Vec<(&'static str, Signature)> {
        let mut out: Vec<_> = self
            .adapters
            .iter()
            .map(|r| (r.value().handler_name(), r.value().signature().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }
}

impl Default for AdapterCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AdapterCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterCache")
            .field("adapters", &self.adapters.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::handler::Operations;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter;

    impl Handler for Counter {
        fn declare(ops: &mut Operations<Self>) {
            ops.process(|_c: &Counter, n: u64| n + 1);
        }
    }

    struct Blank;

    impl Handler for Blank {
        fn declare(_ops: &mut Operations<Self>) {}
    }

    fn counting_cache() -> (AdapterCache, Arc<AtomicUsize>) {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let cache = AdapterCache::with_builder(move |ty: &HandlerType| {
            counter.fetch_add(1, Ordering::SeqCst);
            ty.build_adapter()
        });
        (cache, builds)
    }

    #[test]
    fn same_type_returns_same_adapter() {
        let (cache, builds) = counting_cache();
        let ty = HandlerType::of::<Counter>();

        let first = cache.get(&ty).unwrap();
        let second = cache.get(&ty).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_builds_are_retried_and_not_cached() {
        let (cache, builds) = counting_cache();
        let ty = HandlerType::of::<Blank>();

        assert!(matches!(cache.get(&ty), Err(HandlerError::HandlerMethodMissing(_))));
        assert!(matches!(cache.get(&ty), Err(HandlerError::HandlerMethodMissing(_))));

        assert_eq!(builds.load(Ordering::SeqCst), 2);
        assert!(!cache.contains(&ty));
        assert!(cache.is_empty());
    }

    #[test]
    fn warm_populates_the_cache() {
        let cache = AdapterCache::new();
        cache.warm::<Counter>().unwrap();

        assert!(cache.contains(&HandlerType::of::<Counter>()));
        let signatures = cache.signatures();
        assert_eq!(signatures.len(), 1);
        assert_eq!(signatures[0].1.to_string(), "(u64) -> u64");
    }
}
