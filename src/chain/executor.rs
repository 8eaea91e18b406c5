//! ChainExecutor: runs an ordered handler list over one ValueStore
//!
//! Handlers run strictly in order. After each one the executor checks for a
//! non-zero value of the marker type and stops as soon as one appears.

use crate::error::HandlerResult;
use crate::handler::{AdapterCache, HandlerRef};
use crate::store::{TypeKey, Value, ValueStore};
use std::sync::Arc;
use uuid::Uuid;

/// How a run ended. Neither outcome is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A non-zero marker appeared after the handler at `index` ran.
    Early { index: usize },
    /// Every handler ran and the marker never appeared.
    Exhausted,
}

impl Completion {
    pub fn is_early(&self) -> bool {
        matches!(self, Completion::Early { .. })
    }
}

/// Executes one chain over the store it owns.
pub struct ChainExecutor {
    marker: TypeKey,
    handlers: Vec<Option<HandlerRef>>,
    store: ValueStore,
    cache: Arc<AdapterCache>,
}

impl ChainExecutor {
    /// Create an executor whose run ends once a non-zero value keyed by
    /// `marker` is stored. `None` entries in `handlers` are skipped.
    pub fn new(
        marker: TypeKey,
        cache: Arc<AdapterCache>,
        handlers: Vec<Option<HandlerRef>>,
        store: ValueStore,
    ) -> Self {
        Self {
            marker,
            handlers,
            store,
            cache,
        }
    }

    /// Create an executor whose marker is the result type `M`.
    pub fn for_result<M: Value>(
        cache: Arc<AdapterCache>,
        handlers: Vec<Option<HandlerRef>>,
        store: ValueStore,
    ) -> Self {
        Self::new(TypeKey::of::<M>(), cache, handlers, store)
    }

    /// Run the chain.
    ///
    /// A failing handler stops the run and its error is returned; writes
    /// made by earlier handlers stay in the store.
    pub fn run(&mut self) -> HandlerResult<Completion> {
        let run_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "chain_run",
            %run_id,
            marker = self.marker.name(),
            handlers = self.handlers.len()
        );
        let _entered = span.enter();

        for (index, entry) in self.handlers.iter().enumerate() {
            let Some(handler) = entry else {
                continue;
            };

            let handler_type = handler.handler_type();
            let adapter = self.cache.get(&handler_type)?;

            tracing::trace!(index, handler = handler_type.name(), "invoking handler");
            if let Err(e) = adapter.invoke(&**handler, &mut self.store) {
                tracing::warn!(index, handler = handler_type.name(), error = %e, "handler failed");
                return Err(e);
            }

            if self.store.holds_value(&self.marker) {
                tracing::debug!(index, handler = handler_type.name(), "marker present, completed early");
                return Ok(Completion::Early { index });
            }
        }

        tracing::debug!("chain exhausted");
        Ok(Completion::Exhausted)
    }

    pub fn marker(&self) -> TypeKey {
        self.marker
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn store(&self) -> &ValueStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ValueStore {
        &mut self.store
    }

    /// Consume the executor, handing back the run's store.
    pub fn into_store(self) -> ValueStore {
        self.store
    }
}

impl std::fmt::Debug for ChainExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainExecutor")
            .field("marker", &self.marker)
            .field("handlers", &self.handlers.len())
            .field("store", &self.store)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::handler::{Handler, Operations};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug, PartialEq)]
    struct Done(&'static str);
    impl Value for Done {}

    struct Hello;

    impl Handler for Hello {
        fn declare(ops: &mut Operations<Self>) {
            ops.process(|_h: &Hello| String::from("hello"));
        }
    }

    struct Finish;

    impl Handler for Finish {
        fn declare(ops: &mut Operations<Self>) {
            ops.process(|_f: &Finish, _text: String| Done("finished"));
        }
    }

    struct Tally(Arc<AtomicUsize>);

    impl Handler for Tally {
        fn declare(ops: &mut Operations<Self>) {
            ops.process(|t: &Tally| {
                t.0.fetch_add(1, Ordering::SeqCst);
            });
        }
    }

    struct Broken;

    impl Handler for Broken {
        fn declare(ops: &mut Operations<Self>) {
            ops.process(|_b: &Broken| -> Result<(), String> { Err("broken".into()) });
        }
    }

    fn entry<H: Handler>(handler: H) -> Option<HandlerRef> {
        Some(Arc::new(handler))
    }

    fn chain(handlers: Vec<Option<HandlerRef>>) -> ChainExecutor {
        ChainExecutor::for_result::<Done>(Arc::new(AdapterCache::new()), handlers, ValueStore::new())
    }

    #[test]
    fn marker_stops_the_chain() {
        let tally = Arc::new(AtomicUsize::new(0));
        let mut executor = chain(vec![
            entry(Hello),
            entry(Finish),
            entry(Tally(tally.clone())),
        ]);

        let completion = executor.run().unwrap();

        assert_eq!(completion, Completion::Early { index: 1 });
        assert_eq!(tally.load(Ordering::SeqCst), 0);
        assert_eq!(executor.store().get_typed::<Done>(), Some(Done("finished")));
    }

    #[test]
    fn chain_without_marker_is_exhausted() {
        let tally = Arc::new(AtomicUsize::new(0));
        let mut executor = chain(vec![
            entry(Hello),
            entry(Tally(tally.clone())),
        ]);

        assert_eq!(executor.run().unwrap(), Completion::Exhausted);
        assert_eq!(tally.load(Ordering::SeqCst), 1);
        assert_eq!(executor.store().get_typed::<String>().as_deref(), Some("hello"));
    }

    #[test]
    fn absent_entries_are_skipped() {
        let tally = Arc::new(AtomicUsize::new(0));
        let mut executor = chain(vec![None, entry(Tally(tally.clone())), None]);

        assert_eq!(executor.run().unwrap(), Completion::Exhausted);
        assert_eq!(tally.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn preseeded_marker_still_runs_the_first_handler() {
        let tally = Arc::new(AtomicUsize::new(0));
        let mut store = ValueStore::new();
        store.set_typed(Done("seeded"));
        let mut executor = ChainExecutor::for_result::<Done>(
            Arc::new(AdapterCache::new()),
            vec![entry(Tally(tally.clone())), entry(Tally(tally.clone()))],
            store,
        );

        assert_eq!(executor.run().unwrap(), Completion::Early { index: 0 });
        assert_eq!(tally.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_keeps_earlier_writes() {
        let mut executor = chain(vec![entry(Hello), entry(Broken)]);

        let err = executor.run().unwrap_err();

        assert!(matches!(err, HandlerError::Failed(_)));
        assert_eq!(executor.into_store().get_typed::<String>().as_deref(), Some("hello"));
    }

    struct Count(u32);

    impl Handler for Count {
        fn declare(ops: &mut Operations<Self>) {
            ops.process(|c: &Count| c.0);
        }
    }

    #[test]
    fn zero_marker_does_not_stop_the_chain() {
        let tally = Arc::new(AtomicUsize::new(0));
        let mut executor = ChainExecutor::for_result::<u32>(
            Arc::new(AdapterCache::new()),
            vec![entry(Count(0)), entry(Tally(tally.clone()))],
            ValueStore::new(),
        );

        assert_eq!(executor.run().unwrap(), Completion::Exhausted);
        assert_eq!(tally.load(Ordering::SeqCst), 1);
        assert_eq!(executor.store().get_typed::<u32>(), Some(0));
    }

    #[test]
    fn non_zero_marker_stops_the_chain() {
        let tally = Arc::new(AtomicUsize::new(0));
        let mut executor = ChainExecutor::for_result::<u32>(
            Arc::new(AdapterCache::new()),
            vec![entry(Tally(tally.clone())), entry(Count(7)), entry(Tally(tally.clone()))],
            ValueStore::new(),
        );

        assert_eq!(executor.run().unwrap(), Completion::Early { index: 1 });
        assert_eq!(tally.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_chain_is_exhausted() {
        let mut executor = chain(Vec::new());
        assert!(executor.is_empty());
        assert_eq!(executor.run().unwrap(), Completion::Exhausted);
    }
}
