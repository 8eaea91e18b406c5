//! AdapterFactory: binds a handler type's processing operation to the store
//!
//! Construction runs the type's [`Handler::declare`], selects the first
//! declared operation and wraps it in an [`InvocationAdapter`] that can be
//! invoked with any instance of that type. Construction is a pure function
//! of the type, so its result can be cached and shared.

use super::binding::Signature;
use super::traits::{AnyHandler, Handler, HandlerType, Operations};
use crate::error::{HandlerError, HandlerResult};
use crate::store::ValueStore;
use std::fmt;

type Invoke = Box<dyn Fn(&dyn AnyHandler, &mut ValueStore) -> HandlerResult<()> + Send + Sync>;

/// A handler type's selected operation, bound to the store calling convention.
pub struct InvocationAdapter {
    handler: &'static str,
    signature: Signature,
    declared: usize,
    invoke: Invoke,
}

impl InvocationAdapter {
    /// Fetch the operation's inputs from `store`, call it on `handler` and
    /// publish the result.
    ///
    /// Fails with `TypeMismatch` if `handler` is not of the adapter's type.
    pub fn invoke(&self, handler: &dyn AnyHandler, store: &mut ValueStore) -> HandlerResult<()> {
        (self.invoke)(handler, store)
    }

    /// Name of the handler type this adapter was built for.
    pub fn handler_name(&self) -> &'static str {
        self.handler
    }

    /// Signature of the selected operation.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// How many operations the type declared (only the first is bound).
    pub fn declared(&self) -> usize {
        self.declared
    }
}

impl fmt::Debug for InvocationAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationAdapter")
            .field("handler", &self.handler)
            .field("signature", &self.signature.to_string())
            .field("declared", &self.declared)
            .finish()
    }
}

/// Builds invocation adapters for handler types.
///
/// The seam the [`AdapterCache`](super::AdapterCache) builds through.
/// Implemented by [`AdapterFactory`] and by any
/// `Fn(&HandlerType) -> HandlerResult<InvocationAdapter>`.
pub trait BuildAdapter: Send + Sync {
    fn build(&self, handler_type: &HandlerType) -> HandlerResult<InvocationAdapter>;
}

impl<F> BuildAdapter for F
where
    F: Fn(&HandlerType) -> HandlerResult<InvocationAdapter> + Send + Sync,
{
    fn build(&self, handler_type: &HandlerType) -> HandlerResult<InvocationAdapter> {
        self(handler_type)
    }
}

/// The default adapter builder.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdapterFactory;

impl AdapterFactory {
    /// Build the adapter for `H`.
    ///
    /// Fails with `HandlerMethodMissing` if `H` declares no operation. When
    /// `H` declares several, the first in declaration order is bound.
    pub fn create<H: Handler>() -> HandlerResult<InvocationAdapter> {
        let name = std::any::type_name::<H>();

        let mut ops = Operations::<H>::new();
        H::declare(&mut ops);
        let declared = ops.len();

        let operation = ops
            .into_first()
            .ok_or(HandlerError::HandlerMethodMissing(name))?;

        if declared > 1 {
            tracing::debug!(handler = name, declared, "several operations declared, binding the first");
        }

        let call = operation.call;
        Ok(InvocationAdapter {
            handler: name,
            signature: operation.signature,
            declared,
            invoke: Box::new(move |handler: &dyn AnyHandler, store: &mut ValueStore| {
                let handler = handler.as_any().downcast_ref::<H>().ok_or_else(|| HandlerError::TypeMismatch {
                    key: name,
                    found: handler.handler_type().name().to_string(),
                })?;
                call(handler, store, name)
            }),
        })
    }
}

impl BuildAdapter for AdapterFactory {
    fn build(&self, handler_type: &HandlerType) -> HandlerResult<InvocationAdapter> {
        handler_type.build_adapter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct Greeter {
        called: Arc<AtomicBool>,
    }

    impl Greeter {
        fn process(&self) {
            self.called.store(true, Ordering::SeqCst);
        }
    }

    impl Handler for Greeter {
        fn declare(ops: &mut Operations<Self>) {
            ops.process(Self::process);
        }
    }

    struct Constant(&'static str);

    impl Handler for Constant {
        fn declare(ops: &mut Operations<Self>) {
            ops.process(|c: &Constant| c.0.to_string());
        }
    }

    struct Inert;

    impl Handler for Inert {
        fn declare(_ops: &mut Operations<Self>) {}
    }

    #[test]
    fn adapter_calls_the_operation() {
        let called = Arc::new(AtomicBool::new(false));
        let handler = Greeter { called: called.clone() };
        let mut store = ValueStore::new();

        let adapter = AdapterFactory::create::<Greeter>().unwrap();
        adapter.invoke(&handler, &mut store).unwrap();

        assert!(called.load(Ordering::SeqCst));
        assert!(store.is_empty());
    }

    #[test]
    fn non_unit_result_is_published() {
        let mut store = ValueStore::new();

        let adapter = AdapterFactory::create::<Constant>().unwrap();
        adapter.invoke(&Constant("message"), &mut store).unwrap();

        assert_eq!(store.get_typed::<String>().as_deref(), Some("message"));
    }

    #[test]
    fn missing_operation_names_the_type() {
        let err = AdapterFactory::create::<Inert>().unwrap_err();
        match err {
            HandlerError::HandlerMethodMissing(name) => {
                assert_eq!(name, std::any::type_name::<Inert>());
            }
            other => panic!("expected HandlerMethodMissing, got {other:?}"),
        }
    }

    #[test]
    fn adapter_rejects_a_foreign_handler() {
        let adapter = AdapterFactory::create::<Constant>().unwrap();
        let err = adapter.invoke(&Inert, &mut ValueStore::new()).unwrap_err();
        match err {
            HandlerError::TypeMismatch { key, found } => {
                assert!(key.ends_with("Constant"));
                assert_eq!(found, std::any::type_name::<Inert>());
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn factory_builds_through_the_seam() {
        let adapter = AdapterFactory.build(&HandlerType::of::<Constant>()).unwrap();
        assert_eq!(adapter.handler_name(), std::any::type_name::<Constant>());
        assert_eq!(adapter.declared(), 1);
    }
}
