//! Handler trait: the contract handler types implement
//!
//! A handler declares its processing operation once, per type, through
//! [`Handler::declare`]. Chains hold handlers type-erased as
//! [`AnyHandler`]; the runtime type recovered from there selects the cached
//! invocation adapter.

use super::binding::{ProcessFn, Signature};
use super::factory::{AdapterFactory, InvocationAdapter};
use crate::error::HandlerResult;
use crate::store::ValueStore;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An independent unit of work in a handler chain.
///
/// ```
/// use handlers::{Handler, Operations};
///
/// struct Shout;
///
/// impl Shout {
///     fn process(&self, text: String) -> String {
///         text.to_uppercase()
///     }
/// }
///
/// impl Handler for Shout {
///     fn declare(ops: &mut Operations<Self>) {
///         ops.process(Self::process);
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Register this type's processing operation.
    ///
    /// Exactly one operation is expected. If several are registered the
    /// first one wins; if none is, the type cannot be bound and adapter
    /// construction fails with `HandlerMethodMissing`.
    fn declare(ops: &mut Operations<Self>)
    where
        Self: Sized;
}

type BoundCall<H> = Box<dyn Fn(&H, &mut ValueStore, &'static str) -> HandlerResult<()> + Send + Sync>;

pub(crate) struct Operation<H> {
    pub(crate) signature: Signature,
    pub(crate) call: BoundCall<H>,
}

/// The operations a handler type declares, in declaration order.
pub struct Operations<H> {
    declared: Vec<Operation<H>>,
}

impl<H: 'static> Operations<H> {
    pub(crate) fn new() -> Self {
        Self {
            declared: Vec::new(),
        }
    }

    /// Declare a processing operation.
    pub fn process<F, Args>(&mut self, f: F) -> &mut Self
    where
        F: ProcessFn<H, Args>,
    {
        self.declared.push(Operation {
            signature: <F as ProcessFn<H, Args>>::signature(),
            call: Box::new(move |handler: &H, store: &mut ValueStore, name: &'static str| {
                f.invoke(handler, store, name)
            }),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.declared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    pub(crate) fn into_first(self) -> Option<Operation<H>> {
        self.declared.into_iter().next()
    }
}

/// Runtime identity of a handler type, carrying its adapter constructor.
#[derive(Clone, Copy)]
pub struct HandlerType {
    id: TypeId,
    name: &'static str,
    build: fn() -> HandlerResult<InvocationAdapter>,
}

impl HandlerType {
    pub fn of<H: Handler>() -> Self {
        Self {
            id: TypeId::of::<H>(),
            name: std::any::type_name::<H>(),
            build: AdapterFactory::create::<H>,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the type's declaration and bind the selected operation.
    pub fn build_adapter(&self) -> HandlerResult<InvocationAdapter> {
        (self.build)()
    }
}

impl PartialEq for HandlerType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for HandlerType {}

impl Hash for HandlerType {
    fn hash<S: Hasher>(&self, state: &mut S) {
        self.id.hash(state);
    }
}

impl fmt::Debug for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerType({})", self.name)
    }
}

/// Object-safe view of a handler, implemented for every [`Handler`].
pub trait AnyHandler: Send + Sync {
    fn handler_type(&self) -> HandlerType;

    fn as_any(&self) -> &dyn Any;
}

impl<H: Handler> AnyHandler for H {
    fn handler_type(&self) -> HandlerType {
        HandlerType::of::<H>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A shared, type-erased handler instance.
pub type HandlerRef = Arc<dyn AnyHandler>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Echo {
        fn process(&self, text: String) -> String {
            text
        }
    }

    impl Handler for Echo {
        fn declare(ops: &mut Operations<Self>) {
            ops.process(Self::process);
        }
    }

    #[test]
    fn operations_keep_declaration_order() {
        let mut ops = Operations::<Echo>::new();
        ops.process(Echo::process)
            .process(|_echo: &Echo, n: u32| n + 1);

        assert_eq!(ops.len(), 2);
        let first = ops.into_first().unwrap();
        assert_eq!(first.signature.output().map(|k| k.name()), Some(std::any::type_name::<String>()));
    }

    #[test]
    fn handler_type_is_recovered_through_erasure() {
        let handler: HandlerRef = Arc::new(Echo);
        assert_eq!(handler.handler_type(), HandlerType::of::<Echo>());
        assert!(handler.as_any().downcast_ref::<Echo>().is_some());
    }

    #[test]
    fn handler_type_names_the_type() {
        assert!(HandlerType::of::<Echo>().name().ends_with("Echo"));
    }
}
