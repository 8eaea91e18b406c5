//! Shared handlers and helpers for the chain integration tests

#![allow(dead_code)]

use handlers::{Handler, HandlerRef, Operations, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Marker type: a run ends once a `Reply` is stored.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply(pub String);
impl Value for Reply {}

/// Records which overload ran.
#[derive(Clone, Debug, PartialEq)]
pub struct Choice(pub &'static str);
impl Value for Choice {}

/// Produces the string "hello".
pub struct Hello;

impl Handler for Hello {
    fn declare(ops: &mut Operations<Self>) {
        ops.process(|_hello: &Hello| String::from("hello"));
    }
}

/// Upper-cases the stored string.
pub struct Upper;

impl Handler for Upper {
    fn declare(ops: &mut Operations<Self>) {
        ops.process(|_upper: &Upper, text: String| text.to_uppercase());
    }
}

/// Wraps the stored string in a `Reply`.
pub struct Respond;

impl Handler for Respond {
    fn declare(ops: &mut Operations<Self>) {
        ops.process(|_respond: &Respond, text: String| Reply(text));
    }
}

/// Counts its invocations.
pub struct Recorder(pub Arc<AtomicUsize>);

impl Recorder {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Self(calls.clone()), calls)
    }
}

impl Handler for Recorder {
    fn declare(ops: &mut Operations<Self>) {
        ops.process(|recorder: &Recorder| {
            recorder.0.fetch_add(1, Ordering::SeqCst);
        });
    }
}

/// Declares two operations; only the first may ever be bound.
pub struct Overloaded;

impl Overloaded {
    fn from_text(&self, _text: String) -> Choice {
        Choice("text")
    }

    fn from_number(&self, _n: i32) -> Choice {
        Choice("number")
    }
}

impl Handler for Overloaded {
    fn declare(ops: &mut Operations<Self>) {
        ops.process(Self::from_text).process(Self::from_number);
    }
}

/// Declares no operation.
pub struct Bare;

impl Handler for Bare {
    fn declare(_ops: &mut Operations<Self>) {}
}

pub fn entry<H: Handler>(handler: H) -> Option<HandlerRef> {
    Some(Arc::new(handler))
}

/// Publishes a fixed `u32`.
pub struct Count(pub u32);

impl Handler for Count {
    fn declare(ops: &mut Operations<Self>) {
        ops.process(|count: &Count| count.0);
    }
}
