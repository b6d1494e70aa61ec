//! Foreign-producer bridge: input classification and the thenable adapter.
//!
//! Combinators accept anything convertible into an [`Input`], the explicit
//! three-way classification the engine uses instead of runtime duck-typing:
//!
//! - a native [`Promise`] — the fast path, used as-is;
//! - a foreign [`Thenable`] — wrapped behind a guarded capability so the
//!   rest of the engine can treat it uniformly;
//! - a plain value — treated as already fulfilled with itself.
//!
//! A foreign producer is trusted for nothing: it may settle twice, settle
//! and then throw, throw without settling, or never settle at all. The
//! adapter absorbs all of that through the settler's first-call-wins guard.

use std::fmt;
use std::sync::Arc;

use crate::capability::Settler;
use crate::microtask::Scheduler;
use crate::promise::Promise;
use crate::tracing_compat::debug;

/// A foreign asynchronous producer with a `then`-shaped registration hook.
///
/// Implementations receive the engine's resolving functions once, as a
/// [`Settler`], and may call them any number of times in any order; only
/// the first call takes effect. Returning `Err` models a synchronous throw
/// from the producer's registration hook; it is routed through the guarded
/// reject, so a throw after a settle is correctly ignored.
///
/// Closures of shape `FnOnce(Settler<T, E>) -> Result<(), E>` implement
/// this trait directly.
pub trait Thenable<T, E>: Send {
    /// Hands the resolving functions to the producer.
    fn subscribe(self: Box<Self>, settler: Settler<T, E>) -> Result<(), E>;
}

impl<T, E, F> Thenable<T, E> for F
where
    F: FnOnce(Settler<T, E>) -> Result<(), E> + Send,
{
    fn subscribe(self: Box<Self>, settler: Settler<T, E>) -> Result<(), E> {
        self(settler)
    }
}

/// A classified combinator input.
pub enum Input<T, E> {
    /// A plain, already-available value.
    Value(T),
    /// A native promise, consumed without adaptation.
    Future(Promise<T, E>),
    /// A foreign producer, adapted behind a guarded capability.
    Thenable(Box<dyn Thenable<T, E>>),
}

impl<T, E> Input<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Classifies a plain, already-available value.
    ///
    /// A dedicated constructor rather than a blanket `From<T>` impl: the
    /// blanket form makes `Into<Input<T, E>>` ambiguous at inference time
    /// (a `Promise<T, E>` is both a future of `Input<T, E>` and a value of
    /// `Input<Promise<T, E>, _>`).
    #[must_use]
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    /// Classifies a foreign producer.
    #[must_use]
    pub fn thenable(producer: impl Thenable<T, E> + 'static) -> Self {
        Self::Thenable(Box::new(producer))
    }

    /// Normalizes this input into a native promise.
    #[must_use]
    pub fn into_promise(self, scheduler: &Arc<Scheduler>) -> Promise<T, E> {
        match self {
            Self::Future(promise) => promise,
            Self::Value(value) => {
                let (promise, settler) = Promise::pending(scheduler);
                settler.resolve(value);
                promise
            }
            Self::Thenable(producer) => adapt(scheduler, producer),
        }
    }
}

impl<T, E> From<Promise<T, E>> for Input<T, E> {
    fn from(promise: Promise<T, E>) -> Self {
        Self::Future(promise)
    }
}

impl<T, E> From<Box<dyn Thenable<T, E>>> for Input<T, E> {
    fn from(producer: Box<dyn Thenable<T, E>>) -> Self {
        Self::Thenable(producer)
    }
}

impl<T, E> fmt::Debug for Input<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("Input::Value"),
            Self::Future(promise) => f.debug_tuple("Input::Future").field(promise).finish(),
            Self::Thenable(_) => f.write_str("Input::Thenable"),
        }
    }
}

/// Wraps a foreign producer behind a fresh guarded capability.
///
/// The producer's registration hook runs synchronously here, once. A
/// synchronous throw (`Err`) goes through the guarded reject: if the
/// producer already settled before throwing, the throw is ignored.
pub(crate) fn adapt<T, E>(scheduler: &Arc<Scheduler>, producer: Box<dyn Thenable<T, E>>) -> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let (promise, settler) = Promise::pending(scheduler);
    let guard = settler.clone();
    if let Err(reason) = producer.subscribe(settler) {
        debug!("foreign thenable threw during subscription");
        guard.reject(reason);
    }
    promise
}
