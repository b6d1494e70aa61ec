//! The settlable future primitive.
//!
//! A [`Promise`] is a single-producer, multi-consumer cell that starts
//! `Pending` and makes exactly one transition to `Fulfilled(T)` or
//! `Rejected(E)`. Consumers register continuation pairs with
//! [`then`](Promise::then); continuations are always deferred onto the
//! promise's [`Scheduler`], never run synchronously from inside `then` or
//! from inside the settling call.
//!
//! The right to settle is held exclusively by the [`Settler`] returned at
//! creation; consumers can only register continuations or read the settled
//! result.
//!
//! Leaf constructors mirror the classic promise surface: [`resolve`]
//! (thenable-flattening), [`reject`] (never unwraps), [`try_with`]
//! (synchronous bridge), and [`with_resolvers`] (manual-completion escape
//! hatch).
//!
//! [`resolve`]: Promise::resolve
//! [`reject`]: Promise::reject
//! [`try_with`]: Promise::try_with
//! [`with_resolvers`]: Promise::with_resolvers

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::capability::Settler;
use crate::microtask::Scheduler;
use crate::thenable::Input;
use crate::tracing_compat::trace;

/// A boxed continuation branch.
type Callback<X> = Box<dyn FnOnce(X) + Send + 'static>;

/// A registered continuation pair. Exactly one branch runs, chosen by the
/// settlement; the other is dropped.
struct Reaction<T, E> {
    on_fulfilled: Option<Callback<T>>,
    on_rejected: Option<Callback<E>>,
}

enum State<T, E> {
    /// Not yet settled; holds reactions in registration order.
    Pending(SmallVec<[Reaction<T, E>; 2]>),
    Fulfilled(T),
    Rejected(E),
}

/// Observable lifecycle stage of a [`Promise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseState {
    /// No settlement has taken effect yet.
    Pending,
    /// Settled with a success value.
    Fulfilled,
    /// Settled with a failure reason.
    Rejected,
}

/// State cell shared between a [`Promise`], its clones, and its [`Settler`].
pub(crate) struct Shared<T, E> {
    state: Mutex<State<T, E>>,
    scheduler: Arc<Scheduler>,
}

impl<T, E> Shared<T, E> {
    pub(crate) fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }
}

impl<T, E> Shared<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Performs the one state transition out of `Pending` and schedules the
    /// matching branch of every registered reaction, in registration order.
    ///
    /// Later calls are no-ops; the first transition is terminal.
    pub(crate) fn settle(&self, result: Result<T, E>) {
        let reactions = {
            let mut state = self.state.lock();
            let State::Pending(reactions) = &mut *state else {
                return;
            };
            let reactions = std::mem::take(reactions);
            *state = match &result {
                Ok(value) => State::Fulfilled(value.clone()),
                Err(reason) => State::Rejected(reason.clone()),
            };
            reactions
        };
        trace!(
            reactions = reactions.len(),
            fulfilled = result.is_ok(),
            "promise settled"
        );
        for reaction in reactions {
            Self::schedule_reaction(&self.scheduler, reaction, &result);
        }
    }

    fn schedule_reaction(scheduler: &Arc<Scheduler>, reaction: Reaction<T, E>, result: &Result<T, E>) {
        match result {
            Ok(value) => {
                if let Some(callback) = reaction.on_fulfilled {
                    let value = value.clone();
                    scheduler.enqueue(move || callback(value));
                }
            }
            Err(reason) => {
                if let Some(callback) = reaction.on_rejected {
                    let reason = reason.clone();
                    scheduler.enqueue(move || callback(reason));
                }
            }
        }
    }
}

/// A settlable future: `Pending` until its [`Settler`] fires, then
/// permanently `Fulfilled` or `Rejected`.
///
/// Cloning a `Promise` clones a handle to the same cell; all clones observe
/// the same settlement.
pub struct Promise<T, E> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> Promise<T, E> {
    /// Current lifecycle stage.
    #[must_use]
    pub fn state(&self) -> PromiseState {
        match &*self.shared.state.lock() {
            State::Pending(_) => PromiseState::Pending,
            State::Fulfilled(_) => PromiseState::Fulfilled,
            State::Rejected(_) => PromiseState::Rejected,
        }
    }

    /// The queue this promise schedules its continuations onto.
    #[must_use]
    pub fn scheduler(&self) -> &Arc<Scheduler> {
        self.shared.scheduler()
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Creates a pending promise and the capability that settles it.
    ///
    /// The settler's two resolving functions share one first-call-wins
    /// guard; only the first call across both has any effect.
    #[must_use]
    pub fn pending(scheduler: &Arc<Scheduler>) -> (Self, Settler<T, E>) {
        let shared = Arc::new(Shared {
            state: Mutex::new(State::Pending(SmallVec::new())),
            scheduler: Arc::clone(scheduler),
        });
        let promise = Self {
            shared: Arc::clone(&shared),
        };
        (promise, Settler::new(shared))
    }

    /// Exposes a bare resolution capability for bridging foreign async
    /// sources by hand. Identical to [`pending`](Self::pending); this name
    /// is the public escape hatch.
    #[must_use]
    pub fn with_resolvers(scheduler: &Arc<Scheduler>) -> (Self, Settler<T, E>) {
        Self::pending(scheduler)
    }

    /// Normalizes any input into a promise.
    ///
    /// A native promise is returned unchanged; a foreign thenable is
    /// wrapped behind a guarded capability; a plain value becomes an
    /// already-fulfilled promise. Nested thenables are flattened one level
    /// per call, recursively through the scheduler rather than
    /// synchronously.
    #[must_use]
    pub fn resolve(scheduler: &Arc<Scheduler>, input: impl Into<Input<T, E>>) -> Self {
        input.into().into_promise(scheduler)
    }

    /// Creates a freshly rejected promise.
    ///
    /// The reason is never unwrapped, even if it is itself a promise.
    #[must_use]
    pub fn reject(scheduler: &Arc<Scheduler>, reason: E) -> Self {
        let (promise, settler) = Self::pending(scheduler);
        settler.reject(reason);
        promise
    }

    /// Bridges a synchronous call into the promise world.
    ///
    /// The callback runs synchronously inside this call (the only place in
    /// the engine that executes user code synchronously). `Ok` resolves the
    /// fresh promise with the returned input, flattened exactly as
    /// [`resolve`](Self::resolve) would; `Err` rejects it.
    pub fn try_with<In, F>(scheduler: &Arc<Scheduler>, callback: F) -> Self
    where
        In: Into<Input<T, E>>,
        F: FnOnce() -> Result<In, E>,
    {
        let (promise, settler) = Self::pending(scheduler);
        match callback() {
            Ok(value) => {
                settler.resolve_input(value);
            }
            Err(reason) => {
                settler.reject(reason);
            }
        }
        promise
    }

    /// Registers a continuation pair.
    ///
    /// Exactly one branch will run, deferred onto the scheduler; if the
    /// promise is already settled the matching branch is scheduled
    /// immediately. Registration itself never fails.
    pub fn then<F, G>(&self, on_fulfilled: F, on_rejected: G)
    where
        F: FnOnce(T) + Send + 'static,
        G: FnOnce(E) + Send + 'static,
    {
        self.register(Some(Box::new(on_fulfilled)), Some(Box::new(on_rejected)));
    }

    /// Registers only a fulfillment continuation; a rejection is dropped.
    pub fn on_fulfilled<F>(&self, callback: F)
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.register(Some(Box::new(callback)), None);
    }

    /// Registers only a rejection continuation; a fulfillment is dropped.
    pub fn on_rejected<G>(&self, callback: G)
    where
        G: FnOnce(E) + Send + 'static,
    {
        self.register(None, Some(Box::new(callback)));
    }

    /// Reads the settled result, if any, without blocking.
    #[must_use]
    pub fn try_result(&self) -> Option<Result<T, E>> {
        match &*self.shared.state.lock() {
            State::Pending(_) => None,
            State::Fulfilled(value) => Some(Ok(value.clone())),
            State::Rejected(reason) => Some(Err(reason.clone())),
        }
    }

    fn register(&self, on_fulfilled: Option<Callback<T>>, on_rejected: Option<Callback<E>>) {
        let mut state = self.shared.state.lock();
        match &mut *state {
            State::Pending(reactions) => reactions.push(Reaction {
                on_fulfilled,
                on_rejected,
            }),
            State::Fulfilled(value) => {
                if let Some(callback) = on_fulfilled {
                    let value = value.clone();
                    self.shared.scheduler.enqueue(move || callback(value));
                }
            }
            State::Rejected(reason) => {
                if let Some(callback) = on_rejected {
                    let reason = reason.clone();
                    self.shared.scheduler.enqueue(move || callback(reason));
                }
            }
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise").field("state", &self.state()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Promise, PromiseState};
    use crate::microtask::Scheduler;
    use crate::thenable::Input;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn scheduler() -> Arc<Scheduler> {
        Arc::new(Scheduler::new())
    }

    #[test]
    fn promise_exposes_its_scheduler_handle() {
        let scheduler = scheduler();
        let (promise, _settler) = Promise::<i32, String>::pending(&scheduler);
        assert!(Arc::ptr_eq(promise.scheduler(), &scheduler));
    }

    #[test]
    fn continuations_do_not_run_inside_then_or_settle() {
        let scheduler = scheduler();
        let (promise, settler) = Promise::<i32, String>::pending(&scheduler);
        let fired = Arc::new(AtomicBool::new(false));
        let observed = Arc::clone(&fired);
        promise.then(move |_| observed.store(true, Ordering::SeqCst), |_| {});
        settler.resolve(7);
        assert!(!fired.load(Ordering::SeqCst), "must defer to the queue");
        scheduler.run_until_idle();
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn then_on_settled_promise_schedules_immediately() {
        let scheduler = scheduler();
        let promise = Promise::<i32, String>::resolve(&scheduler, Input::value(3));
        scheduler.run_until_idle();
        let seen = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&seen);
        promise.then(move |v| sink.store(v as usize, Ordering::SeqCst), |_| {});
        assert_eq!(scheduler.len(), 1);
        scheduler.run_until_idle();
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn same_promise_continuations_fire_in_registration_order() {
        let scheduler = scheduler();
        let (promise, settler) = Promise::<i32, String>::pending(&scheduler);
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for tag in 0..3 {
            let log = Arc::clone(&log);
            promise.on_fulfilled(move |_| log.lock().push(tag));
        }
        settler.resolve(0);
        scheduler.run_until_idle();
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn reject_never_unwraps_the_reason() {
        let scheduler = scheduler();
        let inner = Promise::<i32, String>::resolve(&scheduler, Input::value(1));
        let promise: Promise<i32, Promise<i32, String>> =
            Promise::reject(&scheduler, inner.clone());
        scheduler.run_until_idle();
        let Some(Err(reason)) = promise.try_result() else {
            panic!("expected rejection");
        };
        assert_eq!(reason.try_result(), Some(Ok(1)));
    }

    #[test]
    fn try_with_resolves_on_ok_and_rejects_on_err() {
        let scheduler = scheduler();
        let ok = Promise::<i32, String>::try_with(&scheduler, || Ok(Input::value(21)));
        let err = Promise::<i32, String>::try_with(&scheduler, || {
            Err::<Input<i32, String>, _>("boom".to_owned())
        });
        scheduler.run_until_idle();
        assert_eq!(ok.try_result(), Some(Ok(21)));
        assert_eq!(err.try_result(), Some(Err("boom".to_owned())));
    }

    #[test]
    fn try_with_flattens_a_returned_promise() {
        let scheduler = scheduler();
        let (inner, inner_settler) = Promise::<i32, String>::pending(&scheduler);
        let outer = Promise::try_with(&scheduler, || Ok(inner));
        scheduler.run_until_idle();
        assert_eq!(outer.state(), PromiseState::Pending);
        inner_settler.resolve(5);
        scheduler.run_until_idle();
        assert_eq!(outer.try_result(), Some(Ok(5)));
    }

    #[test]
    fn resolve_passes_native_promises_through() {
        let scheduler = scheduler();
        let (source, settler) = Promise::<i32, String>::pending(&scheduler);
        let resolved = Promise::resolve(&scheduler, source.clone());
        settler.resolve(9);
        scheduler.run_until_idle();
        // Same cell: the pass-through promise observes the source settlement.
        assert_eq!(resolved.try_result(), Some(Ok(9)));
        assert_eq!(source.try_result(), Some(Ok(9)));
    }
}
