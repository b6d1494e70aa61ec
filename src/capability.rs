//! Resolution capability: the exclusive, one-shot right to settle a promise.
//!
//! A [`Settler`] bundles the resolve and reject halves behind a single
//! first-call-wins guard. Unlimited calls to either half are allowed; only
//! the first takes effect and later calls are silently absorbed. This guard
//! is what makes foreign thenables safe to adapt: they cannot be trusted to
//! settle exactly once, or at all, or to refrain from throwing after
//! settling.
//!
//! In this engine the guard is an atomic swap (compare-and-swap semantics),
//! so the first-caller-wins property holds even if a foreign producer fires
//! from another thread.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::promise::{Promise, Shared};
use crate::thenable::{self, Input};
use crate::tracing_compat::trace;

/// The paired ability to fulfill or reject one specific promise, exactly
/// once across all clones.
///
/// Clones share the same guard: whichever clone fires first wins, and every
/// later call on any clone is a no-op. A settler becomes inert once spent;
/// it never blocks and never fails.
pub struct Settler<T, E> {
    shared: Arc<Shared<T, E>>,
    claimed: Arc<AtomicBool>,
}

impl<T, E> Clone for Settler<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            claimed: Arc::clone(&self.claimed),
        }
    }
}

impl<T, E> Settler<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub(crate) fn new(shared: Arc<Shared<T, E>>) -> Self {
        Self {
            shared,
            claimed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Fulfills the promise with `value`.
    ///
    /// Returns whether this call won the guard; `false` means an earlier
    /// resolve or reject already took effect and `value` was discarded.
    pub fn resolve(&self, value: T) -> bool {
        if !self.claim() {
            return false;
        }
        self.shared.settle(Ok(value));
        true
    }

    /// Rejects the promise with `reason`.
    ///
    /// Returns whether this call won the guard.
    pub fn reject(&self, reason: E) -> bool {
        if !self.claim() {
            return false;
        }
        self.shared.settle(Err(reason));
        true
    }

    /// Resolves with an arbitrary input, adopting promises and thenables.
    ///
    /// The guard is claimed immediately (first call still wins), but when
    /// the input is a pending promise or a foreign thenable the outer
    /// promise settles later, with whatever the inner source produces —
    /// including its rejection. Flattening proceeds one level per call,
    /// recursively through the scheduler.
    pub fn resolve_input(&self, input: impl Into<Input<T, E>>) -> bool {
        if !self.claim() {
            return false;
        }
        match input.into() {
            Input::Value(value) => self.shared.settle(Ok(value)),
            Input::Future(inner) => self.adopt(&inner),
            Input::Thenable(producer) => {
                let inner = thenable::adapt(self.shared.scheduler(), producer);
                self.adopt(&inner);
            }
        }
        true
    }

    /// Whether the guard has been consumed.
    ///
    /// A spent settler's promise is not necessarily settled yet: adopting a
    /// pending source spends the guard first and settles later.
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    /// Forwards the inner promise's eventual settlement to the owned cell.
    /// Runs post-guard, so it writes the cell directly.
    fn adopt(&self, inner: &Promise<T, E>) {
        trace!("adopting inner settlement");
        let fulfill_target = Arc::clone(&self.shared);
        let reject_target = Arc::clone(&self.shared);
        inner.then(
            move |value| fulfill_target.settle(Ok(value)),
            move |reason| reject_target.settle(Err(reason)),
        );
    }

    fn claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::AcqRel)
    }
}

impl<T, E> fmt::Debug for Settler<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settler")
            .field("spent", &self.claimed.load(Ordering::Acquire))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::microtask::Scheduler;
    use crate::promise::{Promise, PromiseState};
    use std::sync::Arc;

    fn scheduler() -> Arc<Scheduler> {
        Arc::new(Scheduler::new())
    }

    #[test]
    fn first_resolving_function_call_wins() {
        let scheduler = scheduler();
        let (promise, settler) = Promise::<i32, String>::with_resolvers(&scheduler);
        assert!(settler.resolve(1));
        assert!(!settler.resolve(2));
        assert!(!settler.reject("late".to_owned()));
        scheduler.run_until_idle();
        assert_eq!(promise.try_result(), Some(Ok(1)));
    }

    #[test]
    fn guard_is_shared_across_clones() {
        let scheduler = scheduler();
        let (promise, settler) = Promise::<i32, String>::with_resolvers(&scheduler);
        let twin = settler.clone();
        assert!(twin.reject("first".to_owned()));
        assert!(settler.is_spent());
        assert!(!settler.resolve(1));
        scheduler.run_until_idle();
        assert_eq!(promise.try_result(), Some(Err("first".to_owned())));
    }

    #[test]
    fn resolve_input_adopts_a_pending_promise() {
        let scheduler = scheduler();
        let (outer, settler) = Promise::<i32, String>::with_resolvers(&scheduler);
        let (inner, inner_settler) = Promise::<i32, String>::with_resolvers(&scheduler);
        assert!(settler.resolve_input(inner));
        assert!(settler.is_spent());
        // Guard spent, promise still pending until the inner source fires.
        assert_eq!(outer.state(), PromiseState::Pending);
        assert!(!settler.resolve(99));
        inner_settler.reject("inner failure".to_owned());
        scheduler.run_until_idle();
        assert_eq!(outer.try_result(), Some(Err("inner failure".to_owned())));
    }
}
