//! `race`: whichever input settles first decides the outcome.

use std::sync::Arc;

use crate::microtask::Scheduler;
use crate::promise::Promise;
use crate::thenable::Input;

/// Forwards the first settlement among the inputs, fulfillment or
/// rejection alike.
///
/// No index bookkeeping is needed: only the identity of the first settler
/// matters, and the shared one-shot guard absorbs every later settlement.
/// Losing elements still run to completion; their results are discarded.
///
/// An empty input never settles — the returned promise stays `Pending`
/// permanently, by design.
pub fn race<I, In, T, E>(scheduler: &Arc<Scheduler>, inputs: I) -> Promise<T, E>
where
    I: IntoIterator<Item = In>,
    In: Into<Input<T, E>>,
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let (promise, settler) = Promise::pending(scheduler);
    for input in inputs {
        let element = Promise::resolve(scheduler, input);
        let win = settler.clone();
        let lose = settler.clone();
        element.then(
            move |value| {
                win.resolve(value);
            },
            move |reason| {
                lose.reject(reason);
            },
        );
    }
    promise
}

#[cfg(test)]
mod tests {
    use super::race;
    use crate::microtask::Scheduler;
    use crate::promise::{Promise, PromiseState};
    use std::sync::Arc;

    fn scheduler() -> Arc<Scheduler> {
        Arc::new(Scheduler::new())
    }

    #[test]
    fn empty_input_never_settles() {
        let scheduler = scheduler();
        let promise = race(&scheduler, Vec::<Promise<i32, String>>::new());
        scheduler.run_until_idle();
        assert_eq!(promise.state(), PromiseState::Pending);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn first_settlement_wins() {
        let scheduler = scheduler();
        let (slow, slow_settler) = Promise::<i32, String>::pending(&scheduler);
        let (fast, fast_settler) = Promise::<i32, String>::pending(&scheduler);
        let promise = race(&scheduler, vec![slow, fast]);
        fast_settler.resolve(2);
        scheduler.run_until_idle();
        slow_settler.resolve(1);
        scheduler.run_until_idle();
        assert_eq!(promise.try_result(), Some(Ok(2)));
    }

    #[test]
    fn a_first_rejection_also_wins() {
        let scheduler = scheduler();
        let (pending, _settler) = Promise::<i32, String>::pending(&scheduler);
        let loser = race(
            &scheduler,
            vec![pending, Promise::reject(&scheduler, "lost".to_owned())],
        );
        scheduler.run_until_idle();
        assert_eq!(loser.try_result(), Some(Err("lost".to_owned())));
    }
}
