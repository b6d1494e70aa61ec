//! `all`: wait for every input, fail fast on the first rejection.

use std::sync::Arc;

use super::accumulator::Accumulator;
use crate::microtask::Scheduler;
use crate::promise::Promise;
use crate::thenable::Input;
use crate::tracing_compat::trace;

/// Composes every input into one promise of all their values, in input
/// order.
///
/// The result vector is ordered by input index regardless of settlement
/// order. The first rejection among the inputs rejects the outer promise
/// with that reason; the remaining in-flight elements still run to
/// completion, but their results are discarded by the one-shot guard. An
/// empty input resolves immediately with an empty vector.
pub fn all<I, In, T, E>(scheduler: &Arc<Scheduler>, inputs: I) -> Promise<Vec<T>, E>
where
    I: IntoIterator<Item = In>,
    In: Into<Input<T, E>>,
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let (promise, settler) = Promise::pending(scheduler);
    let accumulator = Arc::new(Accumulator::new());

    for input in inputs {
        let index = accumulator.discover();
        let element = Promise::resolve(scheduler, input);
        let slots = Arc::clone(&accumulator);
        let complete = settler.clone();
        let fail = settler.clone();
        element.then(
            move |value| {
                if let Some(values) = slots.settle_slot(index, value) {
                    complete.resolve(values);
                }
            },
            move |reason| {
                fail.reject(reason);
            },
        );
    }

    if let Some(values) = accumulator.finish_discovery() {
        trace!("all: input exhausted with no outstanding elements");
        settler.resolve(values);
    }
    promise
}
