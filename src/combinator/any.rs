//! `any`: first fulfillment wins; all-reject yields an aggregate.

use std::sync::Arc;

use super::accumulator::Accumulator;
use crate::error::AggregateError;
use crate::microtask::Scheduler;
use crate::promise::Promise;
use crate::thenable::Input;
use crate::tracing_compat::trace;

/// Composes the inputs into one promise of the first fulfillment.
///
/// Symmetric to [`all`](super::all()) with the roles of fulfillment and
/// rejection swapped: the first element to fulfill wins (later settlements
/// are no-ops under the guard), while rejections accumulate positionally.
/// Only when every element has rejected does the outer promise reject,
/// with an [`AggregateError`] carrying all reasons in input order. An
/// empty input rejects immediately with an empty aggregate rather than
/// hanging.
pub fn any<I, In, T, E>(scheduler: &Arc<Scheduler>, inputs: I) -> Promise<T, AggregateError<E>>
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
        let win = settler.clone();
        let errors = Arc::clone(&accumulator);
        let fail = settler.clone();
        element.then(
            move |value| {
                win.resolve(value);
            },
            move |reason| {
                if let Some(reasons) = errors.settle_slot(index, reason) {
                    fail.reject(AggregateError::new(reasons));
                }
            },
        );
    }

    if let Some(reasons) = accumulator.finish_discovery() {
        trace!(reasons = reasons.len(), "any: no element fulfilled");
        settler.reject(AggregateError::new(reasons));
    }
    promise
}
