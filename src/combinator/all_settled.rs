//! `all_settled`: wait for every input and report each outcome.

use std::convert::Infallible;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::accumulator::Accumulator;
use crate::microtask::Scheduler;
use crate::promise::Promise;
use crate::thenable::Input;
use crate::tracing_compat::trace;

/// The tagged per-element record produced by [`all_settled`].
///
/// Serializes to the classic wire shape:
/// `{"status": "fulfilled", "value": …}` or
/// `{"status": "rejected", "reason": …}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Settled<T, E> {
    /// The element settled with a success value.
    Fulfilled {
        /// The element's fulfillment value.
        value: T,
    },
    /// The element settled with a failure reason.
    Rejected {
        /// The element's rejection reason.
        reason: E,
    },
}

impl<T, E> Settled<T, E> {
    /// Whether this record carries a fulfillment.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled { .. })
    }

    /// Whether this record carries a rejection.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// The fulfillment value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Fulfilled { value } => Some(value),
            Self::Rejected { .. } => None,
        }
    }

    /// The rejection reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&E> {
        match self {
            Self::Fulfilled { .. } => None,
            Self::Rejected { reason } => Some(reason),
        }
    }
}

/// Composes every input into one promise of per-element [`Settled`]
/// records, in input order.
///
/// Identical in shape to [`all`](super::all()), except no element outcome can
/// reject the outer promise: both branches write a tagged record into the
/// element's slot, and the outer promise only ever fulfills — its error
/// type is [`Infallible`].
pub fn all_settled<I, In, T, E>(
    scheduler: &Arc<Scheduler>,
    inputs: I,
) -> Promise<Vec<Settled<T, E>>, Infallible>
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
        let fulfilled_slots = Arc::clone(&accumulator);
        let rejected_slots = Arc::clone(&accumulator);
        let on_fulfilled_done = settler.clone();
        let on_rejected_done = settler.clone();
        element.then(
            move |value| {
                if let Some(records) = fulfilled_slots.settle_slot(index, Settled::Fulfilled { value }) {
                    on_fulfilled_done.resolve(records);
                }
            },
            move |reason| {
                if let Some(records) = rejected_slots.settle_slot(index, Settled::Rejected { reason }) {
                    on_rejected_done.resolve(records);
                }
            },
        );
    }

    if let Some(records) = accumulator.finish_discovery() {
        trace!("all_settled: input exhausted with no outstanding elements");
        settler.resolve(records);
    }
    promise
}

#[cfg(test)]
mod tests {
    use super::{Settled, all_settled};
    use crate::microtask::Scheduler;
    use crate::promise::Promise;
    use crate::thenable::Input;
    use std::sync::Arc;

    fn scheduler() -> Arc<Scheduler> {
        Arc::new(Scheduler::new())
    }

    #[test]
    fn empty_input_resolves_with_empty_vec() {
        let scheduler = scheduler();
        let promise = all_settled(&scheduler, Vec::<Promise<i32, String>>::new());
        scheduler.run_until_idle();
        assert_eq!(promise.try_result(), Some(Ok(Vec::new())));
    }

    #[test]
    fn records_mirror_each_source_outcome() {
        let scheduler = scheduler();
        let elements = vec![
            Promise::resolve(&scheduler, Input::value(1)),
            Promise::reject(&scheduler, "down".to_owned()),
        ];
        let promise = all_settled(&scheduler, elements);
        scheduler.run_until_idle();
        let Some(Ok(records)) = promise.try_result() else {
            panic!("all_settled must fulfill");
        };
        assert_eq!(
            records,
            vec![
                Settled::Fulfilled { value: 1 },
                Settled::Rejected {
                    reason: "down".to_owned()
                },
            ]
        );
    }

    #[test]
    fn record_accessors_expose_the_matching_side() {
        let fulfilled: Settled<i32, String> = Settled::Fulfilled { value: 5 };
        let rejected: Settled<i32, String> = Settled::Rejected {
            reason: "x".to_owned(),
        };
        assert!(fulfilled.is_fulfilled());
        assert_eq!(fulfilled.value(), Some(&5));
        assert_eq!(fulfilled.reason(), None);
        assert!(rejected.is_rejected());
        assert_eq!(rejected.reason(), Some(&"x".to_owned()));
        assert_eq!(rejected.value(), None);
    }
}
