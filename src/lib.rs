//! Conflux: order-preserving combinators for settleable futures.
//!
//! # Overview
//!
//! Conflux composes many independently-settling asynchronous computations
//! into one aggregate result: [`all`], [`all_settled`], [`any`], and
//! [`race`], built on a small settlable-cell primitive ([`Promise`]), a
//! one-shot resolution capability ([`Settler`]), and an explicit FIFO
//! microtask queue ([`Scheduler`]). There is no ambient runtime: every
//! constructor and combinator takes its scheduler explicitly, and work
//! only happens when the owner drains the queue.
//!
//! # Core Guarantees
//!
//! - **Exactly-once settlement**: one transition out of `Pending` ever
//!   takes effect; resolve/reject share a first-call-wins guard
//! - **Order preservation**: `all`/`all_settled`/`any` index results by
//!   input position, captured at registration time, never by settlement
//!   order
//! - **No synchronous reentry**: continuations always run from the queue,
//!   never inside `then` or inside the settling call
//! - **Hostile-producer safety**: foreign thenables may double-settle,
//!   throw after settling, or never settle; the adapter absorbs all of it
//! - **No cancellation**: losing elements run to completion and their
//!   results are discarded by the guard
//!
//! # Module Structure
//!
//! - [`microtask`]: the explicit FIFO scheduler
//! - [`promise`]: the settlable future primitive and leaf helpers
//! - [`capability`]: the one-shot resolution capability
//! - [`thenable`]: input classification and the foreign-producer adapter
//! - [`combinator`]: `all`, `all_settled`, `any`, `race`
//! - [`error`](mod@error): the aggregate rejection type
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use conflux::{Input, Promise, Scheduler, all};
//!
//! let scheduler = Arc::new(Scheduler::new());
//! let (later, settler) = Promise::<i32, String>::with_resolvers(&scheduler);
//! let ready = Promise::resolve(&scheduler, Input::value(1));
//! let combined = all(&scheduler, vec![ready, later]);
//!
//! settler.resolve(2);
//! scheduler.run_until_idle();
//! assert_eq!(combined.try_result(), Some(Ok(vec![1, 2])));
//! ```
//!
//! [`all`]: fn@all
//! [`all_settled`]: fn@all_settled
//! [`any`]: fn@any
//! [`race`]: fn@race

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]

pub mod capability;
pub mod combinator;
pub mod error;
pub mod microtask;
pub mod promise;
pub mod thenable;

mod tracing_compat;

pub use capability::Settler;
pub use combinator::{Settled, all, all_settled, any, race};
pub use error::AggregateError;
pub use microtask::Scheduler;
pub use promise::{Promise, PromiseState};
pub use thenable::{Input, Thenable};
