//! Combinators that compose many independently-settling promises into one.
//!
//! - [`all`]: wait for everything, fail fast on the first rejection
//! - [`all_settled`]: wait for everything, report every outcome
//! - [`any`]: first fulfillment wins, all-reject aggregates
//! - [`race`]: first settlement wins, fulfillment or rejection alike
//!
//! Each invocation drives its input exactly once, synchronously,
//! normalizing every element through [`Promise::resolve`] and registering
//! per-element continuations that share one accumulator and one guarded
//! capability. Everything after that happens on the scheduler.
//!
//! [`Promise::resolve`]: crate::Promise::resolve
//! [`all`]: fn@all
//! [`all_settled`]: fn@all_settled
//! [`any`]: fn@any
//! [`race`]: fn@race

pub mod all;
pub mod all_settled;
pub mod any;
pub mod race;

pub(crate) mod accumulator;

pub use all::all;
pub use all_settled::{Settled, all_settled};
pub use any::any;
pub use race::race;
