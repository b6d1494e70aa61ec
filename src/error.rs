//! Error types for the combinator engine.
//!
//! Nothing in this engine is fatal: setup failures are compile-time type
//! errors in Rust (the `IntoIterator` bound), and every runtime failure
//! surfaces as a rejected promise. The one synthesized error value is
//! [`AggregateError`], produced by [`any`](crate::combinator::any()) when
//! every input rejects.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bundles every rejection reason of an [`any`](crate::combinator::any())
/// invocation whose inputs all rejected.
///
/// Reasons are ordered by input index, not by settlement order. An empty
/// input produces an aggregate with zero reasons.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("all inputs rejected ({} reasons)", .reasons.len())]
pub struct AggregateError<E> {
    /// Rejection reasons in input order.
    pub reasons: Vec<E>,
}

impl<E> AggregateError<E> {
    /// Wraps the collected reasons.
    #[must_use]
    pub fn new(reasons: Vec<E>) -> Self {
        Self { reasons }
    }

    /// Number of underlying reasons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    /// Whether the aggregate carries no reasons (empty input).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }
}

impl<E> From<Vec<E>> for AggregateError<E> {
    fn from(reasons: Vec<E>) -> Self {
        Self::new(reasons)
    }
}
