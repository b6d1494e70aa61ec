//! Per-invocation bookkeeping for the order-preserving combinators.
//!
//! Each `all` / `all_settled` / `any` call owns exactly one accumulator:
//! an index-addressed slot vector plus the biased `remaining` counter. The
//! counter starts at 1 ("iteration in progress"), gains 1 per discovered
//! element, loses 1 per settled slot, and loses the bias once the input is
//! exhausted. Completion fires exactly when it reaches 0 — which can only
//! happen once, because the arithmetic is monotonically decreasing after
//! discovery ends and every completion path runs behind the outer
//! capability's one-shot guard anyway.
//!
//! Slots are written by input index, captured at registration time, never
//! by settlement order; that is the whole order-preservation guarantee.

use parking_lot::Mutex;

/// Counter-plus-slots state shared by one combinator invocation's
/// per-element continuations.
pub(crate) struct Accumulator<S> {
    inner: Mutex<AccumState<S>>,
}

struct AccumState<S> {
    slots: Vec<Option<S>>,
    remaining: usize,
}

impl<S> Accumulator<S> {
    /// Starts with the iteration-in-progress bias of 1.
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(AccumState {
                slots: Vec::new(),
                remaining: 1,
            }),
        }
    }

    /// Reserves the next slot and returns its index.
    pub(crate) fn discover(&self) -> usize {
        let mut state = self.inner.lock();
        state.remaining += 1;
        state.slots.push(None);
        state.slots.len() - 1
    }

    /// Writes a settlement into its reserved slot and decrements the
    /// counter. Returns the completed results when this was the last
    /// outstanding settlement.
    pub(crate) fn settle_slot(&self, index: usize, settlement: S) -> Option<Vec<S>> {
        let mut state = self.inner.lock();
        state.slots[index] = Some(settlement);
        state.remaining -= 1;
        if state.remaining == 0 {
            Some(Self::drain(&mut state))
        } else {
            None
        }
    }

    /// Removes the iteration bias after the input is exhausted. Returns the
    /// completed results when every discovered element already settled —
    /// including the empty-input case, where the results are empty.
    pub(crate) fn finish_discovery(&self) -> Option<Vec<S>> {
        let mut state = self.inner.lock();
        state.remaining -= 1;
        if state.remaining == 0 {
            Some(Self::drain(&mut state))
        } else {
            None
        }
    }

    fn drain(state: &mut AccumState<S>) -> Vec<S> {
        let slots = std::mem::take(&mut state.slots);
        debug_assert!(slots.iter().all(Option::is_some));
        slots.into_iter().flatten().collect()
    }
}
