//! Tracing compatibility layer.
//!
//! Provides a single import point for tracing macros that works whether or
//! not the `tracing-integration` feature is enabled. With the feature on,
//! these are the real `tracing` macros; with it off, they expand to nothing
//! so the engine carries zero logging overhead.

#[cfg(feature = "tracing-integration")]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing-integration"))]
mod noop {
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    pub(crate) use {debug, trace};
}

#[cfg(not(feature = "tracing-integration"))]
pub(crate) use noop::{debug, trace};
