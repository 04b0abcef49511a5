//! Zero-cost logging helpers.
//!
//! With the `tracing` feature enabled these macros forward to the `tracing`
//! crate. Without it they expand to nothing.
//!
//! The unit tests install an `EnvFilter` subscriber (see `init_tracing` in
//! the crate's test module), so structural decisions can be watched with:
//!
//! ```bash
//! RUST_LOG=ceb_rs=trace cargo test --features tracing test_delete_self_fork -- --nocapture
//! ```
//!
//! Inserts, unlink shapes and sublist edits log at `trace`, completed
//! deletions at `debug`.

#![allow(unused_macros, unused_imports)]

/// Trace-level logging. No-op without the `tracing` feature.
#[cfg(feature = "tracing")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

/// Debug-level logging. No-op without the `tracing` feature.
#[cfg(feature = "tracing")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub(crate) use debug_log;
pub(crate) use trace_log;
