//! Run-level cancellation.
//!
//! A single [`CancellationToken`] is shared by the run orchestrator,
//! the pipeline runner, and the tool invoker so that one signal
//! terminates every in-flight subprocess promptly.

mod token;

pub use token::CancellationToken;
