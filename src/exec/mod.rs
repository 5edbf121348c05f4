//! Designated worker contexts and cross-context completion counting.
//!
//! Two process-global serial contexts ([`ContextId::First`] and
//! [`ContextId::Second`]) are available as hand-off targets for deferred
//! cleanup work. Each is a FIFO queue drained by one dedicated thread:
//! work items on one context execute strictly one at a time, while contexts
//! run concurrently with each other and with the submitting thread.
//!
//! Contexts are spawned lazily on first use and live for the rest of the
//! process, mirroring a global-executor model. There is deliberately no
//! shutdown path; a benchmark run exits the process when done.

mod counter;
mod queue;

pub use counter::{completion_pair, CompletionCounter, CompletionWaiter};
pub use queue::{context, current, is_on, run_on, submit, ContextId, Job, SerialQueue};
