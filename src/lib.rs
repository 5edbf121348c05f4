//! # `dropmark` - Deferred-Cleanup Latency Benchmark
//!
//! Measures the latency cost of releasing object graphs whose cleanup work
//! may be deferred to, or executed inline on, designated serial worker
//! contexts. Two wall-clock readings are isolated per run:
//!
//! - **schedule latency**: time to *initiate* release of a graph - from the
//!   drop of the owning reference until every hand-off has been enqueued;
//! - **total latency**: time until *all* cleanup work across the graph,
//!   hand-offs included, has actually completed.
//!
//! ## Architecture
//!
//! The benchmark axes are orthogonal and composed via configuration, never
//! via type hierarchies:
//!
//! 1. **Topology** ([`topology`]): binary tree or flat array of
//!    [`topology::GraphNode`]s, each registered with one shared
//!    [`exec::CompletionCounter`].
//! 2. **Cleanup variant** ([`cleanup`]): per node, cleanup runs inline, hops
//!    to a designated context (inline fast path when the releasing thread
//!    already is that context, FIFO-enqueued slow path otherwise), or is
//!    enqueued as a suspending unit of work; ambient bindings are carried or
//!    reset across the hop.
//! 3. **Ambient context** ([`ambient`]): a thread-local, strictly
//!    stack-ordered set of dynamically scoped bindings simulating the
//!    per-call state a cleanup might inspect or copy.
//!
//! The [`harness`] builds a graph, releases it behind a `black_box` barrier
//! and reads both latencies; [`sampling`] draws (ambient depth, object
//! count) pairs from configurable linear/logarithmic domains; [`catalog`]
//! fixes the named pairings of topology, variant and run context; [`stats`]
//! folds repeated trials into mean and population standard deviation.
//!
//! ## Timing contract
//!
//! Release initiation is synchronous: when the owning reference's drop
//! returns, every hand-off of every node has been enqueued (not merely
//! started enqueuing), so the schedule timestamp is an upper bound on
//! initiation work and never racing it. Completion counting is a single
//! atomic decrement per node - no lock, no critical section - so concurrent
//! cleanups do not perturb the measured latency.

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod ambient;
pub mod catalog;
pub mod cleanup;
pub mod cli;
pub mod exec;
pub mod harness;
pub mod input;
pub mod sampling;
pub mod stats;
pub mod topology;

pub use catalog::{find, BenchmarkSpec, CATALOG};
pub use cleanup::{AmbientPolicy, CleanupKind, CleanupRoute, SuspendKind};
pub use exec::{completion_pair, CompletionCounter, CompletionWaiter, ContextId};
pub use harness::{measure, measure_average, warm_up, Measurement};
pub use input::InputParams;
pub use sampling::{Distribution, Domain, Generator};
pub use stats::{SampleStats, StatsCalculator};
pub use topology::{Graph, GraphNode, TopologyKind};
