//! The fixed catalog of named benchmarks.
//!
//! Populated once at compile time and immutable for the life of the
//! process; nothing ever mutates it from a worker context. Each entry pins
//! a topology, a cleanup variant, an optional baseline variant measured
//! back-to-back for delta reporting, and the context the releasing thread
//! runs on.

use crate::cleanup::{AmbientPolicy, CleanupKind, SuspendKind};
use crate::exec::ContextId;
use crate::topology::TopologyKind;

/// One named benchmark configuration.
pub struct BenchmarkSpec {
    /// Catalog key.
    pub name: &'static str,
    /// One-line description for the usage listing.
    pub help: &'static str,
    /// Context the releasing thread is pinned to; `None` releases from the
    /// caller's own thread. Hand-off benchmarks never run on the context
    /// their cleanup targets: a waiter occupying that queue would deadlock
    /// the cleanups it waits for.
    pub run_context: Option<ContextId>,
    /// Graph shape.
    pub topology: TopologyKind,
    /// Variant under test.
    pub test: CleanupKind,
    /// Variant subtracted from the test readings, when present.
    pub baseline: Option<CleanupKind>,
}

/// All registered benchmarks.
pub const CATALOG: &[BenchmarkSpec] = &[
    BenchmarkSpec {
        name: "async_tree",
        help: "Cost of suspending no-op cleanup vs inline, binary tree of objects",
        run_context: Some(ContextId::Second),
        topology: TopologyKind::Tree,
        test: CleanupKind::Suspending {
            target: ContextId::First,
            ambient: AmbientPolicy::Reset,
            suspend: SuspendKind::Noop,
        },
        baseline: Some(CleanupKind::Inline),
    },
    BenchmarkSpec {
        name: "async_array",
        help: "Cost of suspending no-op cleanup vs inline, array of objects",
        run_context: Some(ContextId::Second),
        topology: TopologyKind::Array,
        test: CleanupKind::Suspending {
            target: ContextId::First,
            ambient: AmbientPolicy::Reset,
            suspend: SuspendKind::Noop,
        },
        baseline: Some(CleanupKind::Inline),
    },
    BenchmarkSpec {
        name: "async_copy_noop",
        help: "Cost of carrying ambient bindings into a suspending no-op cleanup",
        run_context: Some(ContextId::Second),
        topology: TopologyKind::Tree,
        test: CleanupKind::Suspending {
            target: ContextId::First,
            ambient: AmbientPolicy::Copy,
            suspend: SuspendKind::Noop,
        },
        baseline: Some(CleanupKind::Suspending {
            target: ContextId::First,
            ambient: AmbientPolicy::Reset,
            suspend: SuspendKind::Noop,
        }),
    },
    BenchmarkSpec {
        name: "async_copy_yield",
        help: "Cost of carrying ambient bindings into a yielding cleanup",
        run_context: Some(ContextId::Second),
        topology: TopologyKind::Tree,
        test: CleanupKind::Suspending {
            target: ContextId::First,
            ambient: AmbientPolicy::Copy,
            suspend: SuspendKind::Yield,
        },
        baseline: Some(CleanupKind::Suspending {
            target: ContextId::First,
            ambient: AmbientPolicy::Reset,
            suspend: SuspendKind::Yield,
        }),
    },
    BenchmarkSpec {
        name: "isolated_no_hop_copy",
        help: "Fast path of context-bound cleanup carrying ambient bindings",
        run_context: Some(ContextId::First),
        topology: TopologyKind::Tree,
        test: CleanupKind::Designated {
            target: ContextId::First,
            ambient: AmbientPolicy::Copy,
        },
        baseline: Some(CleanupKind::Inline),
    },
    BenchmarkSpec {
        name: "isolated_no_hop_reset",
        help: "Fast path of context-bound cleanup resetting ambient bindings",
        run_context: Some(ContextId::First),
        topology: TopologyKind::Tree,
        test: CleanupKind::Designated {
            target: ContextId::First,
            ambient: AmbientPolicy::Reset,
        },
        baseline: Some(CleanupKind::Inline),
    },
    BenchmarkSpec {
        name: "isolated_hop_copy",
        help: "Slow path of context-bound cleanup copying ambient bindings",
        run_context: Some(ContextId::Second),
        topology: TopologyKind::Array,
        test: CleanupKind::Designated {
            target: ContextId::First,
            ambient: AmbientPolicy::Copy,
        },
        baseline: Some(CleanupKind::Inline),
    },
    BenchmarkSpec {
        name: "isolated_hop_reset",
        help: "Slow path of context-bound cleanup ignoring ambient bindings",
        run_context: Some(ContextId::Second),
        topology: TopologyKind::Array,
        test: CleanupKind::Designated {
            target: ContextId::First,
            ambient: AmbientPolicy::Reset,
        },
        baseline: Some(CleanupKind::Inline),
    },
    BenchmarkSpec {
        name: "isolated_copy",
        help: "Cost of the ambient snapshot alone on the slow path",
        run_context: Some(ContextId::Second),
        topology: TopologyKind::Array,
        test: CleanupKind::Designated {
            target: ContextId::First,
            ambient: AmbientPolicy::Copy,
        },
        baseline: Some(CleanupKind::Designated {
            target: ContextId::First,
            ambient: AmbientPolicy::Reset,
        }),
    },
    BenchmarkSpec {
        name: "interleaved_tree",
        help: "Cross-context hand-off chains: tree levels alternate contexts",
        run_context: None,
        topology: TopologyKind::Tree,
        test: CleanupKind::Interleaved {
            ambient: AmbientPolicy::Reset,
        },
        baseline: Some(CleanupKind::Inline),
    },
    BenchmarkSpec {
        name: "interleaved_copy",
        help: "Ambient copy cost across alternating-context hand-off chains",
        run_context: None,
        topology: TopologyKind::Tree,
        test: CleanupKind::Interleaved {
            ambient: AmbientPolicy::Copy,
        },
        baseline: Some(CleanupKind::Interleaved {
            ambient: AmbientPolicy::Reset,
        }),
    },
];

/// Looks a benchmark up by name.
pub fn find(name: &str) -> Option<&'static BenchmarkSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert!(find("async_tree").is_some());
        assert!(find("isolated_copy").is_some());
        assert!(find("no_such_benchmark").is_none());
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in &CATALOG[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn waiters_never_occupy_a_handoff_target() {
        use crate::cleanup::CleanupRoute;

        for spec in CATALOG {
            let Some(run) = spec.run_context else {
                continue;
            };
            for kind in std::iter::once(spec.test).chain(spec.baseline) {
                // Probe a few levels; interleaved kinds vary by level.
                for level in 0..4 {
                    match kind.route_for_level(level) {
                        CleanupRoute::Inline => {}
                        // A fast-path designated cleanup may share the run
                        // context (it runs inline there); only enqueued
                        // routes must avoid it.
                        CleanupRoute::Designated { .. } => {}
                        CleanupRoute::Suspending { target, .. } => {
                            assert_ne!(
                                target, run,
                                "{}: suspending cleanup targets its own waiter context",
                                spec.name
                            );
                        }
                    }
                }
            }
        }
    }
}
