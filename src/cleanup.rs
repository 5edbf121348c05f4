//! Routing of per-node cleanup work to its execution context.
//!
//! This is the core state machine of the crate, executed once per node at
//! release time. A node's [`CleanupRoute`] decides whether its cleanup runs
//! inline on the releasing thread, hops to a designated worker context
//! (inline fast path when the releasing thread already is that context,
//! enqueued slow path otherwise), or is enqueued as a suspending unit of
//! work. Orthogonally, the ambient-context stack is either carried to the
//! cleanup or deliberately reset.
//!
//! A node's children travel with its cleanup: whatever thread runs the
//! cleanup also releases the children, which is what lets a single hop at
//! the root of a tree turn every deeper level into a fast-path release.

use std::sync::Arc;

use crate::ambient::{self, AmbientSnapshot};
use crate::exec::{self, CompletionCounter, ContextId};
use crate::topology::GraphNode;

/// What a hand-off does with the releasing thread's ambient bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbientPolicy {
    /// Carry the bindings: untouched on the fast path, snapshotted and
    /// installed around the cleanup on a slow path.
    Copy,
    /// Run the cleanup against an empty ambient stack.
    Reset,
}

/// How a suspending cleanup reaches its suspension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendKind {
    /// Suspends on a no-op that resolves immediately.
    Noop,
    /// Yields once, sending its continuation to the back of the queue.
    Yield,
}

/// Fully resolved cleanup routing for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupRoute {
    /// Decrement inline on whatever thread releases the node.
    Inline,
    /// Cleanup must run on `target`: inline when already there, enqueued
    /// otherwise.
    Designated {
        /// Required execution venue.
        target: ContextId,
        /// Ambient handling.
        ambient: AmbientPolicy,
    },
    /// Cleanup is always enqueued to `target` and suspends mid-flight.
    Suspending {
        /// Required execution venue.
        target: ContextId,
        /// Ambient handling.
        ambient: AmbientPolicy,
        /// Shape of the suspension.
        suspend: SuspendKind,
    },
}

/// Catalog-level cleanup axis, expanded to per-node routes at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupKind {
    /// Every node releases inline.
    Inline,
    /// Every node targets the same designated context.
    Designated {
        /// Required execution venue.
        target: ContextId,
        /// Ambient handling.
        ambient: AmbientPolicy,
    },
    /// Every node enqueues a suspending cleanup on the same context.
    Suspending {
        /// Required execution venue.
        target: ContextId,
        /// Ambient handling.
        ambient: AmbientPolicy,
        /// Shape of the suspension.
        suspend: SuspendKind,
    },
    /// Tree levels alternate between the two designated contexts, so each
    /// level's cleanup hops to the queue its parent did not use.
    Interleaved {
        /// Ambient handling.
        ambient: AmbientPolicy,
    },
}

impl CleanupKind {
    /// Resolves the route for a node at `level` (root is level 0).
    pub fn route_for_level(self, level: usize) -> CleanupRoute {
        match self {
            CleanupKind::Inline => CleanupRoute::Inline,
            CleanupKind::Designated { target, ambient } => {
                CleanupRoute::Designated { target, ambient }
            }
            CleanupKind::Suspending {
                target,
                ambient,
                suspend,
            } => CleanupRoute::Suspending {
                target,
                ambient,
                suspend,
            },
            CleanupKind::Interleaved { ambient } => CleanupRoute::Designated {
                target: if level % 2 == 0 {
                    ContextId::First
                } else {
                    ContextId::Second
                },
                ambient,
            },
        }
    }
}

/// Synthetic destructor cost. Kept opaque so the optimizer cannot elide it.
fn burn(ballast: u32) {
    for i in 0..ballast {
        std::hint::black_box(i);
    }
}

fn run_cleanup(snapshot: Option<&AmbientSnapshot>, counter: &CompletionCounter, ballast: u32) {
    match snapshot {
        Some(snapshot) => ambient::install(snapshot, || {
            burn(ballast);
            counter.arrive();
        }),
        None => {
            burn(ballast);
            counter.arrive();
        }
    }
}

/// Executes the release state machine for one node.
///
/// Called from [`GraphNode`]'s `Drop` impl with the node's children already
/// detached; the children are released inline for inline/fast-path routes
/// and moved into the enqueued job otherwise. The counter arrival for this
/// node always precedes the release of its children, matching
/// owning-reference drop order.
pub(crate) fn dispatch(
    route: CleanupRoute,
    counter: Arc<CompletionCounter>,
    ballast: u32,
    first: Option<Box<GraphNode>>,
    second: Option<Box<GraphNode>>,
) {
    match route {
        CleanupRoute::Inline => {
            burn(ballast);
            counter.arrive();
            drop(first);
            drop(second);
        }
        CleanupRoute::Designated { target, ambient } => {
            if exec::is_on(target) {
                // Fast path: already on the designated context.
                match ambient {
                    AmbientPolicy::Copy => {
                        burn(ballast);
                        counter.arrive();
                    }
                    AmbientPolicy::Reset => ambient::with_cleared(|| {
                        burn(ballast);
                        counter.arrive();
                    }),
                }
                drop(first);
                drop(second);
            } else {
                // Slow path: enqueue and return without blocking. The
                // counter arrives only when the job actually runs.
                let snapshot = match ambient {
                    AmbientPolicy::Copy => Some(ambient::snapshot()),
                    AmbientPolicy::Reset => None,
                };
                exec::submit(
                    target,
                    Box::new(move || {
                        run_cleanup(snapshot.as_ref(), &counter, ballast);
                        drop(first);
                        drop(second);
                    }),
                );
            }
        }
        CleanupRoute::Suspending {
            target,
            ambient,
            suspend,
        } => {
            // Always enqueued, even from the designated context itself.
            let snapshot = match ambient {
                AmbientPolicy::Copy => Some(ambient::snapshot()),
                AmbientPolicy::Reset => None,
            };
            match suspend {
                SuspendKind::Noop => exec::submit(
                    target,
                    Box::new(move || {
                        // The awaited no-op resolves immediately; the unit
                        // runs to completion in one turn of the queue.
                        run_cleanup(snapshot.as_ref(), &counter, ballast);
                        drop(first);
                        drop(second);
                    }),
                ),
                SuspendKind::Yield => exec::submit(
                    target,
                    Box::new(move || {
                        // Yield point: everything after it becomes a
                        // continuation at the back of the same queue.
                        exec::submit(
                            target,
                            Box::new(move || {
                                run_cleanup(snapshot.as_ref(), &counter, ballast);
                                drop(first);
                                drop(second);
                            }),
                        );
                    }),
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleaved_alternates_contexts_by_level() {
        let kind = CleanupKind::Interleaved {
            ambient: AmbientPolicy::Reset,
        };
        for level in 0..6 {
            let expected = if level % 2 == 0 {
                ContextId::First
            } else {
                ContextId::Second
            };
            match kind.route_for_level(level) {
                CleanupRoute::Designated { target, ambient } => {
                    assert_eq!(target, expected);
                    assert_eq!(ambient, AmbientPolicy::Reset);
                }
                other => panic!("unexpected route {other:?}"),
            }
        }
    }

    #[test]
    fn non_interleaved_kinds_ignore_level() {
        let kind = CleanupKind::Designated {
            target: ContextId::Second,
            ambient: AmbientPolicy::Copy,
        };
        assert_eq!(kind.route_for_level(0), kind.route_for_level(17));
    }
}
