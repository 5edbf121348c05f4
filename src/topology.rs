//! Object-graph construction.
//!
//! A topology is a set of [`GraphNode`]s wired to one shared
//! [`CompletionCounter`]: a binary tree with the requested node count split
//! across its subtrees, or a flat array of independent single-node roots.
//! Ownership is strict and acyclic; releasing the owning [`Graph`] reference
//! deterministically releases every node.

use std::sync::Arc;

use crate::cleanup::{self, CleanupKind, CleanupRoute};
use crate::exec::CompletionCounter;

/// Shape of the object graph a benchmark releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyKind {
    /// One binary tree holding all requested nodes.
    Tree,
    /// A flat collection of independent single-node roots.
    Array,
}

/// One unit of a topology.
///
/// Holds up to two owned children, the shared completion counter, its
/// resolved cleanup route and the ballast multiplier. Cleanup is triggered
/// by `Drop`: the drop routine detaches the children and hands them, with
/// the node's own cleanup, to the router.
pub struct GraphNode {
    first: Option<Box<GraphNode>>,
    second: Option<Box<GraphNode>>,
    counter: Arc<CompletionCounter>,
    route: CleanupRoute,
    ballast: u32,
}

impl Drop for GraphNode {
    fn drop(&mut self) {
        let first = self.first.take();
        let second = self.second.take();
        cleanup::dispatch(
            self.route,
            Arc::clone(&self.counter),
            self.ballast,
            first,
            second,
        );
    }
}

/// Owning reference(s) to one constructed topology. Dropping it initiates
/// release of every node.
pub enum Graph {
    /// Root of the tree variant (`None` for zero requested objects).
    Tree(Option<Box<GraphNode>>),
    /// Roots of the array variant.
    Array(Vec<GraphNode>),
}

/// Builds a graph of exactly `objects` nodes, registering each with
/// `counter`.
pub fn build(
    kind: TopologyKind,
    cleanup: CleanupKind,
    objects: usize,
    counter: &Arc<CompletionCounter>,
    ballast: u32,
) -> Graph {
    match kind {
        TopologyKind::Tree => Graph::Tree(build_subtree(objects, 0, cleanup, counter, ballast)),
        TopologyKind::Array => Graph::Array(
            (0..objects)
                .map(|_| {
                    counter.register();
                    GraphNode {
                        first: None,
                        second: None,
                        counter: Arc::clone(counter),
                        route: cleanup.route_for_level(0),
                        ballast,
                    }
                })
                .collect(),
        ),
    }
}

// The root consumes one node; of the remaining r, the first subtree gets
// r / 2 and the second the rest. A subtree allotted zero nodes is absent.
fn build_subtree(
    objects: usize,
    level: usize,
    cleanup: CleanupKind,
    counter: &Arc<CompletionCounter>,
    ballast: u32,
) -> Option<Box<GraphNode>> {
    if objects == 0 {
        return None;
    }
    counter.register();
    let rest = objects - 1;
    let left = rest / 2;
    let right = rest - left;
    Some(Box::new(GraphNode {
        first: build_subtree(left, level + 1, cleanup, counter, ballast),
        second: build_subtree(right, level + 1, cleanup, counter, ballast),
        counter: Arc::clone(counter),
        route: cleanup.route_for_level(level),
        ballast,
    }))
}
