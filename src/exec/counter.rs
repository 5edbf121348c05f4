//! Shared completion counting for one graph's cleanup work.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_utils::sync::{Parker, Unparker};
use crossbeam_utils::CachePadded;

/// Counts outstanding node cleanups for a single graph.
///
/// Every constructed node registers exactly once; every node cleanup arrives
/// exactly once, on whatever thread the cleanup ends up running. The
/// decrement is a single atomic `fetch_sub` with no critical section, so
/// concurrent arrivals from worker contexts do not perturb each other.
pub struct CompletionCounter {
    remaining: CachePadded<AtomicUsize>,
    unparker: Unparker,
}

/// Blocking side of a [`CompletionCounter`], held by the measuring thread.
pub struct CompletionWaiter {
    parker: Parker,
    counter: Arc<CompletionCounter>,
}

/// Creates a counter and its waiter. The counter side is cloned into every
/// node of one graph; the waiter stays with the harness.
pub fn completion_pair() -> (Arc<CompletionCounter>, CompletionWaiter) {
    let parker = Parker::new();
    let counter = Arc::new(CompletionCounter {
        remaining: CachePadded::new(AtomicUsize::new(0)),
        unparker: parker.unparker().clone(),
    });
    let waiter = CompletionWaiter {
        parker,
        counter: Arc::clone(&counter),
    };
    (counter, waiter)
}

impl CompletionCounter {
    /// Records one constructed node. Called during graph construction,
    /// strictly before the waiter starts waiting.
    pub fn register(&self) {
        self.remaining.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one completed cleanup, waking the waiter on the final one.
    ///
    /// # Panics
    ///
    /// Panics on underflow. More arrivals than registrations would corrupt
    /// every subsequent total-latency reading, so it is never tolerated.
    pub fn arrive(&self) {
        let previous = self.remaining.fetch_sub(1, Ordering::AcqRel);
        assert!(previous > 0, "completion counter underflow");
        if previous == 1 {
            self.unparker.unpark();
        }
    }

    /// Number of registered cleanups that have not arrived yet.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }
}

impl CompletionWaiter {
    /// Blocks until every registered cleanup has arrived.
    ///
    /// Returns immediately when nothing is outstanding, so an empty graph
    /// measures as zero pending work.
    pub fn wait(&self) {
        while self.counter.remaining() != 0 {
            self.parker.park();
        }
    }
}
