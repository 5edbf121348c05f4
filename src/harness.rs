//! Timed release of one object graph.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::ambient;
use crate::cleanup::CleanupKind;
use crate::exec::completion_pair;
use crate::stats::{SampleStats, StatsCalculator};
use crate::topology::{self, TopologyKind};

/// The two wall-clock readings of one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    /// Release initiation: from the drop of the owning reference until every
    /// hand-off has been enqueued (inline cleanup included).
    pub schedule: Duration,
    /// Full completion: from the same origin until every node's cleanup has
    /// run, hand-offs included.
    pub total: Duration,
}

/// Builds a graph of `objects` nodes and times its release.
///
/// The owning reference passes through a `black_box` barrier immediately
/// before the release point, so the compiler can neither begin the teardown
/// early nor sink it past the first timestamp. Dropping it is synchronous up
/// to the point where every node's release initiation has been issued;
/// deferred cleanups are then awaited through the completion counter.
pub fn measure(
    topology: TopologyKind,
    cleanup: CleanupKind,
    objects: usize,
    ballast: u32,
) -> Measurement {
    let (counter, waiter) = completion_pair();
    let graph = topology::build(topology, cleanup, objects, &counter, ballast);

    let t1 = Instant::now();
    drop(std::hint::black_box(graph));
    let t2 = Instant::now();
    waiter.wait();
    let t3 = Instant::now();

    Measurement {
        schedule: t2 - t1,
        total: t3 - t1,
    }
}

/// Repeats [`measure`] and aggregates both readings.
///
/// # Panics
///
/// Panics when `repetitions` is zero.
pub fn measure_average(
    topology: TopologyKind,
    cleanup: CleanupKind,
    objects: usize,
    ballast: u32,
    repetitions: usize,
) -> (SampleStats, SampleStats) {
    let mut schedule = StatsCalculator::new();
    let mut total = StatsCalculator::new();
    for _ in 0..repetitions {
        let measurement = measure(topology, cleanup, objects, ballast);
        schedule.add(measurement.schedule);
        total.add(measurement.total);
    }
    (schedule.stats(), total.stats())
}

/// One minimal-size measurement of the test variant (and baseline, when
/// present) under ambient depth 1, run before any recorded sampling so that
/// one-time costs (context spawn, allocator warm-up) stay out of the first
/// sample.
pub fn warm_up(
    topology: TopologyKind,
    test: CleanupKind,
    baseline: Option<CleanupKind>,
    ballast: u32,
) {
    debug!(?topology, "warming up");
    ambient::with_depth(1, || {
        let _ = measure(topology, test, 1, ballast);
        if let Some(baseline) = baseline {
            let _ = measure(topology, baseline, 1, ballast);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_never_exceeds_total() {
        let m = measure(TopologyKind::Tree, CleanupKind::Inline, 200, 0);
        assert!(m.schedule <= m.total);
    }

    #[test]
    fn empty_graph_measures() {
        let m = measure(TopologyKind::Array, CleanupKind::Inline, 0, 0);
        assert!(m.schedule <= m.total);
    }

    #[test]
    fn measure_average_aggregates_all_repetitions() {
        let (schedule, total) =
            measure_average(TopologyKind::Array, CleanupKind::Inline, 50, 0, 5);
        assert!(schedule.average <= total.average);
    }
}
