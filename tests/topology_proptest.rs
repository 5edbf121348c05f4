use dropmark::{completion_pair, topology, CleanupKind, Domain, TopologyKind};
use proptest::prelude::*;

proptest! {
    // Exactly n registrations for n requested objects, and a full release
    // drives the counter to exactly zero, never negative (an underflow
    // would assert inside arrive()).
    #[test]
    fn builders_register_exactly_n(n in 0usize..512, tree in any::<bool>()) {
        let kind = if tree { TopologyKind::Tree } else { TopologyKind::Array };
        let (counter, waiter) = completion_pair();
        let graph = topology::build(kind, CleanupKind::Inline, n, &counter, 0);
        prop_assert_eq!(counter.remaining(), n);
        drop(graph);
        prop_assert_eq!(counter.remaining(), 0);
        waiter.wait();
    }

    #[test]
    fn domain_display_parse_round_trip(
        min in 1usize..10_000,
        extra in 0usize..10_000,
        logarithmic in any::<bool>(),
    ) {
        let dist = if logarithmic { "logarithmic" } else { "linear" };
        let mut domain = Domain::linear(1, 1);
        domain
            .merge_str(&format!("{min}:{}:{dist}", min + extra))
            .unwrap();

        let mut reparsed = Domain::linear(1, 1);
        reparsed.merge_str(&domain.to_string()).unwrap();
        prop_assert_eq!(reparsed, domain);
    }
}
