use dropmark::{
    ambient, exec, measure, AmbientPolicy, CleanupKind, ContextId, TopologyKind,
};

#[test]
fn deep_ambient_stacks_are_supported() {
    // The configured default domain maximum; one growable array, no
    // reallocation thrashing expected.
    ambient::with_depth(10_000, || {
        assert_eq!(ambient::depth(), 10_000);
    });
    assert_eq!(ambient::depth(), 0);
}

#[test]
fn copy_handoff_leaves_worker_stacks_balanced() {
    // A copy hand-off installs a snapshot of 64 bindings around each of the
    // 200 cleanups running on First. Afterwards the worker's own stack must
    // be back at zero depth, or the install discipline leaked.
    ambient::with_depth(64, || {
        let kind = CleanupKind::Designated {
            target: ContextId::First,
            ambient: AmbientPolicy::Copy,
        };
        let m = measure(TopologyKind::Array, kind, 200, 0);
        assert!(m.schedule <= m.total);
    });
    let worker_depth = exec::run_on(ContextId::First, ambient::depth);
    assert_eq!(worker_depth, 0);
}

#[test]
fn reset_handoff_leaves_worker_stacks_balanced() {
    ambient::with_depth(64, || {
        let kind = CleanupKind::Designated {
            target: ContextId::First,
            ambient: AmbientPolicy::Reset,
        };
        let _ = measure(TopologyKind::Array, kind, 200, 0);
    });
    let worker_depth = exec::run_on(ContextId::First, ambient::depth);
    assert_eq!(worker_depth, 0);
}

#[test]
fn releasing_thread_keeps_its_bindings_across_handoffs() {
    ambient::with_depth(16, || {
        let kind = CleanupKind::Interleaved {
            ambient: AmbientPolicy::Copy,
        };
        let _ = measure(TopologyKind::Tree, kind, 100, 0);
        // Hand-offs snapshot, they never steal.
        assert_eq!(ambient::depth(), 16);
    });
    assert_eq!(ambient::depth(), 0);
}
