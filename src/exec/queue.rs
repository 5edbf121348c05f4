//! Serial worker-context queues.

use std::cell::Cell;
use std::sync::mpsc::{self, Sender};
use std::sync::OnceLock;
use std::thread;

use tracing::debug;

/// Identifies one of the two designated worker contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextId {
    /// The primary hand-off target.
    First,
    /// The secondary target, used to contend with or interleave against
    /// [`ContextId::First`].
    Second,
}

impl ContextId {
    /// Short lowercase name, used for thread names and log fields.
    pub fn name(self) -> &'static str {
        match self {
            ContextId::First => "first",
            ContextId::Second => "second",
        }
    }
}

/// A unit of work enqueued to a context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

thread_local! {
    // Which designated context this thread *is*, if any. Set once by the
    // worker thread before it starts draining jobs.
    static CURRENT: Cell<Option<ContextId>> = const { Cell::new(None) };
}

/// A serial execution queue drained by one dedicated worker thread.
///
/// Jobs submitted to the same queue run in FIFO order, one at a time.
/// Submission is synchronous: when [`submit`](Self::submit) returns, the job
/// is in the queue. That property is what makes the harness's schedule
/// timestamp meaningful.
pub struct SerialQueue {
    id: ContextId,
    tx: Sender<Job>,
}

impl SerialQueue {
    fn spawn(id: ContextId) -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        thread::Builder::new()
            .name(format!("dropmark-{}", id.name()))
            .spawn(move || {
                CURRENT.with(|c| c.set(Some(id)));
                debug!(context = id.name(), "worker context online");
                while let Ok(job) = rx.recv() {
                    job();
                }
            })
            .expect("failed to spawn worker context thread");
        Self { id, tx }
    }

    /// The context this queue serves.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Enqueues `job` behind everything already queued.
    pub fn submit(&self, job: Job) {
        // The worker never exits while the process lives, so a send can only
        // fail after a worker panic, which is already fatal.
        self.tx.send(job).expect("worker context queue closed");
    }

    /// True when the calling thread is this queue's worker.
    pub fn is_current(&self) -> bool {
        current() == Some(self.id)
    }
}

/// The designated context the calling thread belongs to, if any.
pub fn current() -> Option<ContextId> {
    CURRENT.with(Cell::get)
}

/// True when the calling thread is `id`'s worker thread.
pub fn is_on(id: ContextId) -> bool {
    current() == Some(id)
}

/// Returns the process-global queue for `id`, spawning it on first use.
pub fn context(id: ContextId) -> &'static SerialQueue {
    static FIRST: OnceLock<SerialQueue> = OnceLock::new();
    static SECOND: OnceLock<SerialQueue> = OnceLock::new();
    match id {
        ContextId::First => FIRST.get_or_init(|| SerialQueue::spawn(ContextId::First)),
        ContextId::Second => SECOND.get_or_init(|| SerialQueue::spawn(ContextId::Second)),
    }
}

/// Enqueues `job` onto `id`'s queue.
pub fn submit(id: ContextId, job: Job) {
    context(id).submit(job);
}

/// Runs `body` on `id`'s worker thread and blocks for its result.
///
/// Runs `body` directly when the calling thread already is that worker;
/// being the worker means holding the serial slot, so inline execution is
/// the correct serialization (and queueing instead would deadlock).
pub fn run_on<R, F>(id: ContextId, body: F) -> R
where
    R: Send + 'static,
    F: FnOnce() -> R + Send + 'static,
{
    if is_on(id) {
        return body();
    }
    let (tx, rx) = mpsc::channel();
    submit(
        id,
        Box::new(move || {
            let _ = tx.send(body());
        }),
    );
    rx.recv().expect("worker context dropped job result")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn run_on_returns_value_from_worker() {
        let value = run_on(ContextId::First, || 41 + 1);
        assert_eq!(value, 42);
    }

    #[test]
    fn worker_thread_knows_its_identity() {
        assert_eq!(current(), None);
        let id = run_on(ContextId::Second, current);
        assert_eq!(id, Some(ContextId::Second));
        let on_first = run_on(ContextId::First, || is_on(ContextId::Second));
        assert!(!on_first);
    }

    #[test]
    fn jobs_on_one_context_run_in_fifo_order() {
        let order = Arc::new(AtomicUsize::new(0));
        for expected in 0..100 {
            let order = Arc::clone(&order);
            submit(
                ContextId::First,
                Box::new(move || {
                    let seen = order.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(seen, expected);
                }),
            );
        }
        // A run_on job queues behind the 100 submissions.
        let final_count = run_on(ContextId::First, move || order.load(Ordering::SeqCst));
        assert_eq!(final_count, 100);
    }

    #[test]
    fn contexts_run_concurrently() {
        let (tx, rx) = mpsc::channel();
        // First blocks until Second has run, which only works if the two
        // queues drain independently.
        submit(
            ContextId::First,
            Box::new(move || {
                rx.recv().unwrap();
            }),
        );
        submit(
            ContextId::Second,
            Box::new(move || {
                tx.send(()).unwrap();
            }),
        );
        // Drain both queues so later tests see them idle.
        run_on(ContextId::First, || ());
        run_on(ContextId::Second, || ());
    }
}
