//! Execution contexts for reads and result delivery.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};

/// A unit of work submitted to an execution context.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Target for a watcher's reads and result deliveries.
///
/// The context decouples delivery from the registry's notifying thread: a
/// slow handler stalls only its own context, never broadcast fan-out to
/// other watchers.
///
/// Implementations must not run tasks inline on the submitting thread, and
/// must run tasks in submission order. The engine's delivery-ordering
/// guarantees (initial result before any change-triggered result, no stale
/// result after a newer one) are stated relative to that serial-FIFO
/// contract.
pub trait ExecutionContext: Send + Sync + 'static {
    /// Submit a task for later execution.
    fn execute(&self, task: Task);
}

struct ThreadContextInner {
    queue: Mutex<VecDeque<Task>>,
    available: Condvar,
    shutdown: AtomicBool,
}

impl ThreadContextInner {
    fn run(&self) {
        loop {
            let mut queue = self.queue.lock();
            loop {
                if let Some(task) = queue.pop_front() {
                    drop(queue);
                    task();
                    break;
                }
                // Queue drained; only now is shutdown honored.
                if self.shutdown.load(Ordering::Acquire) {
                    return;
                }
                self.available.wait(&mut queue);
            }
        }
    }
}

/// Context backed by a dedicated worker thread.
///
/// Tasks run one at a time, in submission order. Dropping the context runs
/// every task already queued to completion, then stops the worker; tasks
/// submitted after the drop began are discarded.
pub struct ThreadContext {
    inner: Arc<ThreadContextInner>,
    worker: Option<thread::JoinHandle<()>>,
}

impl ThreadContext {
    /// Spawn the worker thread.
    pub fn new() -> Self {
        let inner = Arc::new(ThreadContextInner {
            queue: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            shutdown: AtomicBool::new(false),
        });
        let worker_inner = inner.clone();
        let worker = thread::spawn(move || worker_inner.run());
        Self {
            inner,
            worker: Some(worker),
        }
    }
}

impl Default for ThreadContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext for ThreadContext {
    fn execute(&self, task: Task) {
        if self.inner.shutdown.load(Ordering::Acquire) {
            return;
        }
        self.inner.queue.lock().push_back(task);
        self.inner.available.notify_one();
    }
}

impl Drop for ThreadContext {
    fn drop(&mut self) {
        self.inner.shutdown.store(true, Ordering::Release);
        self.inner.available.notify_one();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Context whose queue is drained explicitly by the caller.
///
/// Nothing runs until [`run_pending`](ManualContext::run_pending) is called,
/// which makes delivery timing fully deterministic in tests and in
/// single-threaded drivers that want to pump the engine themselves.
#[derive(Default)]
pub struct ManualContext {
    queue: Mutex<VecDeque<Task>>,
}

impl ManualContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks currently queued.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run queued tasks until the queue is empty, including tasks they
    /// enqueue while running. Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.queue.lock().pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}

impl ExecutionContext for ManualContext {
    fn execute(&self, task: Task) {
        self.queue.lock().push_back(task);
    }
}
