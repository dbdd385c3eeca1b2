// Task Queue - owning handle and posting handles over a worker

use crate::application::worker::ThreadTaskQueue;
use crate::domain::{validate_queue_name, ClosureTask, QueueState, QueuedTask, TimeDelta};
use crate::error::Result;
use crate::port::{Clock, Closure, Executor, MonotonicClock, TaskQueueBase};
use std::fmt;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::error;

/// Owns one queue and its worker thread.
///
/// Move-only. Dropping it shuts the queue down synchronously: shutdown is
/// requested, the worker thread is joined, and only then is the queue marked
/// stopped. Tasks still running during teardown may keep posting to the
/// queue through a [`QueueHandle`]; those posts are discarded.
///
/// Dropping a `TaskQueue` on its own worker thread aborts the process,
/// since the join would wait on itself.
///
/// # Example
/// ```text
/// let queue = TaskQueue::new("worker")?;
/// queue.post(|| println!("runs on 'worker'"));
/// queue.post_delayed(|| println!("50ms later"), TimeDelta::millis(50));
/// ```
pub struct TaskQueue {
    inner: Arc<ThreadTaskQueue>,
    worker: Option<JoinHandle<()>>,
}

impl TaskQueue {
    /// Create a queue on the monotonic system clock
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::with_clock(name, Arc::new(MonotonicClock))
    }

    /// Create a queue with an injected clock (for deterministic testing)
    pub fn with_clock(name: impl Into<String>, clock: Arc<dyn Clock>) -> Result<Self> {
        let name = name.into();
        validate_queue_name(&name)?;

        let (inner, worker) = ThreadTaskQueue::start(name, clock)?;
        Ok(Self {
            inner,
            worker: Some(worker),
        })
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn is_current(&self) -> bool {
        self.inner.is_current()
    }

    pub fn state(&self) -> QueueState {
        self.inner.state()
    }

    pub fn post_task(&self, task: Box<dyn QueuedTask>) {
        self.inner.post_task(task);
    }

    pub fn post_delayed_task(&self, task: Box<dyn QueuedTask>, delay: TimeDelta) {
        self.inner.post_delayed_task(task, delay);
    }

    pub fn post<F>(&self, closure: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.post_task(Box::new(ClosureTask::new(closure)));
    }

    pub fn post_delayed<F>(&self, closure: F, delay: TimeDelta)
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.post_delayed_task(Box::new(ClosureTask::new(closure)), delay);
    }

    /// Non-owning handle for posting from other threads or from tasks
    pub fn handle(&self) -> QueueHandle {
        QueueHandle {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        self.inner.delete();

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(queue = %self.inner.name(), "Task queue worker exited abnormally");
            }
        }

        self.inner.mark_stopped();
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("name", &self.name())
            .field("state", &self.state())
            .finish()
    }
}

impl Executor for TaskQueue {
    fn is_current(&self) -> bool {
        self.inner.is_current()
    }

    fn sync(&self, task: Closure) {
        self.inner.post_and_wait(task);
    }

    fn dispatch(&self, task: Closure) {
        self.inner.post_task(Box::new(ClosureTask::new(task)));
    }
}

/// Cloneable posting handle to a queue.
///
/// Does not keep the worker alive. Once the owning [`TaskQueue`] is gone,
/// posts through a handle are accepted and dropped without running.
#[derive(Clone)]
pub struct QueueHandle {
    inner: Arc<ThreadTaskQueue>,
}

impl QueueHandle {
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn is_current(&self) -> bool {
        self.inner.is_current()
    }

    pub fn state(&self) -> QueueState {
        self.inner.state()
    }

    /// The handle as a shareable queue identity
    pub fn as_dyn(&self) -> Arc<dyn TaskQueueBase> {
        self.inner.clone()
    }

    /// Whether both handles refer to the same queue instance
    pub fn same_queue(&self, other: &QueueHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl TaskQueueBase for QueueHandle {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn post_task(&self, task: Box<dyn QueuedTask>) {
        self.inner.post_task(task);
    }

    fn post_delayed_task(&self, task: Box<dyn QueuedTask>, delay: TimeDelta) {
        self.inner.post_delayed_task(task, delay);
    }

    fn is_current(&self) -> bool {
        self.inner.is_current()
    }
}

impl Executor for QueueHandle {
    fn is_current(&self) -> bool {
        self.inner.is_current()
    }

    fn sync(&self, task: Closure) {
        self.inner.post_and_wait(task);
    }

    fn dispatch(&self, task: Closure) {
        self.inner.post_task(Box::new(ClosureTask::new(task)));
    }
}

impl fmt::Debug for QueueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueHandle")
            .field("name", &self.inner.name())
            .finish()
    }
}
