// Task Queue Port - the identity every concrete queue satisfies

use crate::domain::{ClosureTask, QueuedTask, TimeDelta};

/// A named queue with a single worker thread.
///
/// Implementations:
/// - `ThreadTaskQueue`: dedicated OS thread with FIFO + timer storage
pub trait TaskQueueBase: Send + Sync {
    /// Stable queue name
    fn name(&self) -> &str;

    /// Run `task` as soon as the worker is free
    fn post_task(&self, task: Box<dyn QueuedTask>);

    /// Run `task` no earlier than `delay` from now
    fn post_delayed_task(&self, task: Box<dyn QueuedTask>, delay: TimeDelta);

    /// Same as `post_delayed_task`. Timers are honored at millisecond
    /// granularity whichever entry point is used.
    fn post_delayed_high_precision_task(&self, task: Box<dyn QueuedTask>, delay: TimeDelta) {
        self.post_delayed_task(task, delay);
    }

    /// True iff called from this queue's worker thread
    fn is_current(&self) -> bool;
}

/// Closure-posting helpers for any queue, trait objects included
pub trait TaskQueueExt: TaskQueueBase {
    fn post<F>(&self, closure: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.post_task(Box::new(ClosureTask::new(closure)));
    }

    fn post_delayed<F>(&self, closure: F, delay: TimeDelta)
    where
        F: FnOnce() + Send + 'static,
    {
        self.post_delayed_task(Box::new(ClosureTask::new(closure)), delay);
    }
}

impl<T: TaskQueueBase + ?Sized> TaskQueueExt for T {}
