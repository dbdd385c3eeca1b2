// Queued Task - unit of work executed on a queue's worker thread

use std::fmt;

/// Outcome reported by a task after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The task is finished; the queue releases it.
    Completed,
    /// The task moved itself elsewhere (usually back into a queue) and now
    /// manages its own lifetime.
    Retained,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Completed => write!(f, "COMPLETED"),
            TaskStatus::Retained => write!(f, "RETAINED"),
        }
    }
}

/// Move-only unit of work.
///
/// `run` consumes the box. A task that wants to run again posts `self` back
/// to a queue and returns [`TaskStatus::Retained`]; otherwise it returns
/// [`TaskStatus::Completed`] and is dropped when `run` returns.
///
/// # Example
/// ```text
/// struct Countdown { left: u32, queue: QueueHandle }
///
/// impl QueuedTask for Countdown {
///     fn run(mut self: Box<Self>) -> TaskStatus {
///         if self.left == 0 {
///             return TaskStatus::Completed;
///         }
///         self.left -= 1;
///         let queue = self.queue.clone();
///         queue.post_task(self);
///         TaskStatus::Retained
///     }
/// }
/// ```
pub trait QueuedTask: Send + 'static {
    fn run(self: Box<Self>) -> TaskStatus;
}

/// Adapts a plain closure into a [`QueuedTask`] that always completes.
pub struct ClosureTask<F> {
    closure: F,
}

impl<F> ClosureTask<F>
where
    F: FnOnce() + Send + 'static,
{
    pub fn new(closure: F) -> Self {
        Self { closure }
    }
}

impl<F> QueuedTask for ClosureTask<F>
where
    F: FnOnce() + Send + 'static,
{
    fn run(self: Box<Self>) -> TaskStatus {
        (self.closure)();
        TaskStatus::Completed
    }
}

impl<F> fmt::Debug for ClosureTask<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureTask").finish_non_exhaustive()
    }
}

/// Box a closure as a queued task
pub fn to_queued_task<F>(closure: F) -> Box<dyn QueuedTask>
where
    F: FnOnce() + Send + 'static,
{
    Box::new(ClosureTask::new(closure))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_closure_task_runs_once_and_completes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let task = to_queued_task(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(task.run(), TaskStatus::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_task_status_display() {
        assert_eq!(TaskStatus::Completed.to_string(), "COMPLETED");
        assert_eq!(TaskStatus::Retained.to_string(), "RETAINED");
    }
}
