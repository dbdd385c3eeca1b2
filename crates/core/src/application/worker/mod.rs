// Worker - single-threaded task queue backed by a dedicated OS thread

pub mod constants;
mod panic_guard;
mod pending;

use constants::*;
pub use panic_guard::{execute_guarded, precondition_violated, PanicGuardResult};

use crate::application::current::{is_current_queue, CurrentTaskQueueSetter};
use crate::application::signal::{Signal, SignalOnDrop};
use crate::domain::{to_queued_task, QueueState, QueuedTask, TimeDelta};
use crate::error::{QueueError, Result};
use crate::port::{Clock, Closure, TaskQueueBase};
use parking_lot::Mutex;
use pending::{NextTask, PendingTasks};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, trace};

/// The concrete queue: FIFO + timer storage drained by one worker thread.
///
/// Created through `TaskQueue`, which owns the worker thread and tears it
/// down. Everything shared with producers (storage, order counter, lifecycle
/// state) sits behind one mutex; the wake signal is always set after that
/// lock is released.
pub struct ThreadTaskQueue {
    name: String,
    clock: Arc<dyn Clock>,
    pending: Mutex<PendingTasks>,
    // Signaled whenever a task is posted or shutdown is requested.
    flag_notify: Signal,
}

impl ThreadTaskQueue {
    /// Spawn the worker and block until it has installed itself as the
    /// thread's current queue.
    pub(crate) fn start(name: String, clock: Arc<dyn Clock>) -> Result<(Arc<Self>, JoinHandle<()>)> {
        let queue = Arc::new(Self {
            name: name.clone(),
            clock,
            pending: Mutex::new(PendingTasks::new()),
            flag_notify: Signal::new(),
        });

        let started = Arc::new(Signal::new());
        let worker_queue = Arc::clone(&queue);
        let worker_started = Arc::clone(&started);

        let worker = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let identity: Arc<dyn TaskQueueBase> = worker_queue.clone();
                let _current = CurrentTaskQueueSetter::new(Some(identity));
                worker_started.set();
                worker_queue.process_tasks();
            })
            .map_err(|source| QueueError::Spawn {
                name: name.clone(),
                source,
            })?;

        started.wait(STARTUP_GIVE_UP_AFTER);
        info!(queue = %name, "Task queue started");

        Ok((queue, worker))
    }

    pub fn state(&self) -> QueueState {
        self.pending.lock().state()
    }

    /// Request shutdown: nothing stored is run after this returns.
    ///
    /// Aborts the process if called from this queue's own worker, or twice.
    pub(crate) fn delete(&self) {
        if self.is_current() {
            precondition_violated(
                &self.name,
                format_args!("task queue deleted from its own worker thread"),
            );
        }

        let requested = self.pending.lock().request_quit();
        if let Err(err) = requested {
            precondition_violated(
                &self.name,
                format_args!("task queue deleted twice: {}", err),
            );
        }

        self.notify_wake();
    }

    /// Record that the worker thread has exited
    pub(crate) fn mark_stopped(&self) {
        let stopped = self.pending.lock().mark_stopped();
        match stopped {
            Ok(()) => info!(queue = %self.name, "Task queue stopped"),
            Err(err) => debug!(queue = %self.name, error = %err, "Task queue stop ignored"),
        }
    }

    /// Post `task` and block until it ran or was discarded.
    ///
    /// Aborts the process if called from this queue's own worker.
    pub(crate) fn post_and_wait(&self, task: Closure) {
        if self.is_current() {
            precondition_violated(
                &self.name,
                format_args!("blocking sync from the queue's own worker"),
            );
        }

        let done = Arc::new(Signal::new());
        let completion = SignalOnDrop::new(Arc::clone(&done));
        self.post_task(to_queued_task(move || {
            let _completion = completion;
            task();
        }));

        done.wait_with_warning(SYNC_GIVE_UP_AFTER, DEADLOCK_WARN_AFTER);
    }

    fn process_tasks(&self) {
        loop {
            let now_us = self.clock.now_micros();
            let next = self.pending.lock().next_task(now_us);

            match next {
                NextTask::Quit => break,
                NextTask::Run(task) => {
                    if let PanicGuardResult::Success(status) =
                        execute_guarded(&self.name, AssertUnwindSafe(move || task.run()))
                    {
                        trace!(queue = %self.name, status = %status, "Task finished");
                    }
                    // Drain eagerly before sleeping.
                    continue;
                }
                NextTask::Idle(sleep_time) => {
                    self.flag_notify.wait(sleep_time);
                }
            }
        }

        let discarded = self.pending.lock().take_all();
        if !discarded.is_empty() {
            debug!(
                queue = %self.name,
                discarded = discarded.len(),
                "Discarding tasks left at shutdown"
            );
        }
        // Dropped outside the lock: a task's destructor may post again.
        drop(discarded);
    }

    // Any state change must be committed before the wake is signaled, or the
    // worker could wake, find nothing, and sleep past the new task.
    fn notify_wake(&self) {
        self.flag_notify.set();
    }

    fn discard(&self, task: Box<dyn QueuedTask>) {
        trace!(queue = %self.name, "Queue is shutting down, dropping posted task");
        drop(task);
    }
}

impl TaskQueueBase for ThreadTaskQueue {
    fn name(&self) -> &str {
        &self.name
    }

    fn post_task(&self, task: Box<dyn QueuedTask>) {
        let rejected = self.pending.lock().push(task).err();
        if let Some(task) = rejected {
            self.discard(task);
            return;
        }

        self.notify_wake();
    }

    fn post_delayed_task(&self, task: Box<dyn QueuedTask>, delay: TimeDelta) {
        let delay_us = delay.us().max(0);
        let next_fire_at_us = self.clock.now_micros().saturating_add(delay_us);

        let rejected = self.pending.lock().push_delayed(task, next_fire_at_us).err();
        if let Some(task) = rejected {
            self.discard(task);
            return;
        }

        trace!(queue = %self.name, delay = %delay, "Delayed task posted");
        self.notify_wake();
    }

    fn is_current(&self) -> bool {
        is_current_queue(self)
    }
}
