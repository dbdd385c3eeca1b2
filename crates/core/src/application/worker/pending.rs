// Pending Tasks - FIFO and timer storage plus next-task selection
//
// Only ever touched with the owning queue's lock held.

use crate::domain::{QueueState, QueuedTask, TimeDelta};
use crate::error::Result;
use std::collections::{BTreeMap, VecDeque};

/// Per-queue submission counter, used only to break ordering ties
pub(crate) type OrderId = u64;

/// Key of a delayed task: fire time first, submission order second.
///
/// Field order matters: the derived `Ord` compares `next_fire_at_us` and
/// then `order`, so two timers for the same microsecond run in FIFO order
/// and no two keys are ever equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct DelayedEntryTimeout {
    pub next_fire_at_us: i64,
    pub order: OrderId,
}

/// What the worker should do next
pub(crate) enum NextTask {
    /// Shutdown requested; leave the loop without running anything else
    Quit,
    /// Run this task now
    Run(Box<dyn QueuedTask>),
    /// Nothing runnable; sleep at most this long (or until woken)
    Idle(TimeDelta),
}

pub(crate) struct PendingTasks {
    state: QueueState,
    posting_order: OrderId,
    queue: VecDeque<(OrderId, Box<dyn QueuedTask>)>,
    delayed: BTreeMap<DelayedEntryTimeout, Box<dyn QueuedTask>>,
}

impl PendingTasks {
    pub fn new() -> Self {
        Self {
            state: QueueState::Running,
            posting_order: 0,
            queue: VecDeque::new(),
            delayed: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    pub fn delayed_len(&self) -> usize {
        self.delayed.len()
    }

    fn next_order(&mut self) -> OrderId {
        self.posting_order += 1;
        self.posting_order
    }

    /// Append an immediate task. A rejected task is handed back so the
    /// caller can drop it after releasing the lock.
    pub fn push(&mut self, task: Box<dyn QueuedTask>) -> std::result::Result<OrderId, Box<dyn QueuedTask>> {
        if !self.state.accepts_tasks() {
            return Err(task);
        }
        let order = self.next_order();
        self.queue.push_back((order, task));
        Ok(order)
    }

    /// Store a task to fire at an absolute clock time
    pub fn push_delayed(
        &mut self,
        task: Box<dyn QueuedTask>,
        next_fire_at_us: i64,
    ) -> std::result::Result<OrderId, Box<dyn QueuedTask>> {
        if !self.state.accepts_tasks() {
            return Err(task);
        }
        let order = self.next_order();
        self.delayed.insert(
            DelayedEntryTimeout {
                next_fire_at_us,
                order,
            },
            task,
        );
        Ok(order)
    }

    /// Running -> Draining
    pub fn request_quit(&mut self) -> Result<()> {
        self.state.transition_to(QueueState::Draining)
    }

    /// Draining -> Stopped
    pub fn mark_stopped(&mut self) -> Result<()> {
        self.state.transition_to(QueueState::Stopped)
    }

    /// Remove every stored task without running it
    pub fn take_all(&mut self) -> Vec<Box<dyn QueuedTask>> {
        let mut tasks: Vec<Box<dyn QueuedTask>> = self.queue.drain(..).map(|(_, task)| task).collect();
        tasks.extend(std::mem::take(&mut self.delayed).into_values());
        tasks
    }

    /// Pick the single next task to run at `now_us`.
    ///
    /// A due timer competes with the head of the FIFO by submission order,
    /// so neither side can starve the other. A timer that is not yet due
    /// bounds the idle sleep, rounded up to whole milliseconds.
    pub fn next_task(&mut self, now_us: i64) -> NextTask {
        if !self.state.accepts_tasks() {
            return NextTask::Quit;
        }

        let mut sleep_time = TimeDelta::PLUS_INFINITY;

        if let Some(delayed_entry) = self.delayed.first_entry() {
            let timeout = *delayed_entry.key();
            if now_us >= timeout.next_fire_at_us {
                if let Some((front_order, _)) = self.queue.front() {
                    if *front_order < timeout.order {
                        if let Some((_, task)) = self.queue.pop_front() {
                            return NextTask::Run(task);
                        }
                    }
                }
                return NextTask::Run(delayed_entry.remove());
            }

            let remaining = TimeDelta::micros(timeout.next_fire_at_us - now_us);
            sleep_time = TimeDelta::millis(remaining.ms_round_up());
        }

        match self.queue.pop_front() {
            Some((_, task)) => NextTask::Run(task),
            None => NextTask::Idle(sleep_time),
        }
    }
}

impl Default for PendingTasks {
    fn default() -> Self {
        Self::new()
    }
}
