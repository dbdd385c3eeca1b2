// Domain Layer - Pure value types for tasks, time and queue lifecycle

pub mod queue;
pub mod task;
pub mod time_delta;

// Re-exports
pub use queue::{validate_queue_name, QueueState, MAX_QUEUE_NAME_LEN};
pub use task::{to_queued_task, ClosureTask, QueuedTask, TaskStatus};
pub use time_delta::{divide_round_to_nearest, divide_round_up, TimeDelta};
