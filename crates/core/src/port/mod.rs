// Port Layer - Interfaces between the queue core and its collaborators

pub mod clock; // For deterministic testing
pub mod executor;
pub mod task_queue;

// Re-exports
pub use clock::{Clock, MonotonicClock};
pub use executor::{Closure, Executor};
pub use task_queue::{TaskQueueBase, TaskQueueExt};
