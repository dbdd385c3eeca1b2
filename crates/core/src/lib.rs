// TaskQueue Core - named single-worker task queues and dispatch targets
// No runtime assumptions beyond OS threads; tokio backs only the pool adapter.

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{
    current, CurrentTaskQueueSetter, PoolExecutor, QueueHandle, Signal, TaskQueue,
    TaskQueueManager,
};
pub use domain::{QueueState, QueuedTask, TaskStatus, TimeDelta};
pub use error::{QueueError, Result};
pub use port::{Clock, Closure, Executor, MonotonicClock, TaskQueueBase, TaskQueueExt};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
