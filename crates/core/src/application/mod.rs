// Application Layer - Workers, handles and dispatch targets

pub mod current;
pub mod manager;
pub mod pool;
pub mod signal;
pub mod task_queue;
pub mod worker;
pub mod yield_policy;

// Re-exports
pub use current::{current, CurrentTaskQueueSetter};
pub use manager::TaskQueueManager;
pub use pool::PoolExecutor;
pub use signal::Signal;
pub use task_queue::{QueueHandle, TaskQueue};
pub use worker::ThreadTaskQueue;
pub use yield_policy::{ScopedYieldPolicy, YieldInterface};
