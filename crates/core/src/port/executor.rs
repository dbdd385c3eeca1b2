// Executor Port - the dispatch target capability consumed by notifiers

/// Boxed closure accepted by dispatch targets
pub type Closure = Box<dyn FnOnce() + Send + 'static>;

/// Anything a notification layer can hand work to.
///
/// Implementations:
/// - `TaskQueue` / `QueueHandle`: named queue, strict FIFO with timers
/// - `PoolExecutor`: single-worker runtime, no delays, no ordering promise
pub trait Executor: Send + Sync {
    /// True iff called from the target's own worker thread
    fn is_current(&self) -> bool;

    /// Run `task` on the target and block until it has finished.
    ///
    /// Must not be called from the target's own worker; that would deadlock
    /// and panics instead.
    fn sync(&self, task: Closure);

    /// Run `task` on the target without waiting
    fn dispatch(&self, task: Closure);
}
