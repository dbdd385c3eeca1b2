//! Pool Executor - dispatch target backed by a single-worker tokio runtime
//!
//! The weaker peer of a named queue: no delayed tasks and no ordering
//! guarantee beyond what the runtime provides. Use a `TaskQueue` when
//! timers or strict FIFO are needed.

use crate::application::signal::{Signal, SignalOnDrop};
use crate::application::worker::constants::{DEADLOCK_WARN_AFTER, SYNC_GIVE_UP_AFTER};
use crate::application::worker::precondition_violated;
use crate::error::{QueueError, Result};
use crate::port::{Closure, Executor};
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use tokio::runtime::{Builder, Handle};
use tokio::sync::watch;
use tracing::{debug, error, info};

/// One OS thread driving a current-thread tokio runtime.
///
/// Every spawned task is polled on that thread, which is what makes
/// `is_current` exact. Dropping the executor stops the runtime and joins the
/// thread; tasks not yet started are dropped.
pub struct PoolExecutor {
    name: String,
    handle: Handle,
    worker_id: ThreadId,
    stop_tx: watch::Sender<bool>,
    worker: Option<JoinHandle<()>>,
}

impl PoolExecutor {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let runtime = Builder::new_current_thread()
            .build()
            .map_err(QueueError::Runtime)?;
        let handle = runtime.handle().clone();
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let worker = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                runtime.block_on(async move {
                    while !*stop_rx.borrow_and_update() {
                        if stop_rx.changed().await.is_err() {
                            break;
                        }
                    }
                });
            })
            .map_err(|source| QueueError::Spawn {
                name: name.clone(),
                source,
            })?;

        let worker_id = worker.thread().id();
        info!(executor = %name, "Pool executor started");

        Ok(Self {
            name,
            handle,
            worker_id,
            stop_tx,
            worker: Some(worker),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Executor for PoolExecutor {
    fn is_current(&self) -> bool {
        thread::current().id() == self.worker_id
    }

    /// Aborts the process if called from the pool's own worker thread.
    fn sync(&self, task: Closure) {
        if self.is_current() {
            precondition_violated(
                &self.name,
                format_args!("blocking sync from the pool's own worker"),
            );
        }

        let done = Arc::new(Signal::new());
        let completion = SignalOnDrop::new(Arc::clone(&done));
        drop(self.handle.spawn(async move {
            let _completion = completion;
            task();
        }));

        done.wait_with_warning(SYNC_GIVE_UP_AFTER, DEADLOCK_WARN_AFTER);
    }

    fn dispatch(&self, task: Closure) {
        // Detached: the JoinHandle is dropped immediately.
        drop(self.handle.spawn(async move { task() }));
    }
}

impl Drop for PoolExecutor {
    fn drop(&mut self) {
        if self.is_current() {
            precondition_violated(
                &self.name,
                format_args!("pool executor dropped on its own worker thread"),
            );
        }

        if self.stop_tx.send(true).is_err() {
            debug!(executor = %self.name, "Pool executor already stopped");
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(executor = %self.name, "Pool executor worker exited abnormally");
            }
        }
        info!(executor = %self.name, "Pool executor stopped");
    }
}

impl fmt::Debug for PoolExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolExecutor").field("name", &self.name).finish()
    }
}
