//! Task Queue Manager - name-keyed registry over owned queues
//!
//! Constructed once by the composition root and passed to whoever needs to
//! look queues up by name. There is no process-wide instance.

use crate::application::task_queue::{QueueHandle, TaskQueue};
use crate::domain::validate_queue_name;
use crate::error::{QueueError, Result};
use crate::port::{Clock, MonotonicClock};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Registry that creates, owns and looks up named queues.
///
/// The map has its own lock, independent of every queue's internal lock.
/// Queues are torn down outside that lock, so a task that looks up a queue
/// while the registry is being cleared cannot deadlock the teardown.
pub struct TaskQueueManager {
    clock: Arc<dyn Clock>,
    queues: Mutex<HashMap<String, TaskQueue>>,
}

impl TaskQueueManager {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(MonotonicClock))
    }

    /// Registry whose queues all share an injected clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            queues: Mutex::new(HashMap::new()),
        }
    }

    /// Create a queue for every name not yet registered.
    ///
    /// Names already present keep their existing queue; this is an
    /// idempotent no-op, not an error. Returns how many queues were created.
    /// All names are validated before any queue is created, and a spawn
    /// failure registers none of the names in the call.
    ///
    /// Workers are started outside the registry lock, so lookups are not
    /// held up by thread startup.
    pub fn create<I, S>(&self, names: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        for name in &names {
            validate_queue_name(name)?;
        }

        let missing: Vec<String> = {
            let queues = self.queues.lock();
            let mut missing: Vec<String> = Vec::new();
            for name in names {
                if queues.contains_key(&name) || missing.contains(&name) {
                    debug!(queue = %name, "Task queue already registered, keeping existing queue");
                    continue;
                }
                missing.push(name);
            }
            missing
        };
        if missing.is_empty() {
            return Ok(0);
        }

        // Built queues are dropped (and torn down) if a later spawn fails
        let mut built = Vec::with_capacity(missing.len());
        for name in missing {
            let queue = TaskQueue::with_clock(name.clone(), Arc::clone(&self.clock))?;
            built.push((name, queue));
        }

        let mut raced = Vec::new();
        let (created, total) = {
            let mut queues = self.queues.lock();
            let mut created = 0;
            for (name, queue) in built {
                if queues.contains_key(&name) {
                    debug!(queue = %name, "Task queue registered concurrently, keeping existing queue");
                    raced.push(queue);
                    continue;
                }
                queues.insert(name, queue);
                created += 1;
            }
            (created, queues.len())
        };
        // Losers of a concurrent create are torn down outside the lock
        drop(raced);

        if created > 0 {
            info!(created = created, total = total, "Task queues registered");
        }
        Ok(created)
    }

    /// Posting handle for `name`
    pub fn queue(&self, name: &str) -> Result<QueueHandle> {
        self.queues
            .lock()
            .get(name)
            .map(TaskQueue::handle)
            .ok_or_else(|| QueueError::NotFound(name.to_string()))
    }

    pub fn has_queue(&self, name: &str) -> bool {
        self.queues.lock().contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.queues.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.queues.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.lock().is_empty()
    }

    /// Shut down and forget every queue
    pub fn clear(&self) {
        let queues = std::mem::take(&mut *self.queues.lock());
        if queues.is_empty() {
            return;
        }

        info!(count = queues.len(), "Shutting down task queues");
        drop(queues);
    }
}

impl Default for TaskQueueManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskQueueManager {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_lookup() {
        let manager = TaskQueueManager::new();
        assert!(manager.is_empty());

        let created = manager.create(["audio", "video"]).unwrap();
        assert_eq!(created, 2);
        assert!(manager.has_queue("audio"));
        assert_eq!(manager.queue("video").unwrap().name(), "video");
        assert_eq!(manager.names(), vec!["audio".to_string(), "video".to_string()]);
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let manager = TaskQueueManager::new();
        assert!(!manager.has_queue("missing"));
        match manager.queue("missing") {
            Err(QueueError::NotFound(name)) => assert_eq!(name, "missing"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_create_is_idempotent_per_name() {
        let manager = TaskQueueManager::new();
        manager.create(["w"]).unwrap();
        let first = manager.queue("w").unwrap();

        assert_eq!(manager.create(["w", "x"]).unwrap(), 1);
        let second = manager.queue("w").unwrap();

        assert!(first.same_queue(&second));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_duplicate_names_in_one_call_create_one_queue() {
        let manager = TaskQueueManager::new();
        assert_eq!(manager.create(["dup", "dup", "other"]).unwrap(), 2);
        assert_eq!(manager.names(), vec!["dup".to_string(), "other".to_string()]);
    }

    #[test]
    fn test_lookup_during_create_does_not_wait_for_startup() {
        let manager = Arc::new(TaskQueueManager::new());
        manager.create(["existing"]).unwrap();

        let creator = {
            let manager = Arc::clone(&manager);
            std::thread::spawn(move || {
                let names: Vec<String> = (0..16).map(|i| format!("batch-{}", i)).collect();
                manager.create(&names).unwrap()
            })
        };

        // Interleaves with the batch instead of deadlocking or failing
        while !creator.is_finished() {
            assert!(manager.queue("existing").is_ok());
        }
        assert_eq!(creator.join().unwrap(), 16);
        assert_eq!(manager.len(), 17);
    }

    #[test]
    fn test_invalid_name_creates_nothing() {
        let manager = TaskQueueManager::new();
        let result = manager.create(["good", "not good"]);
        assert!(matches!(result, Err(QueueError::InvalidName(_))));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_clear_stops_every_queue() {
        let manager = TaskQueueManager::new();
        manager.create(["one", "two"]).unwrap();
        let handle = manager.queue("one").unwrap();

        manager.clear();
        assert!(manager.is_empty());
        assert_eq!(handle.state(), crate::domain::QueueState::Stopped);
    }
}
