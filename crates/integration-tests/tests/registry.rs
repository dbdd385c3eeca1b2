//! Registry Tests
//!
//! Creation is idempotent per name, lookups fail cleanly, and teardown
//! tolerates tasks that use the registry.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use taskqueue_core::port::clock::mocks::ManualClock;
use taskqueue_core::{Executor, QueueError, QueueHandle, QueueState, TaskQueueManager, TimeDelta};

fn worker_thread(queue: &QueueHandle) -> ThreadId {
    let id = Arc::new(Mutex::new(None));
    {
        let id = Arc::clone(&id);
        queue.sync(Box::new(move || *id.lock() = Some(thread::current().id())));
    }
    let observed = *id.lock();
    observed.expect("sync task ran")
}

#[test]
fn test_recreating_a_name_keeps_the_running_worker() {
    let manager = TaskQueueManager::new();
    assert_eq!(manager.create(["render"]).unwrap(), 1);

    let before = manager.queue("render").unwrap();
    let before_thread = worker_thread(&before);

    assert_eq!(manager.create(["render"]).unwrap(), 0);
    let after = manager.queue("render").unwrap();

    assert!(before.same_queue(&after));
    assert_eq!(worker_thread(&after), before_thread);
    assert_eq!(before.state(), QueueState::Running);
}

#[test]
fn test_unknown_name_is_an_error_not_a_panic() {
    let manager = TaskQueueManager::new();
    manager.create(["known"]).unwrap();

    assert!(manager.has_queue("known"));
    assert!(!manager.has_queue("unknown"));
    match manager.queue("unknown") {
        Err(QueueError::NotFound(name)) => assert_eq!(name, "unknown"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_concurrent_create_of_same_name_creates_once() {
    let manager = Arc::new(TaskQueueManager::new());
    let created = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let created = Arc::clone(&created);
            thread::spawn(move || {
                let count = manager.create(["shared", "also-shared"]).unwrap();
                created.fetch_add(count, Ordering::SeqCst);
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(created.load(Ordering::SeqCst), 2);
    assert_eq!(manager.names(), vec!["also-shared".to_string(), "shared".to_string()]);
}

#[test]
fn test_tasks_see_only_their_own_queue_as_current() {
    let manager = TaskQueueManager::new();
    manager.create(["left", "right"]).unwrap();
    let left = manager.queue("left").unwrap();
    let right = manager.queue("right").unwrap();

    let seen = Arc::new(Mutex::new((false, false)));
    {
        let seen = Arc::clone(&seen);
        let (own, other) = (right.clone(), left.clone());
        right.sync(Box::new(move || *seen.lock() = (own.is_current(), other.is_current())));
    }

    assert_eq!(*seen.lock(), (true, false));
}

#[test]
fn test_clear_while_tasks_look_up_queues() {
    let manager = Arc::new(TaskQueueManager::new());
    manager.create(["a", "b"]).unwrap();
    let a = manager.queue("a").unwrap();

    let lookups = Arc::new(AtomicUsize::new(0));
    for _ in 0..50 {
        let manager = Arc::clone(&manager);
        let lookups = Arc::clone(&lookups);
        a.dispatch(Box::new(move || {
            if manager.queue("b").is_ok() {
                lookups.fetch_add(1, Ordering::SeqCst);
            }
        }));
    }

    manager.clear();
    assert!(manager.is_empty());
    assert_eq!(a.state(), QueueState::Stopped);
    assert!(lookups.load(Ordering::SeqCst) <= 50);
}

#[test]
fn test_registry_queues_share_injected_clock() {
    let clock = Arc::new(ManualClock::new(0));
    let manager = TaskQueueManager::with_clock(clock.clone());
    manager.create(["timed"]).unwrap();
    let queue = manager.queue("timed").unwrap();

    let fired = Arc::new(AtomicUsize::new(0));
    {
        let fired = Arc::clone(&fired);
        taskqueue_core::TaskQueueExt::post_delayed(
            &queue,
            move || {
                fired.fetch_add(1, Ordering::SeqCst);
            },
            TimeDelta::millis(20),
        );
    }

    queue.sync(Box::new(|| {}));
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    clock.advance(TimeDelta::millis(20));
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while fired.load(Ordering::SeqCst) == 0 && std::time::Instant::now() < deadline {
        thread::sleep(std::time::Duration::from_millis(1));
    }
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}
