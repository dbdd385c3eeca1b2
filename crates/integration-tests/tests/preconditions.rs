//! Precondition Tests
//!
//! Blocking on or tearing down a dispatch target from its own thread aborts
//! the process, even when the call is made from inside a task. Each case
//! re-runs this test binary filtered to itself, with `FATAL_CASE_ENV` set,
//! and checks how the child exited.

use std::process::{self, Command, ExitStatus};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use taskqueue_core::{Executor, PoolExecutor, Signal, TaskQueue, TaskQueueExt, TimeDelta};

const FATAL_CASE_ENV: &str = "TASKQUEUE_FATAL_CASE";

/// Long enough for an abort to land; the child exits cleanly if it doesn't
const GRACE: Duration = Duration::from_secs(5);

#[cfg(unix)]
fn aborted(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    const SIGABRT: i32 = 6;
    status.signal() == Some(SIGABRT)
}

#[cfg(not(unix))]
fn aborted(status: &ExitStatus) -> bool {
    // 101 is a failed (panicking) test, 0 a case that was not enforced
    !status.success() && status.code() != Some(101)
}

/// In the child run `case`; in the parent assert the child aborted.
fn assert_aborts(name: &str, case: fn()) {
    if std::env::var(FATAL_CASE_ENV).as_deref() == Ok(name) {
        case();
        thread::sleep(GRACE);
        process::exit(0);
    }

    let exe = std::env::current_exe().expect("test binary path");
    let output = Command::new(exe)
        .args([name, "--exact", "--nocapture", "--test-threads=1"])
        .env(FATAL_CASE_ENV, name)
        .output()
        .expect("spawn child test process");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        aborted(&output.status),
        "expected '{}' to abort, got {:?}\nstderr:\n{}",
        name,
        output.status,
        stderr
    );
    assert!(stderr.contains("fatal:"), "missing fatal report:\n{}", stderr);
}

#[test]
fn test_queue_dropped_on_own_worker_aborts() {
    assert_aborts("test_queue_dropped_on_own_worker_aborts", || {
        let queue = TaskQueue::new("pre-self-delete").unwrap();
        let handle = queue.handle();
        handle.post(move || drop(queue));
    });
}

#[test]
fn test_queue_sync_from_own_worker_aborts() {
    assert_aborts("test_queue_sync_from_own_worker_aborts", || {
        let queue = TaskQueue::new("pre-self-sync").unwrap();
        let handle = queue.handle();
        queue.dispatch(Box::new(move || handle.sync(Box::new(|| {}))));
        thread::sleep(GRACE);
        drop(queue);
    });
}

#[test]
fn test_pool_sync_from_own_worker_aborts() {
    assert_aborts("test_pool_sync_from_own_worker_aborts", || {
        let pool = Arc::new(PoolExecutor::new("pre-pool-sync").unwrap());
        let inner = Arc::clone(&pool);
        pool.dispatch(Box::new(move || inner.sync(Box::new(|| {}))));
        thread::sleep(GRACE);
    });
}

#[test]
fn test_pool_dropped_on_own_worker_aborts() {
    assert_aborts("test_pool_dropped_on_own_worker_aborts", || {
        let pool = Arc::new(PoolExecutor::new("pre-pool-drop").unwrap());
        let release = Arc::new(Signal::new());
        {
            let inner = Arc::clone(&pool);
            let release = Arc::clone(&release);
            pool.dispatch(Box::new(move || {
                release.wait(TimeDelta::PLUS_INFINITY);
                // Last reference: the pool's destructor runs on its own worker
                drop(inner);
            }));
        }
        drop(pool);
        release.set();
        thread::sleep(GRACE);
    });
}

#[test]
fn test_owner_teardown_from_another_thread_is_not_fatal() {
    let queue = TaskQueue::new("pre-foreign-delete").unwrap();
    let handle = queue.handle();
    thread::spawn(move || drop(queue)).join().unwrap();
    assert_eq!(handle.state(), taskqueue_core::QueueState::Stopped);

    let pool = PoolExecutor::new("pre-foreign-pool").unwrap();
    pool.sync(Box::new(|| {}));
    thread::spawn(move || drop(pool)).join().unwrap();
}
