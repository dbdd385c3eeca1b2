// Driver scenarios

use anyhow::{ensure, Context, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use taskqueue_core::{Executor, PoolExecutor, QueueHandle, TaskQueueExt, TaskQueueManager, TimeDelta};
use tracing::info;

const PROBE_QUEUE: &str = "probe";
const SCENARIO_TIMEOUT: TimeDelta = TimeDelta::seconds(5);

/// Post `iterations` no-op tasks through the executor capability
pub fn bench(manager: &TaskQueueManager, queue: &str, iterations: u64) -> Result<()> {
    let handle = manager
        .queue(queue)
        .with_context(|| format!("Unknown queue '{}'", queue))?;

    info!(queue = %queue, iterations = iterations, "Starting bench");

    let start = Instant::now();
    for _ in 0..iterations {
        handle.dispatch(Box::new(|| {}));
    }
    let posted = start.elapsed();

    // FIFO: once this returns, everything before it has run
    handle.sync(Box::new(|| {}));
    let drained = start.elapsed();

    println!(
        "posted {} tasks in {:.3}ms, drained in {:.3}ms",
        iterations,
        posted.as_secs_f64() * 1_000.0,
        drained.as_secs_f64() * 1_000.0
    );
    Ok(())
}

/// Ordering, tie-break and identity checks on the queue named `target`
pub fn ordering(manager: &TaskQueueManager, target: &str) -> Result<()> {
    ensure!(
        target != PROBE_QUEUE,
        "Queue name '{}' is reserved for the identity check",
        PROBE_QUEUE
    );
    let queue = manager
        .queue(target)
        .with_context(|| format!("Unknown queue '{}'", target))?;
    manager.create([PROBE_QUEUE])?;
    let probe = manager.queue(PROBE_QUEUE)?;

    // Immediate, delayed, immediate
    let order = record(&queue, |queue, log| {
        queue.post(push(log, "A"));
        queue.post_delayed(push(log, "B"), TimeDelta::millis(50));
        queue.post(push(log, "C"));
    })?;
    println!("A, B(+50ms), C  -> {}", order.join(", "));
    ensure!(order == ["A", "C", "B"], "unexpected order {:?}", order);

    // Two timers for the same instant
    let order = record(&queue, |queue, log| {
        queue.post_delayed(push(log, "D"), TimeDelta::millis(10));
        queue.post_delayed(push(log, "E"), TimeDelta::millis(10));
    })?;
    println!("D(+10ms), E(+10ms) -> {}", order.join(", "));
    ensure!(order == ["D", "E"], "unexpected order {:?}", order);

    // Identity seen from inside a task
    let seen = Arc::new(Mutex::new((false, false)));
    {
        let seen = Arc::clone(&seen);
        let own = queue.clone();
        let other = probe.clone();
        queue.sync(Box::new(move || {
            *seen.lock() = (own.is_current(), other.is_current());
        }));
    }
    let (on_own, on_other) = *seen.lock();
    println!("inside '{}': is_current={} / '{}' is_current={}", target, on_own, PROBE_QUEUE, on_other);
    ensure!(on_own && !on_other, "identity check failed");

    // Re-creating an existing name keeps the existing queue
    let created = manager.create([target])?;
    ensure!(created == 0, "existing queue was replaced");
    ensure!(manager.queue(target)?.same_queue(&queue), "existing queue was replaced");
    println!("create([\"{}\"]) again -> kept existing queue", target);

    Ok(())
}

/// Dispatch to the pool executor, then block on a final sync task
pub fn pool(tasks: usize) -> Result<()> {
    let pool = PoolExecutor::new("pool")?;
    let count = Arc::new(AtomicUsize::new(0));

    for _ in 0..tasks {
        let count = Arc::clone(&count);
        pool.dispatch(Box::new(move || {
            count.fetch_add(1, Ordering::Relaxed);
        }));
    }

    let observed = Arc::new(AtomicUsize::new(0));
    {
        let count = Arc::clone(&count);
        let observed = Arc::clone(&observed);
        pool.sync(Box::new(move || {
            observed.store(count.load(Ordering::Relaxed), Ordering::Relaxed);
        }));
    }

    println!(
        "pool '{}': {} of {} dispatched tasks had run when sync completed; caller is_current={}",
        pool.name(),
        observed.load(Ordering::Relaxed),
        tasks,
        pool.is_current()
    );
    Ok(())
}

type Log = Arc<Mutex<Vec<&'static str>>>;

fn push(log: &Log, label: &'static str) -> impl FnOnce() + Send + 'static {
    let log = Arc::clone(log);
    move || log.lock().push(label)
}

/// Let `post` schedule work, then wait until the queue has nothing left
/// that could still fire within the scenario timeout
fn record<F>(queue: &QueueHandle, post: F) -> Result<Vec<&'static str>>
where
    F: FnOnce(&QueueHandle, &Log),
{
    let log: Log = Arc::default();
    post(queue, &log);

    let done = Arc::new(taskqueue_core::Signal::new());
    let signal = Arc::clone(&done);
    // Fires after every timer used by the scenarios
    queue.post_delayed(move || signal.set(), TimeDelta::millis(100));
    ensure!(done.wait(SCENARIO_TIMEOUT), "scenario timed out");

    let entries = log.lock().clone();
    Ok(entries)
}
