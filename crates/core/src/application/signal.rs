// Signal - reusable cross-thread wake event (auto-reset)

use crate::application::yield_policy::ScopedYieldPolicy;
use crate::domain::TimeDelta;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Binary event: `set` from any thread, `wait` from one.
///
/// A successful `wait` consumes the signal. Setting an already-set signal is
/// a no-op, so a wake that arrives while the waiter is busy is remembered
/// exactly once.
#[derive(Debug, Default)]
pub struct Signal {
    signaled: Mutex<bool>,
    cond: Condvar,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        let mut signaled = self.signaled.lock();
        *signaled = true;
        self.cond.notify_all();
    }

    pub fn reset(&self) {
        *self.signaled.lock() = false;
    }

    /// Block until set or until `give_up_after` elapses.
    ///
    /// Returns true if the signal fired (and resets it). `PLUS_INFINITY`
    /// waits without bound.
    pub fn wait(&self, give_up_after: TimeDelta) -> bool {
        ScopedYieldPolicy::yield_execution();

        let deadline = give_up_after
            .to_std()
            .and_then(|timeout| Instant::now().checked_add(timeout));

        let mut signaled = self.signaled.lock();
        while !*signaled {
            match deadline {
                None => self.cond.wait(&mut signaled),
                Some(deadline) => {
                    if self.cond.wait_until(&mut signaled, deadline).timed_out() {
                        break;
                    }
                }
            }
        }

        let fired = *signaled;
        *signaled = false;
        fired
    }

    /// Like `wait`, but logs a probable-deadlock warning once if the signal
    /// has not fired after `warn_after`.
    pub fn wait_with_warning(&self, give_up_after: TimeDelta, warn_after: TimeDelta) -> bool {
        if warn_after >= give_up_after {
            return self.wait(give_up_after);
        }

        if self.wait(warn_after) {
            return true;
        }

        let thread = std::thread::current();
        warn!(
            waited = %warn_after,
            thread = ?thread.name(),
            "Probable deadlock: still waiting for signal"
        );

        self.wait(give_up_after.saturating_sub(warn_after))
    }
}

/// Sets the wrapped signal when dropped.
///
/// Moved into a task so a waiter is released whether the task ran, panicked,
/// or was dropped unrun.
pub(crate) struct SignalOnDrop(Arc<Signal>);

impl SignalOnDrop {
    pub(crate) fn new(signal: Arc<Signal>) -> Self {
        Self(signal)
    }
}

impl Drop for SignalOnDrop {
    fn drop(&mut self) {
        self.0.set();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_wait_times_out_when_not_set() {
        let signal = Signal::new();
        let start = Instant::now();
        assert!(!signal.wait(TimeDelta::millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_set_before_wait_is_remembered_and_auto_resets() {
        let signal = Signal::new();
        signal.set();
        signal.set();
        assert!(signal.wait(TimeDelta::ZERO));
        assert!(!signal.wait(TimeDelta::ZERO));
    }

    #[test]
    fn test_reset_clears_pending_signal() {
        let signal = Signal::new();
        signal.set();
        signal.reset();
        assert!(!signal.wait(TimeDelta::millis(1)));
    }

    #[test]
    fn test_set_from_other_thread_wakes_unbounded_wait() {
        let signal = Arc::new(Signal::new());
        let setter = Arc::clone(&signal);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            setter.set();
        });

        assert!(signal.wait(TimeDelta::PLUS_INFINITY));
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_with_warning_still_succeeds_after_warn_threshold() {
        let signal = Arc::new(Signal::new());
        let setter = Arc::clone(&signal);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            setter.set();
        });

        assert!(signal.wait_with_warning(TimeDelta::seconds(5), TimeDelta::millis(5)));
        handle.join().unwrap();
    }

    #[test]
    fn test_signal_on_drop_sets() {
        let signal = Arc::new(Signal::new());
        drop(SignalOnDrop::new(Arc::clone(&signal)));
        assert!(signal.wait(TimeDelta::ZERO));
    }

    #[test]
    fn test_wait_with_warning_gives_up() {
        let signal = Signal::new();
        assert!(!signal.wait_with_warning(TimeDelta::millis(15), TimeDelta::millis(5)));
    }
}
