// Panic isolation for queue workers, and the fatal path that bypasses it
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, UnwindSafe};
use std::process;
use tracing::error;

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed
    Success(T),
    /// Execution panicked; carries the panic message
    Panicked(String),
}

/// Execute a closure, catching any panic so the worker thread survives.
///
/// A panicking task is a bug in the task, not in the queue: it is logged at
/// error level and the queue moves on to the next task.
pub fn execute_guarded<F, T>(queue: &str, f: F) -> PanicGuardResult<T>
where
    F: FnOnce() -> T + UnwindSafe,
{
    match catch_unwind(f) {
        Ok(result) => PanicGuardResult::Success(result),
        Err(payload) => {
            let panic_msg = panic_message(payload.as_ref());
            error!(queue = %queue, panic_msg = %panic_msg, "Queued task panicked");
            PanicGuardResult::Panicked(panic_msg)
        }
    }
}

/// Report a broken caller precondition and abort the process.
///
/// Not a panic: `execute_guarded` must not be able to intercept it.
pub fn precondition_violated(target: &str, message: fmt::Arguments<'_>) -> ! {
    error!(name = %target, "Precondition violated: {}", message);
    eprintln!("fatal: '{}': {}", target, message);
    process::abort()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_passes_value_through() {
        match execute_guarded("q", || 7) {
            PanicGuardResult::Success(v) => assert_eq!(v, 7),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_panic_message_is_captured() {
        let result: PanicGuardResult<()> = execute_guarded("q", || panic!("boom"));
        match result {
            PanicGuardResult::Panicked(msg) => assert_eq!(msg, "boom"),
            other => panic!("unexpected: {:?}", other),
        }

        let result: PanicGuardResult<()> = execute_guarded("q", || panic!("code {}", 42));
        match result {
            PanicGuardResult::Panicked(msg) => assert_eq!(msg, "code 42"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
