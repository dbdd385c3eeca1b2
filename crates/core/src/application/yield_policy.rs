// Yield Policy - per-thread hook invoked before a thread blocks

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

/// Called by `Signal::wait` just before the calling thread blocks.
///
/// Lets a test harness or a cooperative scheduler run other work instead of
/// parking the thread.
pub trait YieldInterface {
    fn yield_execution(&self);
}

thread_local! {
    static CURRENT_YIELD_POLICY: RefCell<Option<Rc<dyn YieldInterface>>> =
        const { RefCell::new(None) };
}

/// Installs a yield policy for the current thread until dropped.
///
/// Scopes nest: dropping restores whatever policy was active before.
pub struct ScopedYieldPolicy {
    previous: Option<Rc<dyn YieldInterface>>,
    // Must be dropped on the thread that created it.
    _not_send: PhantomData<*const ()>,
}

impl ScopedYieldPolicy {
    pub fn new(policy: Rc<dyn YieldInterface>) -> Self {
        let previous = CURRENT_YIELD_POLICY.with(|current| current.replace(Some(policy)));
        Self {
            previous,
            _not_send: PhantomData,
        }
    }

    /// Invoke the current thread's policy, if any
    pub fn yield_execution() {
        let policy = CURRENT_YIELD_POLICY.with(|current| current.borrow().clone());
        if let Some(policy) = policy {
            policy.yield_execution();
        }
    }
}

impl Drop for ScopedYieldPolicy {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT_YIELD_POLICY.with(|current| {
            *current.borrow_mut() = previous;
        });
    }
}
