// Current Task Queue - which queue (if any) the calling thread is serving

use crate::port::TaskQueueBase;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

thread_local! {
    static CURRENT_QUEUE: RefCell<Option<Arc<dyn TaskQueueBase>>> = const { RefCell::new(None) };
}

/// The queue whose worker is running on this thread, if any
pub fn current() -> Option<Arc<dyn TaskQueueBase>> {
    CURRENT_QUEUE.with(|current| current.borrow().clone())
}

/// Whether `queue` is the calling thread's current queue (identity, not name)
pub fn is_current_queue<T: ?Sized>(queue: &T) -> bool {
    CURRENT_QUEUE.with(|current| {
        current
            .borrow()
            .as_ref()
            .is_some_and(|active| std::ptr::addr_eq(Arc::as_ptr(active), queue as *const T))
    })
}

/// Associates the calling thread with a queue until dropped.
///
/// Setters nest; dropping one restores the association that was active when
/// it was created. A pool thread can use this to impersonate a queue for the
/// duration of one task.
pub struct CurrentTaskQueueSetter {
    previous: Option<Arc<dyn TaskQueueBase>>,
    _not_send: PhantomData<*const ()>,
}

impl CurrentTaskQueueSetter {
    pub fn new(queue: Option<Arc<dyn TaskQueueBase>>) -> Self {
        let previous = CURRENT_QUEUE.with(|current| current.replace(queue));
        Self {
            previous,
            _not_send: PhantomData,
        }
    }
}

impl Drop for CurrentTaskQueueSetter {
    fn drop(&mut self) {
        let previous = self.previous.take();
        // Release our association before the previous one is restored, outside
        // the borrow, since dropping the last Arc may run arbitrary code.
        let replaced = CURRENT_QUEUE.with(|current| current.replace(previous));
        drop(replaced);
    }
}
