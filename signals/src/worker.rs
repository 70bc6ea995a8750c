use std::sync::{Arc, RwLock};

/// A deferred unit of work handed to a [`Worker`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Minimal executor interface consumed by asynchronous dispatch.
///
/// The core never implements a thread pool or event loop itself; it only
/// requires "schedule this task, do not block the caller". Anything that can
/// do that can drive [`Signal::async_emit`].
///
/// [`Signal::async_emit`]: crate::Signal::async_emit
pub trait Worker: Send + Sync + 'static {
    /// Schedules `task` for later execution. Must not block the caller.
    fn post(&self, task: Task);
}

static DEFAULT_WORKER: RwLock<Option<Arc<dyn Worker>>> = RwLock::new(None);

/// Registers the process-wide fallback worker used by slots that have no
/// worker of their own. Ownership of init/teardown belongs to the surrounding
/// application; tests inject explicit workers instead of relying on this.
pub fn set_default_worker(worker: Arc<dyn Worker>) {
    *DEFAULT_WORKER.write().unwrap() = Some(worker);
}

/// Removes the process-wide fallback worker.
pub fn clear_default_worker() {
    *DEFAULT_WORKER.write().unwrap() = None;
}

/// Returns the process-wide fallback worker, if one is registered.
pub fn default_worker() -> Option<Arc<dyn Worker>> {
    DEFAULT_WORKER.read().unwrap().clone()
}

/// A tokio runtime handle is a worker: tasks run on the runtime's executor.
#[cfg(feature = "tokio")]
impl Worker for tokio::runtime::Handle {
    fn post(&self, task: Task) {
        let _ = self.spawn(async move { task() });
    }
}
