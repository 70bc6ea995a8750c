use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// Shared state of one signal-slot link. Owned strongly by the signal's
/// connection list (and by live blockers); everything else holds weak
/// references, so dropping the signal drops the state.
pub(crate) struct ConnState {
    /// Liveness of the target slot's run core.
    target: Weak<dyn Any + Send + Sync>,
    /// Number of live blockers. The connection is skipped while non-zero.
    blocked: AtomicUsize,
    disconnected: AtomicBool,
}

impl ConnState {
    pub(crate) fn new(target: Weak<dyn Any + Send + Sync>) -> Self {
        Self { target, blocked: AtomicUsize::new(0), disconnected: AtomicBool::new(false) }
    }

    pub(crate) fn alive(&self) -> bool {
        !self.disconnected.load(Ordering::Acquire) && self.target.strong_count() > 0
    }

    pub(crate) fn blocked(&self) -> bool { self.blocked.load(Ordering::Acquire) > 0 }

    pub(crate) fn disconnect(&self) { self.disconnected.store(true, Ordering::Release); }
}

/// Handle to one signal-slot link.
///
/// The handle never owns the link: dropping it changes nothing, and all
/// operations on an expired connection are safe no-ops. A default-constructed
/// connection is expired.
#[derive(Clone, Default)]
pub struct Connection {
    state: Weak<ConnState>,
}

impl Connection {
    pub(crate) fn from_state(state: &Arc<ConnState>) -> Self { Self { state: Arc::downgrade(state) } }

    /// True if the link no longer delivers: the signal or the slot is gone,
    /// or the connection was explicitly disconnected.
    pub fn expired(&self) -> bool {
        match self.state.upgrade() {
            Some(state) => !state.alive(),
            None => true,
        }
    }

    /// Severs the link. Idempotent; a no-op on an expired connection.
    pub fn disconnect(&self) {
        if let Some(state) = self.state.upgrade() {
            state.disconnect();
        }
    }

    /// Scoped suppression of this connection, see [`ConnectionBlocker`].
    pub fn blocker(&self) -> ConnectionBlocker { ConnectionBlocker::new(self) }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").field("expired", &self.expired()).finish()
    }
}

/// Scoped blocker: while alive, the blocked connection's slot is skipped by
/// `emit` and `async_emit`. Blocking is reference-counted, so stacking
/// blockers on one connection keeps it blocked until the last one is gone.
pub struct ConnectionBlocker {
    state: Option<Arc<ConnState>>,
}

impl ConnectionBlocker {
    /// Blocks `connection` for the blocker's lifetime. Blocking an expired
    /// connection yields an inert blocker.
    pub fn new(connection: &Connection) -> Self {
        let state = connection.state.upgrade();
        if let Some(state) = &state {
            state.blocked.fetch_add(1, Ordering::AcqRel);
        }
        Self { state }
    }

    /// Releases this blocker's hold early. Idempotent.
    pub fn reset(&mut self) {
        if let Some(state) = self.state.take() {
            state.blocked.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

impl Drop for ConnectionBlocker {
    fn drop(&mut self) { self.reset(); }
}
