use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::adapt::{Receiver, SignalArgs};
use crate::connection::{ConnState, Connection};
use crate::error::ComError;
use crate::slot::{SlotBase, SlotId, downgrade_core};
use crate::worker::default_worker;

struct Entry<A> {
    slot: SlotId,
    state: Arc<ConnState>,
    receiver: Arc<dyn Receiver<A>>,
}

struct SignalCore<A> {
    /// Insertion order defines emit order. The lock is scoped to list
    /// mutation and snapshots, never held across a slot invocation, so slots
    /// may call back into connect/disconnect on the signal that invoked them.
    connections: Mutex<Vec<Entry<A>>>,
}

impl<A> Drop for SignalCore<A> {
    fn drop(&mut self) {
        // Outstanding Connection handles (and live blockers) must observe
        // the signal's death as expiration.
        let list = self.connections.get_mut().unwrap_or_else(|e| e.into_inner());
        for entry in list.drain(..) {
            entry.state.disconnect();
        }
    }
}

/// An event-emission point: an ordered, thread-safe collection of connections
/// to slots, declared over an argument tuple `A`.
///
/// Cloning yields another handle to the same connection list. When the last
/// handle is dropped, all outstanding connections expire.
pub struct Signal<A: SignalArgs> {
    core: Arc<SignalCore<A>>,
}

impl<A: SignalArgs> Clone for Signal<A> {
    fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<A: SignalArgs> Default for Signal<A> {
    fn default() -> Self { Self::new() }
}

impl<A: SignalArgs> std::fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal").field("connections", &self.num_connections()).finish()
    }
}

impl<A: SignalArgs> Signal<A> {
    pub fn new() -> Self { Self { core: Arc::new(SignalCore { connections: Mutex::new(Vec::new()) }) } }

    /// Connects `slot`, appending it to the emit order.
    ///
    /// Fails with [`ComError::BadSlot`] if no prefix of this signal's
    /// signature matches the slot's declared parameters, and with
    /// [`ComError::AlreadyConnected`] if a live connection to this slot
    /// already exists. A failed connect leaves the connection list untouched.
    pub fn connect(&self, slot: &dyn SlotBase) -> Result<Connection, ComError> {
        let receiver = A::adapt(slot).ok_or(ComError::BadSlot("incompatible slot signature"))?;

        let mut list = self.core.connections.lock().unwrap();
        list.retain(|entry| entry.state.alive());
        if list.iter().any(|entry| entry.slot == slot.id()) {
            return Err(ComError::AlreadyConnected);
        }

        let state = Arc::new(ConnState::new(downgrade_core(slot)));
        let connection = Connection::from_state(&state);
        list.push(Entry { slot: slot.id(), state, receiver });
        trace!(slot = %slot.id(), connections = list.len(), "connect");
        Ok(connection)
    }

    /// Severs the connection to `slot`. Fails with [`ComError::BadSlot`] if
    /// `slot` is not presently connected; existing connections are then left
    /// untouched.
    pub fn disconnect(&self, slot: &dyn SlotBase) -> Result<(), ComError> {
        let mut list = self.core.connections.lock().unwrap();
        list.retain(|entry| entry.state.alive());
        match list.iter().position(|entry| entry.slot == slot.id()) {
            Some(index) => {
                let entry = list.remove(index);
                entry.state.disconnect();
                trace!(slot = %slot.id(), connections = list.len(), "disconnect");
                Ok(())
            }
            None => Err(ComError::BadSlot("no such slot connected")),
        }
    }

    /// Severs every connection; all outstanding handles expire. Idempotent.
    pub fn disconnect_all(&self) {
        let mut list = self.core.connections.lock().unwrap();
        for entry in list.drain(..) {
            entry.state.disconnect();
        }
    }

    /// Looks up the live connection to `slot`. Without `required`, a missing
    /// connection yields an expired default handle; with `required` it fails
    /// with [`ComError::BadSlot`].
    pub fn get_connection(&self, slot: &dyn SlotBase, required: bool) -> Result<Connection, ComError> {
        let mut list = self.core.connections.lock().unwrap();
        list.retain(|entry| entry.state.alive());
        match list.iter().find(|entry| entry.slot == slot.id()) {
            Some(entry) => Ok(Connection::from_state(&entry.state)),
            None if required => Err(ComError::BadSlot("no such slot connected")),
            None => Ok(Connection::default()),
        }
    }

    /// Number of live connections. Entries whose slot has been destroyed are
    /// pruned here, so destroying a slot in a narrower scope than the signal
    /// is reflected without any explicit disconnect.
    pub fn num_connections(&self) -> usize {
        let mut list = self.core.connections.lock().unwrap();
        list.retain(|entry| entry.state.alive());
        list.len()
    }

    /// Synchronous emit: invokes every live, non-blocked connection's slot in
    /// connection order on the caller's thread, truncating trailing arguments
    /// to each slot's declared arity.
    ///
    /// Eligibility is checked per call, not once up front: a slot that
    /// disconnects or blocks a connection not yet visited suppresses its
    /// delivery within the same emit.
    pub fn emit(&self, args: A) {
        let targets = self.snapshot();
        trace!(targets = targets.len(), "emit");
        for (state, receiver) in &targets {
            if state.alive() && !state.blocked() {
                receiver.deliver(&args);
            }
        }
    }

    /// Asynchronous emit: schedules one adapted invocation per live
    /// connection on the slot's worker (falling back to the default worker)
    /// and returns without waiting. No ordering across connections; each
    /// slot is invoked at most once per call, and a connection disconnected
    /// or blocked by the time its task runs is skipped.
    ///
    /// Fails with [`ComError::NoWorker`] when a target has no worker anywhere
    /// to run on; invocations scheduled before the failing target stay
    /// scheduled.
    pub fn async_emit(&self, args: A) -> Result<(), ComError> {
        let targets = self.snapshot();
        trace!(targets = targets.len(), "async_emit");
        for (state, receiver) in targets {
            let worker = receiver.worker().or_else(default_worker).ok_or(ComError::NoWorker)?;
            let args = args.clone();
            // Eligibility is re-checked when the task actually runs, so a
            // connection severed or blocked between scheduling and execution
            // is not delivered.
            worker.post(Box::new(move || {
                if state.alive() && !state.blocked() {
                    receiver.deliver(&args);
                }
            }));
        }
        Ok(())
    }

    /// Prunes dead entries and snapshots the list, releasing the lock before
    /// anything is invoked. Eligibility of each entry is checked again at
    /// delivery time.
    fn snapshot(&self) -> Vec<(Arc<ConnState>, Arc<dyn Receiver<A>>)> {
        let mut list = self.core.connections.lock().unwrap();
        list.retain(|entry| entry.state.alive());
        list.iter().map(|entry| (entry.state.clone(), entry.receiver.clone())).collect()
    }
}

/// Dyn-safe signal surface, used where signals of heterogeneous signatures
/// meet: the keyed [`Signals`] registry.
///
/// [`Signals`]: crate::Signals
pub trait SignalBase: Send + Sync {
    /// Number of arguments this signal provides to its slots.
    fn arity(&self) -> usize;
    fn connect(&self, slot: &dyn SlotBase) -> Result<Connection, ComError>;
    fn disconnect(&self, slot: &dyn SlotBase) -> Result<(), ComError>;
    fn disconnect_all(&self);
    fn num_connections(&self) -> usize;
}

impl<A: SignalArgs> SignalBase for Signal<A> {
    fn arity(&self) -> usize { A::ARITY }

    fn connect(&self, slot: &dyn SlotBase) -> Result<Connection, ComError> { Signal::connect(self, slot) }

    fn disconnect(&self, slot: &dyn SlotBase) -> Result<(), ComError> { Signal::disconnect(self, slot) }

    fn disconnect_all(&self) { Signal::disconnect_all(self) }

    fn num_connections(&self) -> usize { Signal::num_connections(self) }
}
