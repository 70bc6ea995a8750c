//! Keyed signal/slot containers.
//!
//! Objects that expose several signals (or slots) publish them under string
//! keys so collaborators can look them up without knowing the concrete
//! signature, going through the dyn-safe [`SignalBase`]/[`SlotBase`]
//! surfaces.

use std::sync::Arc;

use crate::signal::SignalBase;
use crate::slot::SlotBase;
use crate::worker::Worker;

/// Key under which a signal or slot is published.
pub type Key = &'static str;

/// Insertion-ordered map of signals owned by one object.
#[derive(Default)]
pub struct Signals {
    entries: Vec<(Key, Arc<dyn SignalBase>)>,
}

impl Signals {
    pub fn new() -> Self { Self::default() }

    /// Publishes `signal` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: Key, signal: Arc<dyn SignalBase>) {
        self.entries.retain(|(existing, _)| *existing != key);
        self.entries.push((key, signal));
    }

    pub fn get(&self, key: Key) -> Option<&Arc<dyn SignalBase>> {
        self.entries.iter().find(|(existing, _)| *existing == key).map(|(_, signal)| signal)
    }

    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ { self.entries.iter().map(|(key, _)| *key) }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// Insertion-ordered map of slots owned by one object.
#[derive(Default)]
pub struct Slots {
    entries: Vec<(Key, Arc<dyn SlotBase>)>,
}

impl Slots {
    pub fn new() -> Self { Self::default() }

    /// Publishes `slot` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: Key, slot: Arc<dyn SlotBase>) {
        self.entries.retain(|(existing, _)| *existing != key);
        self.entries.push((key, slot));
    }

    pub fn get(&self, key: Key) -> Option<&Arc<dyn SlotBase>> {
        self.entries.iter().find(|(existing, _)| *existing == key).map(|(_, slot)| slot)
    }

    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ { self.entries.iter().map(|(key, _)| *key) }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Homes every published slot onto `worker`, the usual setup for an
    /// object that handles all of its slots on one execution context.
    pub fn set_worker(&self, worker: &Arc<dyn Worker>) {
        for (_, slot) in &self.entries {
            slot.set_worker(worker.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;
    use crate::slot::new_slot;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn keyed_signal_lookup_connects() {
        let mut signals = Signals::new();
        signals.insert("modified", Arc::new(Signal::<(i32,)>::new()));
        signals.insert("deleted", Arc::new(Signal::<()>::new()));
        assert_eq!(signals.len(), 2);
        assert_eq!(signals.keys().collect::<Vec<_>>(), ["modified", "deleted"]);

        let hit = Arc::new(AtomicBool::new(false));
        let slot = {
            let hit = hit.clone();
            new_slot(move || hit.store(true, Ordering::SeqCst))
        };

        let modified = signals.get("modified").unwrap();
        assert_eq!(modified.arity(), 1);
        modified.connect(&slot).unwrap();
        assert_eq!(modified.num_connections(), 1);
        assert!(signals.get("missing").is_none());
    }

    #[test]
    fn insert_replaces_existing_key() {
        let mut slots = Slots::new();
        slots.insert("update", Arc::new(new_slot(|| ())));
        slots.insert("update", Arc::new(new_slot(|_: i32| ())));
        assert_eq!(slots.len(), 1);
        assert_eq!(slots.get("update").unwrap().arity(), 1);
    }
}
