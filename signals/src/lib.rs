/*!
Typed signal/slot communication core.

A [`Signal`] owns an ordered list of connections to [`Slot`]s. Slots declare
their own arity: a slot may take fewer parameters than the signal provides,
in which case the trailing arguments are dropped at dispatch. Compatibility
is checked once, at connect time: an incompatible slot fails with
[`ComError::BadSlot`] and never reaches emit.

Connections are observed, not owned: a [`Connection`] handle can inspect,
disconnect or temporarily block its link, but dropping the handle changes
nothing, and destroying either endpoint expires the link without any
explicit disconnect.

# Basic usage

```rust
use sigcom_signals::{Signal, new_slot};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

let hits = Arc::new(AtomicUsize::new(0));

// Declared arity 1: receives only the leading argument of the signal.
let slot = {
    let hits = hits.clone();
    new_slot(move |value: f32| {
        hits.fetch_add(value as usize, Ordering::SeqCst);
    })
};

let sig = Signal::<(f32, f64, String)>::new();
let connection = sig.connect(&slot).unwrap();
assert_eq!(sig.num_connections(), 1);

sig.emit((21.0, 42.0, "emit".to_string()));
assert_eq!(hits.load(Ordering::SeqCst), 21);

connection.disconnect();
assert!(connection.expired());
assert_eq!(sig.num_connections(), 0);
```

# Asynchronous dispatch

Bind a slot to a [`Worker`], anything that can run a deferred task (with the
`tokio` feature a runtime handle qualifies), and `async_emit` schedules the
calls there instead of running them inline.
*/

mod adapt;
mod connection;
mod error;
mod registry;
mod signal;
mod slot;
mod worker;

pub use adapt::{Prefix, SignalArgs};
pub use connection::{Connection, ConnectionBlocker};
pub use error::ComError;
pub use registry::{Key, Signals, Slots};
pub use signal::{Signal, SignalBase};
pub use slot::{Slot, SlotBase, SlotFn, SlotId, new_slot};
pub use worker::{Task, Worker, clear_default_worker, default_worker, set_default_worker};
