use thiserror::Error;

/// Errors surfaced by the fallible connection-management operations.
///
/// Expiration of a connection is deliberately not represented here: a dead
/// signal or slot is a normal state queried through [`Connection::expired`]
/// and skipped during dispatch.
///
/// [`Connection::expired`]: crate::Connection::expired
#[derive(Error, Debug)]
pub enum ComError {
    /// The slot's signature is incompatible with the signal, or the slot is
    /// not presently connected.
    #[error("bad slot: {0}")]
    BadSlot(&'static str),

    /// A live connection between this signal and this slot already exists.
    #[error("slot already connected")]
    AlreadyConnected,

    /// Asynchronous dispatch was requested but the slot has no bound worker
    /// and no default worker is registered.
    #[error("no worker available for async dispatch")]
    NoWorker,
}
