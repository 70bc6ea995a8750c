use std::any::Any;
use std::sync::{Arc, RwLock, Weak};

use crate::adapt::SignalArgs;
use crate::error::ComError;
use crate::worker::{Task, Worker, default_worker};

/// Callables usable as slot functions.
///
/// Implemented for closures and functions of arity 0..=5; the declared
/// parameters become the tuple `P`. This is what lets `new_slot(|x: f32| ..)`
/// infer its signature without the caller spelling out tuple types.
pub trait SlotFn<P, R>: Send + Sync + 'static {
    fn invoke(&self, args: P) -> R;
}

macro_rules! impl_slot_fn {
    (($($A:ident),*); ($($a:ident),*)) => {
        impl<F, R, $($A),*> SlotFn<($($A,)*), R> for F
        where F: Fn($($A),*) -> R + Send + Sync + 'static
        {
            fn invoke(&self, ($($a,)*): ($($A,)*)) -> R { self($($a),*) }
        }
    };
}

impl_slot_fn!((); ());
impl_slot_fn!((A0); (a0));
impl_slot_fn!((A0, A1); (a0, a1));
impl_slot_fn!((A0, A1, A2); (a0, a1, a2));
impl_slot_fn!((A0, A1, A2, A3); (a0, a1, a2, a3));
impl_slot_fn!((A0, A1, A2, A3, A4); (a0, a1, a2, a3, a4));

/// Identity of a slot. Clones of a slot share the same id; the id is the
/// address of the shared run core, which stays reserved for as long as any
/// weak reference to it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{:#x}", self.0) }
}

/// The return-erased part of a slot, shared between all clones and weakly
/// referenced by every connection. Its liveness is what "slot owner still
/// alive" means to a signal.
pub(crate) struct RunCore<P> {
    run: Box<dyn Fn(P) + Send + Sync>,
    worker: RwLock<Option<Arc<dyn Worker>>>,
}

impl<P> RunCore<P> {
    pub(crate) fn run(&self, args: P) { (self.run)(args) }

    pub(crate) fn worker(&self) -> Option<Arc<dyn Worker>> { self.worker.read().unwrap().clone() }
}

/// Dyn-safe slot surface, used where slots of heterogeneous signatures meet:
/// `Signal::connect` and the keyed [`Slots`] registry.
///
/// [`Slots`]: crate::Slots
pub trait SlotBase: Send + Sync {
    /// Declared parameter count.
    fn arity(&self) -> usize;

    /// Identity shared by all clones of the slot.
    fn id(&self) -> SlotId;

    /// The type-erased run core, downcast by the connect-time compatibility
    /// probe.
    fn core_any(&self) -> Arc<dyn Any + Send + Sync>;

    /// The worker bound for asynchronous dispatch, if any.
    fn worker(&self) -> Option<Arc<dyn Worker>>;

    /// Binds the worker used for asynchronous dispatch. Affects future
    /// dispatches only.
    fn set_worker(&self, worker: Arc<dyn Worker>);
}

/// A type-erased, invocable wrapper around a callable with declared parameter
/// tuple `P` and return type `R`.
///
/// The signature is fixed at construction. Cloning produces another handle to
/// the same slot; clones share identity, worker binding, and liveness. When
/// the last handle is dropped, every connection referencing the slot expires.
pub struct Slot<P, R = ()> {
    func: Arc<dyn SlotFn<P, R>>,
    core: Arc<RunCore<P>>,
}

impl<P, R> Clone for Slot<P, R> {
    fn clone(&self) -> Self { Self { func: self.func.clone(), core: self.core.clone() } }
}

/// Wraps a callable into a [`Slot`]. Bind an object's method by moving a
/// clone of the owner (or of its state) into the closure.
pub fn new_slot<P, R, F>(f: F) -> Slot<P, R>
where
    P: SignalArgs,
    R: 'static,
    F: SlotFn<P, R>,
{
    let func: Arc<dyn SlotFn<P, R>> = Arc::new(f);
    let run = {
        let func = func.clone();
        Box::new(move |args: P| {
            func.invoke(args);
        })
    };
    Slot { func, core: Arc::new(RunCore { run, worker: RwLock::new(None) }) }
}

impl<P, R> Slot<P, R>
where
    P: SignalArgs,
    R: 'static,
{
    /// Synchronous call with the exact declared signature.
    pub fn call(&self, args: P) -> R { self.func.invoke(args) }

    /// Synchronous call, discarding the result.
    pub fn run(&self, args: P) { self.core.run(args) }

    /// Schedules a call on the slot's worker, falling back to the default
    /// worker. Returns without waiting for execution.
    pub fn async_run(&self, args: P) -> Result<(), ComError> {
        let worker = self.dispatch_worker()?;
        let core = self.core.clone();
        worker.post(Box::new(move || core.run(args)) as Task);
        Ok(())
    }

    /// Schedules a call on the slot's worker and returns a receiver for the
    /// result. The receiver resolves once the worker has run the call.
    #[cfg(feature = "tokio")]
    pub fn async_call(&self, args: P) -> Result<tokio::sync::oneshot::Receiver<R>, ComError>
    where R: Send {
        let worker = self.dispatch_worker()?;
        let (tx, rx) = tokio::sync::oneshot::channel();
        let func = self.func.clone();
        worker.post(Box::new(move || {
            // The caller may have dropped the receiver; nothing to do then.
            let _ = tx.send(func.invoke(args));
        }) as Task);
        Ok(rx)
    }

    /// The worker bound for asynchronous dispatch, if any.
    pub fn worker(&self) -> Option<Arc<dyn Worker>> { self.core.worker() }

    /// Binds the worker used for asynchronous dispatch. Affects future
    /// dispatches only, never calls already scheduled.
    pub fn set_worker(&self, worker: Arc<dyn Worker>) { *self.core.worker.write().unwrap() = Some(worker); }

    fn dispatch_worker(&self) -> Result<Arc<dyn Worker>, ComError> {
        self.core.worker().or_else(default_worker).ok_or(ComError::NoWorker)
    }
}

impl<P, R> SlotBase for Slot<P, R>
where
    P: SignalArgs,
    R: 'static,
{
    fn arity(&self) -> usize { P::ARITY }

    fn id(&self) -> SlotId { SlotId(Arc::as_ptr(&self.core) as *const () as usize) }

    fn core_any(&self) -> Arc<dyn Any + Send + Sync> { self.core.clone() }

    fn worker(&self) -> Option<Arc<dyn Worker>> { Slot::worker(self) }

    fn set_worker(&self, worker: Arc<dyn Worker>) { Slot::set_worker(self, worker) }
}

/// Weak liveness handle to a slot's run core, held by connections.
pub(crate) fn downgrade_core(slot: &dyn SlotBase) -> Weak<dyn Any + Send + Sync> {
    Arc::downgrade(&slot.core_any())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_and_run() {
        let slot = new_slot(|a: i32, b: i32| a + b);
        assert_eq!(slot.call((40, 2)), 42);
        slot.run((1, 2)); // result discarded
    }

    #[test]
    fn clones_share_identity() {
        let slot = new_slot(|| ());
        let other = slot.clone();
        assert_eq!(SlotBase::id(&slot), SlotBase::id(&other));

        let unrelated = new_slot(|| ());
        assert_ne!(SlotBase::id(&slot), SlotBase::id(&unrelated));
    }

    #[test]
    fn arity_matches_declaration() {
        assert_eq!(SlotBase::arity(&new_slot(|| ())), 0);
        assert_eq!(SlotBase::arity(&new_slot(|_: f32| ())), 1);
        assert_eq!(SlotBase::arity(&new_slot(|_: f32, _: f64, _: String| ())), 3);
    }

    #[test]
    fn async_run_without_worker_fails() {
        let slot = new_slot(|| ());
        assert!(matches!(slot.async_run(()), Err(ComError::NoWorker)));
    }
}
