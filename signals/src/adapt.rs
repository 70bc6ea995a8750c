//! Connect-time signature adaptation.
//!
//! A slot may declare fewer parameters than the signal provides; the retained
//! prefix must match the signal's leading parameter types exactly. The probe
//! in [`SignalArgs::adapt`] walks the prefixes of the signal's signature from
//! full arity down to arity 0 and stops at the first one the slot's run core
//! downcasts to. The arity-0 probe is the explicit base case: the walk always
//! terminates there, it never recurses below an empty argument list.

use std::sync::{Arc, Weak};

use crate::slot::{RunCore, SlotBase};
use crate::worker::Worker;

/// Tuples extractable from the front of an argument tuple `A`.
pub trait Prefix<A>: Sized {
    /// Clones the leading elements of `args` into the shorter tuple.
    fn prefix_of(args: &A) -> Self;
}

macro_rules! impl_prefix {
    (($($A:ident),*); ($($P:ident),*); ($($idx:tt),*)) => {
        impl<$($A: Clone),*> Prefix<($($A,)*)> for ($($P,)*) {
            #[allow(unused_variables)]
            fn prefix_of(args: &($($A,)*)) -> Self { ($(args.$idx.clone(),)*) }
        }
    };
}

impl_prefix!((); (); ());
impl_prefix!((A0); (); ());
impl_prefix!((A0); (A0); (0));
impl_prefix!((A0, A1); (); ());
impl_prefix!((A0, A1); (A0); (0));
impl_prefix!((A0, A1); (A0, A1); (0, 1));
impl_prefix!((A0, A1, A2); (); ());
impl_prefix!((A0, A1, A2); (A0); (0));
impl_prefix!((A0, A1, A2); (A0, A1); (0, 1));
impl_prefix!((A0, A1, A2); (A0, A1, A2); (0, 1, 2));
impl_prefix!((A0, A1, A2, A3); (); ());
impl_prefix!((A0, A1, A2, A3); (A0); (0));
impl_prefix!((A0, A1, A2, A3); (A0, A1); (0, 1));
impl_prefix!((A0, A1, A2, A3); (A0, A1, A2); (0, 1, 2));
impl_prefix!((A0, A1, A2, A3); (A0, A1, A2, A3); (0, 1, 2, 3));
impl_prefix!((A0, A1, A2, A3, A4); (); ());
impl_prefix!((A0, A1, A2, A3, A4); (A0); (0));
impl_prefix!((A0, A1, A2, A3, A4); (A0, A1); (0, 1));
impl_prefix!((A0, A1, A2, A3, A4); (A0, A1, A2); (0, 1, 2));
impl_prefix!((A0, A1, A2, A3, A4); (A0, A1, A2, A3); (0, 1, 2, 3));
impl_prefix!((A0, A1, A2, A3, A4); (A0, A1, A2, A3, A4); (0, 1, 2, 3, 4));

/// Adapted, type-erased delivery endpoint for one connection.
///
/// Created at connect time, after the compatibility probe succeeded. Holds
/// only a weak reference to the slot: delivery to a dead slot is a no-op.
pub trait Receiver<A>: Send + Sync {
    /// True while the target slot still exists.
    fn alive(&self) -> bool;

    /// Clones the declared prefix of `args` and invokes the slot. Returns
    /// false if the slot is gone.
    fn deliver(&self, args: &A) -> bool;

    /// The target slot's bound worker, if the slot is alive and has one.
    fn worker(&self) -> Option<Arc<dyn Worker>>;
}

struct PrefixReceiver<P> {
    target: Weak<RunCore<P>>,
}

impl<A, P> Receiver<A> for PrefixReceiver<P>
where
    A: SignalArgs,
    P: Prefix<A> + Send + Sync + 'static,
{
    fn alive(&self) -> bool { self.target.strong_count() > 0 }

    fn deliver(&self, args: &A) -> bool {
        match self.target.upgrade() {
            Some(core) => {
                core.run(P::prefix_of(args));
                true
            }
            None => false,
        }
    }

    fn worker(&self) -> Option<Arc<dyn Worker>> { self.target.upgrade().and_then(|core| core.worker()) }
}

fn probe<A, P>(slot: &dyn SlotBase) -> Option<Arc<dyn Receiver<A>>>
where
    A: SignalArgs,
    P: Prefix<A> + Send + Sync + 'static,
{
    let core = slot.core_any().downcast::<RunCore<P>>().ok()?;
    Some(Arc::new(PrefixReceiver { target: Arc::downgrade(&core) }))
}

/// Argument tuples a [`Signal`] can be declared over (arity 0..=5).
///
/// [`Signal`]: crate::Signal
pub trait SignalArgs: Clone + Send + Sync + 'static {
    /// Number of arguments the signal provides.
    const ARITY: usize;

    /// Runtime compatibility probe: returns an adapted receiver for `slot`,
    /// or `None` when no prefix of this signature matches the slot's
    /// declared parameters.
    fn adapt(slot: &dyn SlotBase) -> Option<Arc<dyn Receiver<Self>>>;
}

macro_rules! impl_signal_args {
    ($arity:expr; ($($T:ident),*) => [$(($($P:ident),*)),+]) => {
        impl<$($T: Clone + Send + Sync + 'static),*> SignalArgs for ($($T,)*) {
            const ARITY: usize = $arity;

            fn adapt(slot: &dyn SlotBase) -> Option<Arc<dyn Receiver<Self>>> {
                // Longest prefix first, down to the arity-0 base case.
                $(
                    if let Some(receiver) = probe::<Self, ($($P,)*)>(slot) {
                        return Some(receiver);
                    }
                )+
                None
            }
        }
    };
}

impl_signal_args!(0; () => [()]);
impl_signal_args!(1; (T0) => [(T0), ()]);
impl_signal_args!(2; (T0, T1) => [(T0, T1), (T0), ()]);
impl_signal_args!(3; (T0, T1, T2) => [(T0, T1, T2), (T0, T1), (T0), ()]);
impl_signal_args!(4; (T0, T1, T2, T3) => [(T0, T1, T2, T3), (T0, T1, T2), (T0, T1), (T0), ()]);
impl_signal_args!(5; (T0, T1, T2, T3, T4) => [(T0, T1, T2, T3, T4), (T0, T1, T2, T3), (T0, T1, T2), (T0, T1), (T0), ()]);
