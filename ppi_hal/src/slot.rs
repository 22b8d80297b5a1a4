//! Lock-free hook slot: an atomically swapped immutable handler chain.
//!
//! Plugins extend the host by layering a stage in front of a dispatch
//! point. The slot holds the active chain as a single pointer that the
//! real-time reader loads once per dispatch, so a reader observes either
//! the old chain or the new one, never a partially updated mix. Chains
//! themselves are immutable once built; changing the chain means building
//! a new one and swapping it in.
//!
//! ## Swap contract
//!
//! - `swap` and `current` are called from foreground context only, where
//!   the host serializes them against each other.
//! - A real-time dispatch that races a swap runs either the old chain or
//!   the new one in full. Swapped-out chains stay allocated until the
//!   slot itself is dropped, so the racing reader always reads live
//!   memory.
//! - Relying on a retired stage being *gone* (e.g. unwrapping the pulse
//!   stage and expecting no further pulses) additionally requires the
//!   host to guarantee that no real-time invocation is in flight through
//!   the old reference — in practice, engagement changes execute as
//!   synchronous commands with the step path quiescent.

use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use static_assertions::assert_impl_all;

use crate::spindle::PowerDriver;
use crate::stepper::StepperHooks;

/// Atomically swappable reference to an immutable handler chain.
pub struct HookSlot<T: ?Sized> {
    // Thin pointer to a boxed `Arc<T>`; `T` itself may be unsized.
    active: AtomicPtr<Arc<T>>,
    // Swapped-out boxes, kept alive for stragglers. Foreground only.
    retired: Mutex<Vec<*mut Arc<T>>>,
}

impl<T: ?Sized> HookSlot<T> {
    /// Create a slot dispatching to `initial`.
    pub fn new(initial: Arc<T>) -> Self {
        Self {
            active: AtomicPtr::new(Box::into_raw(Box::new(initial))),
            retired: Mutex::new(Vec::new()),
        }
    }

    /// Run `f` against the active chain. Real-time safe: one atomic load,
    /// no locks, no allocation.
    #[inline]
    pub fn dispatch<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let active = self.active.load(Ordering::Acquire);
        // SAFETY: `active` is never null and points to a boxed Arc that
        // stays allocated until the slot drops (swaps retire boxes, they
        // never free them).
        f(unsafe { &**active })
    }

    /// Clone the active chain reference. Foreground context only.
    pub fn current(&self) -> Arc<T> {
        let active = self.active.load(Ordering::Acquire);
        // SAFETY: as in `dispatch`.
        unsafe { (*active).clone() }
    }

    /// Install `next` as the active chain, returning the chain it
    /// replaced. Foreground context only.
    pub fn swap(&self, next: Arc<T>) -> Arc<T> {
        let fresh = Box::into_raw(Box::new(next));
        let retired = self.active.swap(fresh, Ordering::AcqRel);
        // SAFETY: `retired` came from `Box::into_raw` in `new` or a prior
        // `swap`; it stays allocated (pushed onto the retired list) so a
        // dispatch racing this swap still reads live memory.
        let previous = unsafe { (*retired).clone() };
        self.retired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(retired);
        previous
    }
}

impl<T: ?Sized> Drop for HookSlot<T> {
    fn drop(&mut self) {
        // SAFETY: exclusive access in drop; every pointer originates from
        // `Box::into_raw` and is freed exactly once here.
        unsafe {
            drop(Box::from_raw(*self.active.get_mut()));
            for retired in self.retired.get_mut().unwrap_or_else(PoisonError::into_inner) {
                drop(Box::from_raw(*retired));
            }
        }
    }
}

// SAFETY: the slot hands out only `&T`; the pointer cells are
// synchronized by the atomic plus the foreground-only swap contract.
unsafe impl<T: ?Sized + Send + Sync> Send for HookSlot<T> {}
unsafe impl<T: ?Sized + Send + Sync> Sync for HookSlot<T> {}

assert_impl_all!(HookSlot<dyn StepperHooks>: Send, Sync);
assert_impl_all!(HookSlot<dyn PowerDriver>: Send, Sync);
