//! Concurrency disciplines.
//!
//! A ring picks its discipline with a type parameter, and each discipline
//! brings its own state type implementing [`Store`]. The two never mix: the
//! choice is made once, at the type level, and no operation branches on it.
//!
//! - [`Locked`]: every operation holds a per-instance spin lock. Any number of
//!   producers and consumers may share the ring, but a producer must never run
//!   in interrupt context (it could spin forever on a lock held by the code it
//!   interrupted).
//! - [`IrqSafe`]: no lock. One producer (typically an interrupt handler) and
//!   one consumer (the main context) coordinate through a single atomic state
//!   word.

use crate::cursor::Cursors;
use crate::element::{Element, Text};
use crate::irq::IrqStore;
use crate::locked::LockedStore;

mod sealed {
    pub trait Sealed {}
}

/// Lock-guarded discipline.
#[derive(Copy, Clone, Debug, Default)]
pub struct Locked;

/// Lock-free single-producer/single-consumer discipline.
#[derive(Copy, Clone, Debug, Default)]
pub struct IrqSafe;

/// Selects the state type, and with it the synchronization, of a ring.
pub trait Discipline: sealed::Sealed + 'static {
    /// Ring state under this discipline.
    type Store<T: Element, const N: usize>: Store<T, N>;
}

impl Discipline for Locked {
    type Store<T: Element, const N: usize> = LockedStore<T, N>;
}

impl Discipline for IrqSafe {
    type Store<T: Element, const N: usize> = IrqStore<T, N>;
}

/// Operations every discipline's state provides.
///
/// Callers go through [`RingBuffer`](crate::RingBuffer) and its handles; this
/// trait only fixes the contract the two stores share.
pub trait Store<T: Element, const N: usize>: sealed::Sealed + Sized {
    /// An empty store.
    const INIT: Self;

    /// Current cursors, read without locking.
    fn cursors(&self) -> Cursors;

    fn write(&self, item: T);

    /// Writes `items` in order; only the last `N` survive a longer slice.
    fn write_slice(&self, items: &[T]);

    fn try_consume(&self) -> Option<T>;

    fn consume_into(&self, dest: &mut [T]) -> usize;

    fn consume_line(&self, dest: &mut [T]) -> usize
    where
        T: Text;

    /// Consumes the contiguous run at `tail` without copying.
    fn consume_block(&mut self) -> &[T];

    fn clear(&self);

    /// Resets the store if it is empty and no write interleaved.
    fn clear_if_empty(&self) -> bool;
}

impl sealed::Sealed for Locked {}
impl sealed::Sealed for IrqSafe {}
impl<T: Element, const N: usize> sealed::Sealed for LockedStore<T, N> {}
impl<T: Element, const N: usize> sealed::Sealed for IrqStore<T, N> {}
