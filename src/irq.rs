//! Lock-free ring state for one interrupt-context producer and one
//! main-context consumer.
//!
//! # State word
//! The whole state lives in a single `AtomicU64`: an overwrite counter in the
//! high half, then `head` and the unread length. Every transition is one
//! compare-and-swap, so the producer and consumer never observe each other
//! half-way. The counter grows with every element the producer drops, so a
//! full ring that was lapped never shows the word it had before the lap.
//!
//! # Producer
//! 1. Clear the pending-clear latch.
//! 2. If the ring is full, CAS the oldest element out first and count it as
//!    overwritten. From then on the slot at `head` is outside the unread
//!    region and nobody reads it.
//! 3. Store the element at `head` and the sentinel after it.
//! 4. CAS the new `head` in. On failure (the consumer moved `tail`, or reset
//!    the ring) reload and redo from step 2; the slot stores are idempotent.
//!
//! # Consumer
//! Copy from the slots the current word says are unread, then CAS `tail`
//! forward. A failed CAS means the word changed while copying, possibly
//! because the producer overwrote what was copied, so the copy is retried.
//! The consumer never stores into the slots.
//!
//! # Limits
//! The counter is 32 bits wide: a copy that stays preempted across exactly
//! 2^32 overwrites cannot tell. Targets without native 64-bit atomics need
//! the `portable-atomic-critical-section` or
//! `portable-atomic-unsafe-assume-single-core` feature.

use core::cell::UnsafeCell;

use crate::atomic::{AtomicBool, AtomicU64, Ordering};
use crate::cursor::Cursors;
use crate::discipline::Store;
use crate::element::{Element, Text};
use crate::frame;
use crate::slots::{SlotRead, Slots};
use crate::trace;

/// Decoded state word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct State {
    cursors: Cursors,
    overwrites: u32,
}

impl State {
    const EMPTY: Self = Self {
        cursors: Cursors::EMPTY,
        overwrites: 0,
    };

    const fn pack(self, cap: usize) -> u64 {
        ((self.overwrites as u64) << 32) | self.cursors.pack(cap) as u64
    }

    const fn unpack(word: u64, cap: usize) -> Self {
        Self {
            cursors: Cursors::unpack(word as u32, cap),
            overwrites: (word >> 32) as u32,
        }
    }

    /// Same overwrite count, new cursors.
    const fn with(self, cursors: Cursors) -> Self {
        Self {
            cursors,
            overwrites: self.overwrites,
        }
    }
}

/// State of an [`IrqSafe`](crate::IrqSafe) ring.
///
/// The consumer never stores into the slots, so right after
/// [`clear`](Store::clear) or a successful
/// [`clear_if_empty`](Store::clear_if_empty) the slot at the new `head` may
/// still hold stale data instead of `T::END`. The producer's next write puts
/// the sentinel back. Reads never look past the unread region, so the stale
/// slot is never returned.
pub struct IrqStore<T: Element, const N: usize> {
    state: AtomicU64,
    pending_clear: AtomicBool,
    slots: UnsafeCell<Slots<T, N>>,
}

// Slot access is coordinated through `state` as described in the module docs;
// the single-producer/single-consumer contract is enforced by the handles.
unsafe impl<T: Element + Send, const N: usize> Sync for IrqStore<T, N> {}

impl<T: Element, const N: usize> IrqStore<T, N> {
    #[inline]
    fn slot(&self, idx: usize) -> *mut T {
        // SAFETY: the pointer comes from our own `UnsafeCell` and every caller
        // passes an index derived from cursors, which stay below `N`.
        unsafe { Slots::slot_ptr(self.slots.get(), idx) }
    }

    #[inline]
    fn load(&self) -> u64 {
        self.state.load(Ordering::Acquire)
    }

    #[inline]
    fn swap_state(&self, current: u64, next: State) -> Result<u64, u64> {
        self.state.compare_exchange(current, next.pack(N), Ordering::AcqRel, Ordering::Acquire)
    }

    /// Copies with `copy`, then commits the copied count, retrying the copy
    /// whenever the producer changed the state underneath it.
    fn consume_with(
        &self,
        dest: &mut [T],
        mut copy: impl FnMut(Cursors, &Reader<'_, T, N>, &mut [T]) -> usize,
    ) -> usize {
        let reader = Reader(self);
        let mut current = self.load();
        loop {
            let state = State::unpack(current, N);
            let c = state.cursors;
            let count = copy(c, &reader, dest);
            if count == 0 {
                return 0;
            }
            match self.swap_state(current, state.with(c.consumed(count, N))) {
                Ok(_) => return count,
                Err(actual) => current = actual,
            }
        }
    }
}

/// Consumer-side view of the slots.
struct Reader<'a, T: Element, const N: usize>(&'a IrqStore<T, N>);

impl<T: Element, const N: usize> SlotRead<T> for Reader<'_, T, N> {
    #[inline]
    fn read(&self, idx: usize) -> T {
        // SAFETY: `idx` is within the unread region of the state word the
        // consumer loaded. If the producer reclaimed the slot meanwhile, the
        // state word changed and the value is discarded by the failing CAS.
        unsafe { self.0.slot(idx).read_volatile() }
    }
}

impl<T: Element, const N: usize> Store<T, N> for IrqStore<T, N> {
    const INIT: Self = Self {
        state: AtomicU64::new(State::EMPTY.pack(N)),
        pending_clear: AtomicBool::new(false),
        slots: UnsafeCell::new(Slots::INIT),
    };

    #[inline]
    fn cursors(&self) -> Cursors {
        State::unpack(self.load(), N).cursors
    }

    fn write(&self, item: T) {
        self.pending_clear.store(false, Ordering::SeqCst);
        let mut current = self.load();
        loop {
            let state = State::unpack(current, N);
            let c = state.cursors;
            if c.is_full() {
                let freed = State {
                    cursors: c.dropped_oldest(N),
                    overwrites: state.overwrites.wrapping_add(1),
                };
                match self.swap_state(current, freed) {
                    Ok(_) => {
                        trace::overwrote(1, N);
                        current = freed.pack(N);
                    }
                    Err(actual) => current = actual,
                }
                continue;
            }

            let (next, _) = c.pushed(1, N);
            // SAFETY: `head` is not in the unread region of a ring that is not
            // full, so the consumer does not read it, and only this producer
            // stores into slots.
            unsafe {
                self.slot(c.head()).write_volatile(item);
                if !next.is_full() {
                    self.slot(next.head()).write_volatile(T::END);
                }
            }
            match self.swap_state(current, state.with(next)) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }

    fn write_slice(&self, items: &[T]) {
        for &item in items {
            self.write(item);
        }
    }

    fn try_consume(&self) -> Option<T> {
        let mut out = [T::END];
        (self.consume_into(&mut out) == 1).then_some(out[0])
    }

    fn consume_into(&self, dest: &mut [T]) -> usize {
        self.consume_with(dest, |c, reader, dest| frame::drain(c, N, reader, dest))
    }

    fn consume_line(&self, dest: &mut [T]) -> usize
    where
        T: Text,
    {
        self.consume_with(dest, |c, reader, dest| frame::line(c, N, reader, dest))
    }

    fn consume_block(&mut self) -> &[T] {
        let word = self.state.get_mut();
        let state = State::unpack(*word, N);
        let c = state.cursors;
        let start = c.tail();
        let len = c.contiguous(N);
        *word = state.with(c.consumed(len, N)).pack(N);
        &self.slots.get_mut().live()[start..start + len]
    }

    fn clear(&self) {
        self.pending_clear.store(false, Ordering::SeqCst);
        let mut current = self.load();
        while let Err(actual) =
            self.swap_state(current, State::unpack(current, N).with(Cursors::EMPTY))
        {
            current = actual;
        }
        trace::cleared(N);
    }

    fn clear_if_empty(&self) -> bool {
        self.pending_clear.store(true, Ordering::SeqCst);
        let current = self.state.load(Ordering::SeqCst);
        let state = State::unpack(current, N);
        // A write between the latch and here clears the latch; a write after
        // the load changes the word and fails the exchange.
        let applied = state.cursors.is_empty()
            && self.pending_clear.load(Ordering::SeqCst)
            && self
                .state
                .compare_exchange(
                    current,
                    state.with(Cursors::EMPTY).pack(N),
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                )
                .is_ok();
        if applied {
            self.pending_clear.store(false, Ordering::SeqCst);
        }
        trace::deferred_clear(applied);
        applied
    }
}
