//! Overwrite-on-full ring buffer and its producer/consumer handles.
//!
//! # Overview
//! - Fixed capacity `N`, no allocation, usable from a `static`.
//! - Writes never fail and never wait: on a full ring the oldest unread
//!   elements are overwritten.
//! - Consumers drain element by element, by contiguous block (zero-copy or
//!   copying), or by line for text elements.
//! - The discipline parameter `D` picks the synchronization once, at the type
//!   level (see [`discipline`](crate::discipline)).
//!
//! # Handles
//! [`producer`](RingBuffer::producer) and [`consumer`](RingBuffer::consumer)
//! hand out at most one handle of each kind at a time; dropping a handle
//! releases it. Handle methods take `&mut self`, so a handle cannot be used
//! from two contexts at once either. This is how an [`IrqSafe`] ring keeps its
//! single-producer/single-consumer contract. A [`Locked`] ring also exposes
//! every operation on `&self` for any number of threads.

use core::fmt;
use core::marker::PhantomData;

use crate::atomic::{AtomicBool, Ordering};
use crate::cursor::Cursors;
use crate::discipline::{Discipline, IrqSafe, Locked, Store};
use crate::element::{Element, Text};
use crate::format;

/// Fixed-capacity ring of `N` elements of `T` that overwrites the oldest
/// unread data when full.
pub struct RingBuffer<T: Element, const N: usize, D: Discipline = Locked> {
    store: D::Store<T, N>,
    producer_claimed: AtomicBool,
    consumer_claimed: AtomicBool,
}

/// The part of a sentinel-terminated run before its first `END`.
fn terminated<T: Element>(items: &[T]) -> &[T] {
    let end = items
        .iter()
        .position(|&item| item == T::END)
        .unwrap_or(items.len());
    &items[..end]
}

impl<T: Element, const N: usize, D: Discipline> RingBuffer<T, N, D> {
    /// Creates an empty ring.
    ///
    /// `N` must be in `1..=65535`; other capacities fail to compile.
    pub const fn new() -> Self {
        const {
            assert!(
                N > 0 && N <= u16::MAX as usize,
                "ring capacity must be between 1 and 65535"
            )
        };
        Self {
            store: <D::Store<T, N> as Store<T, N>>::INIT,
            producer_claimed: AtomicBool::new(false),
            consumer_claimed: AtomicBool::new(false),
        }
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of unread elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.store.cursors().len(N)
    }

    /// True when nothing is unread. Never takes a lock.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.cursors().is_empty()
    }

    /// True when `N` elements are unread, so the next write overwrites one.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.store.cursors().is_full()
    }

    /// Snapshot of the cursors.
    #[inline]
    pub fn cursors(&self) -> Cursors {
        self.store.cursors()
    }

    /// Consumes the contiguous run at the oldest element and returns it
    /// without copying.
    ///
    /// The run ends at the newest element or at the physical end of storage;
    /// when the unread data wraps, a second call returns the rest. The
    /// exclusive borrow keeps the span valid: nothing can write until it is
    /// released.
    pub fn consume_block(&mut self) -> &[T] {
        self.store.consume_block()
    }

    /// Claims the producer handle.
    ///
    /// # Panics
    /// If a producer handle is already active.
    pub fn producer(&self) -> Producer<'_, T, N, D> {
        match self.try_producer() {
            Some(producer) => producer,
            None => panic!("ring producer already claimed"),
        }
    }

    /// Claims the producer handle, or returns `None` if one is active.
    pub fn try_producer(&self) -> Option<Producer<'_, T, N, D>> {
        claim(&self.producer_claimed).then(|| Producer {
            ring: self,
            _not_sync: PhantomData,
        })
    }

    /// Claims the consumer handle.
    ///
    /// # Panics
    /// If a consumer handle is already active.
    pub fn consumer(&self) -> Consumer<'_, T, N, D> {
        match self.try_consumer() {
            Some(consumer) => consumer,
            None => panic!("ring consumer already claimed"),
        }
    }

    /// Claims the consumer handle, or returns `None` if one is active.
    pub fn try_consumer(&self) -> Option<Consumer<'_, T, N, D>> {
        claim(&self.consumer_claimed).then(|| Consumer {
            ring: self,
            _not_sync: PhantomData,
        })
    }
}

fn claim(flag: &AtomicBool) -> bool {
    flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
        .is_ok()
}

impl<T: Element, const N: usize, D: Discipline> Default for RingBuffer<T, N, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element, const N: usize, D: Discipline> fmt::Debug for RingBuffer<T, N, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.cursors();
        f.debug_struct("RingBuffer")
            .field("capacity", &N)
            .field("len", &c.len(N))
            .field("head", &c.head())
            .field("tail", &c.tail())
            .field("full", &c.is_full())
            .finish()
    }
}

/// Shared access for lock-guarded rings: any thread may produce or consume.
impl<T: Element, const N: usize> RingBuffer<T, N, Locked> {
    /// Writes one element, overwriting the oldest unread one if full.
    pub fn write(&self, item: T) {
        self.store.write(item);
    }

    /// Writes every element of `items` in order. If `items` is longer than
    /// `N`, only its last `N` elements remain.
    pub fn write_slice(&self, items: &[T]) {
        self.store.write_slice(items);
    }

    /// Writes `items` up to (not including) its first `T::END`.
    pub fn write_terminated(&self, items: &[T]) {
        self.store.write_slice(terminated(items));
    }

    /// Takes the oldest element, or `T::END` if the ring is empty.
    pub fn consume(&self) -> T {
        self.store.try_consume().unwrap_or(T::END)
    }

    pub fn try_consume(&self) -> Option<T> {
        self.store.try_consume()
    }

    /// Copies up to `dest.len()` of the oldest elements into `dest` and
    /// consumes them. Returns how many were copied.
    pub fn consume_block_into(&self, dest: &mut [T]) -> usize {
        self.store.consume_into(dest)
    }

    /// Like [`consume_block`](RingBuffer::consume_block), but lends the span
    /// to `f` while the lock is held instead of requiring exclusive access.
    ///
    /// `f` must not write to or consume from this ring: the lock is not
    /// reentrant and such a call spins forever. The lock-free queries
    /// ([`len`](RingBuffer::len), [`is_empty`](RingBuffer::is_empty) and the
    /// like) are fine.
    pub fn consume_block_with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        self.store.consume_block_with(f)
    }

    /// Discards everything unread and realigns the cursors to slot 0.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Clears the ring only if it is empty. Returns whether it did.
    pub fn clear_if_empty(&self) -> bool {
        self.store.clear_if_empty()
    }
}

impl<T: Text, const N: usize> RingBuffer<T, N, Locked> {
    /// Copies the next line, terminator included, into `dest` and writes
    /// `T::END` after it. Returns the line length without that `END`.
    ///
    /// A line longer than `dest.len() - 1` is cut; the rest comes with the
    /// next call. `dest` needs at least 2 slots to make progress: a shorter
    /// one gets only `END` (if it has room) and 0 is returned with data still
    /// pending.
    pub fn consume_line(&self, dest: &mut [T]) -> usize {
        self.store.consume_line(dest)
    }
}

impl<const N: usize> RingBuffer<u8, N, Locked> {
    /// Formatted write, used through `write!`.
    ///
    /// # Panics
    /// If the rendered text exceeds [`FORMAT_SCRATCH`](crate::FORMAT_SCRATCH).
    pub fn write_fmt(&self, args: fmt::Arguments<'_>) {
        format::render(args, |text| self.store.write_slice(text));
    }
}

/// Writing side of a ring.
pub struct Producer<'a, T: Element, const N: usize, D: Discipline = Locked> {
    ring: &'a RingBuffer<T, N, D>,
    _not_sync: PhantomData<core::cell::Cell<()>>,
}

impl<T: Element, const N: usize, D: Discipline> Producer<'_, T, N, D> {
    /// Writes one element, overwriting the oldest unread one if full.
    #[inline]
    pub fn write(&mut self, item: T) {
        self.ring.store.write(item);
    }

    /// Writes every element of `items`; only the last `N` survive a longer slice.
    pub fn write_slice(&mut self, items: &[T]) {
        self.ring.store.write_slice(items);
    }

    /// Writes `items` up to (not including) its first `T::END`.
    pub fn write_terminated(&mut self, items: &[T]) {
        self.ring.store.write_slice(terminated(items));
    }

    pub fn ring(&self) -> &RingBuffer<T, N, D> {
        self.ring
    }
}

impl<const N: usize, D: Discipline> Producer<'_, u8, N, D> {
    /// Formatted write, used through `write!`.
    ///
    /// # Panics
    /// If the rendered text exceeds [`FORMAT_SCRATCH`](crate::FORMAT_SCRATCH).
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        let store = &self.ring.store;
        format::render(args, |text| store.write_slice(text));
    }
}

impl<T: Element, const N: usize, D: Discipline> Drop for Producer<'_, T, N, D> {
    fn drop(&mut self) {
        self.ring.producer_claimed.store(false, Ordering::Release);
    }
}

/// Reading side of a ring.
pub struct Consumer<'a, T: Element, const N: usize, D: Discipline = Locked> {
    ring: &'a RingBuffer<T, N, D>,
    _not_sync: PhantomData<core::cell::Cell<()>>,
}

impl<T: Element, const N: usize, D: Discipline> Consumer<'_, T, N, D> {
    /// Takes the oldest element, or `T::END` if the ring is empty.
    ///
    /// Check [`is_empty`](Self::is_empty) or use
    /// [`try_consume`](Self::try_consume) when `T::END` is a valid payload.
    #[inline]
    pub fn consume(&mut self) -> T {
        self.ring.store.try_consume().unwrap_or(T::END)
    }

    #[inline]
    pub fn try_consume(&mut self) -> Option<T> {
        self.ring.store.try_consume()
    }

    /// Copies up to `dest.len()` of the oldest elements into `dest` and
    /// consumes them. Returns how many were copied; 0 means nothing pending.
    pub fn consume_block_into(&mut self, dest: &mut [T]) -> usize {
        self.ring.store.consume_into(dest)
    }

    /// Discards everything unread and realigns the cursors to slot 0.
    ///
    /// On an [`IrqSafe`] ring a producer write racing with this call may be
    /// discarded with the rest; [`clear_if_empty`](Self::clear_if_empty) never
    /// discards data.
    pub fn clear(&mut self) {
        self.ring.store.clear();
    }

    /// Clears the ring only if it is empty and no write races with the call.
    /// Returns whether the reset happened.
    pub fn clear_if_empty(&mut self) -> bool {
        self.ring.store.clear_if_empty()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn ring(&self) -> &RingBuffer<T, N, D> {
        self.ring
    }
}

impl<T: Text, const N: usize, D: Discipline> Consumer<'_, T, N, D> {
    /// Copies the next line, terminator included, into `dest` and writes
    /// `T::END` after it. Returns the line length without that `END`.
    ///
    /// A line longer than `dest.len() - 1` is cut; the rest comes with the
    /// next call. Pending text without a terminator is returned as is.
    /// `dest` needs at least 2 slots to make progress: a shorter one gets only
    /// `END` (if it has room) and 0 is returned with data still pending.
    pub fn consume_line(&mut self, dest: &mut [T]) -> usize {
        self.ring.store.consume_line(dest)
    }
}

impl<T: Element, const N: usize, D: Discipline> Drop for Consumer<'_, T, N, D> {
    fn drop(&mut self) {
        self.ring.consumer_claimed.store(false, Ordering::Release);
    }
}

/// Lock-free ring for one interrupt-context producer and one main-context
/// consumer.
pub type IrqRing<T, const N: usize> = RingBuffer<T, N, IrqSafe>;
