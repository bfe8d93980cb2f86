//! Lock-guarded ring state.
//!
//! [`RingCore`] is the plain, exclusively borrowed ring: every operation is a
//! `&mut self` method. [`LockedStore`] puts it behind a `spin::Mutex` and keeps
//! an atomic copy of the cursors so emptiness checks never take the lock.

use core::ops::Range;

use spin::Mutex;

use crate::atomic::{AtomicU32, Ordering};
use crate::cursor::Cursors;
use crate::discipline::Store;
use crate::element::{Element, Text};
use crate::frame;
use crate::slots::Slots;
use crate::trace;

pub(crate) struct RingCore<T: Element, const N: usize> {
    cursors: Cursors,
    pending_clear: bool,
    slots: Slots<T, N>,
}

impl<T: Element, const N: usize> RingCore<T, N> {
    pub(crate) const INIT: Self = Self {
        cursors: Cursors::EMPTY,
        pending_clear: false,
        slots: Slots::INIT,
    };

    pub(crate) fn write(&mut self, item: T) {
        self.pending_clear = false;
        self.slots.set(self.cursors.head(), item);
        let (next, dropped) = self.cursors.pushed(1, N);
        self.publish(next, dropped);
    }

    pub(crate) fn write_slice(&mut self, items: &[T]) {
        self.pending_clear = false;
        // Elements that would be overwritten within this same call are never stored.
        let skip = items.len().saturating_sub(N);
        let kept = &items[skip..];
        let start = (self.cursors.head() + skip % N) % N;
        let first = kept.len().min(N - start);

        let live = self.slots.live_mut();
        live[start..start + first].copy_from_slice(&kept[..first]);
        live[..kept.len() - first].copy_from_slice(&kept[first..]);

        let (next, dropped) = self.cursors.pushed(items.len(), N);
        self.publish(next, dropped);
    }

    fn publish(&mut self, next: Cursors, dropped: usize) {
        self.cursors = next;
        if !next.is_full() {
            self.slots.set(next.head(), T::END);
        }
        trace::overwrote(dropped, N);
    }

    pub(crate) fn try_consume(&mut self) -> Option<T> {
        if self.cursors.is_empty() {
            return None;
        }
        let value = self.slots.live()[self.cursors.tail()];
        self.cursors = self.cursors.consumed(1, N);
        Some(value)
    }

    pub(crate) fn consume_into(&mut self, dest: &mut [T]) -> usize {
        let count = frame::drain(self.cursors, N, &self.slots, dest);
        self.cursors = self.cursors.consumed(count, N);
        count
    }

    pub(crate) fn consume_line(&mut self, dest: &mut [T]) -> usize
    where
        T: Text,
    {
        let count = frame::line(self.cursors, N, &self.slots, dest);
        self.cursors = self.cursors.consumed(count, N);
        count
    }

    /// Consumes the contiguous run at `tail` and returns where it lives.
    fn take_block(&mut self) -> Range<usize> {
        let start = self.cursors.tail();
        let len = self.cursors.contiguous(N);
        self.cursors = self.cursors.consumed(len, N);
        start..start + len
    }

    #[cfg(test)]
    fn consume_block(&mut self) -> &[T] {
        let span = self.take_block();
        &self.slots.live()[span]
    }

    pub(crate) fn clear(&mut self) {
        self.cursors = Cursors::EMPTY;
        self.pending_clear = false;
        self.slots.set(0, T::END);
        trace::cleared(N);
    }

    pub(crate) fn clear_if_empty(&mut self) -> bool {
        self.pending_clear = true;
        // No write can land between the latch and the check while the lock is held.
        let applied = self.pending_clear && self.cursors.is_empty();
        if applied {
            self.cursors = Cursors::EMPTY;
            self.pending_clear = false;
            self.slots.set(0, T::END);
        }
        trace::deferred_clear(applied);
        applied
    }

    #[cfg(test)]
    pub(crate) fn slots(&self) -> &Slots<T, N> {
        &self.slots
    }
}

/// State of a [`Locked`](crate::Locked) ring.
pub struct LockedStore<T: Element, const N: usize> {
    core: Mutex<RingCore<T, N>>,
    mirror: AtomicU32,
}

impl<T: Element, const N: usize> LockedStore<T, N> {
    fn with<R>(&self, f: impl FnOnce(&mut RingCore<T, N>) -> R) -> R {
        let mut core = self.core.lock();
        let result = f(&mut core);
        self.mirror.store(core.cursors.pack(N), Ordering::Release);
        result
    }

    /// Consumes the contiguous run at `tail` and hands it to `f` while the
    /// lock is held.
    pub(crate) fn consume_block_with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let mut core = self.core.lock();
        let span = core.take_block();
        self.mirror.store(core.cursors.pack(N), Ordering::Release);
        f(&core.slots.live()[span])
    }
}

impl<T: Element, const N: usize> Store<T, N> for LockedStore<T, N> {
    const INIT: Self = Self {
        core: Mutex::new(RingCore::INIT),
        mirror: AtomicU32::new(Cursors::EMPTY.pack(N)),
    };

    #[inline]
    fn cursors(&self) -> Cursors {
        Cursors::unpack(self.mirror.load(Ordering::Acquire), N)
    }

    fn write(&self, item: T) {
        self.with(|core| core.write(item));
    }

    fn write_slice(&self, items: &[T]) {
        self.with(|core| core.write_slice(items));
    }

    fn try_consume(&self) -> Option<T> {
        self.with(RingCore::try_consume)
    }

    fn consume_into(&self, dest: &mut [T]) -> usize {
        self.with(|core| core.consume_into(dest))
    }

    fn consume_line(&self, dest: &mut [T]) -> usize
    where
        T: Text,
    {
        self.with(|core| core.consume_line(dest))
    }

    fn consume_block(&mut self) -> &[T] {
        let core = self.core.get_mut();
        let span = core.take_block();
        *self.mirror.get_mut() = core.cursors.pack(N);
        &core.slots.live()[span]
    }

    fn clear(&self) {
        self.with(RingCore::clear);
    }

    fn clear_if_empty(&self) -> bool {
        self.with(RingCore::clear_if_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::RingCore;

    fn empty<const N: usize>() -> RingCore<u8, N> {
        RingCore::INIT
    }

    /// The first free slot holds the sentinel whenever one exists, and the
    /// trailing physical slot always does.
    fn assert_terminated<const N: usize>(ring: &RingCore<u8, N>) {
        let physical = ring.slots().physical();
        assert_eq!(physical[N], 0);
        if !ring.cursors.is_full() {
            assert_eq!(physical[ring.cursors.head()], 0);
        }
    }

    #[test]
    fn write_then_consume_in_order() {
        let mut ring = empty::<4>();
        ring.write(1);
        ring.write(2);
        ring.write(3);

        assert_eq!(ring.try_consume(), Some(1));
        assert_eq!(ring.try_consume(), Some(2));
        assert_eq!(ring.try_consume(), Some(3));
        assert_eq!(ring.try_consume(), None);
        assert_terminated(&ring);
    }

    #[test]
    fn overwrite_keeps_newest_capacity_elements() {
        let mut ring = empty::<3>();
        for b in 1..=5 {
            ring.write(b);
            assert_terminated(&ring);
        }

        assert!(ring.cursors.is_full());
        let mut out = [0u8; 8];
        assert_eq!(ring.consume_into(&mut out), 3);
        assert_eq!(&out[..3], &[3, 4, 5]);
    }

    #[test]
    fn bulk_write_wraps_and_overwrites() {
        let mut ring = empty::<5>();
        ring.write_slice(b"abc");
        assert_eq!(ring.try_consume(), Some(b'a'));

        ring.write_slice(b"defgh");
        assert!(ring.cursors.is_full());
        assert_terminated(&ring);

        let mut out = [0u8; 5];
        assert_eq!(ring.consume_into(&mut out), 5);
        assert_eq!(&out, b"defgh");
    }

    #[test]
    fn bulk_write_longer_than_capacity_keeps_the_tail_of_the_input() {
        let mut ring = empty::<4>();
        ring.write(b'x');
        ring.write_slice(b"0123456789");

        let mut out = [0u8; 4];
        assert_eq!(ring.consume_into(&mut out), 4);
        assert_eq!(&out, b"6789");
        assert!(ring.cursors.is_empty());
        assert_eq!(ring.cursors.head(), (1 + 10) % 4);
    }

    #[test]
    fn zero_copy_block_stops_at_the_wrap() {
        let mut ring = empty::<6>();
        ring.write_slice(b"abcd");
        let mut skip = [0u8; 3];
        ring.consume_into(&mut skip);
        ring.write_slice(b"efgh");

        assert_eq!(ring.consume_block(), b"def");
        assert_eq!(ring.consume_block(), b"gh");
        assert_eq!(ring.consume_block(), b"");
        assert!(ring.cursors.is_empty());
    }

    #[test]
    fn zero_copy_block_of_full_ring_from_slot_zero() {
        let mut ring = empty::<4>();
        ring.write_slice(b"wxyz");

        assert_eq!(ring.consume_block(), b"wxyz");
        assert!(!ring.cursors.is_full());
        assert!(ring.cursors.is_empty());
    }

    #[test]
    fn partial_copy_advances_only_what_fit() {
        let mut ring = empty::<8>();
        ring.write_slice(b"abcdef");
        let mut out = [0u8; 4];

        assert_eq!(ring.consume_into(&mut out), 4);
        assert_eq!(&out, b"abcd");
        assert_eq!(ring.cursors.len(8), 2);
    }

    #[test]
    fn clear_resets_and_realigns() {
        let mut ring = empty::<4>();
        ring.write_slice(b"abcdef");
        ring.clear();

        assert!(ring.cursors.is_empty());
        assert!(!ring.cursors.is_full());
        assert_eq!(ring.cursors.head(), 0);
        assert_eq!(ring.try_consume(), None);
        assert_terminated(&ring);
    }

    #[test]
    fn clear_if_empty_only_resets_drained_ring() {
        let mut ring = empty::<4>();
        ring.write_slice(b"abc");
        assert!(!ring.clear_if_empty());
        assert_eq!(ring.cursors.len(4), 3);

        let mut out = [0u8; 3];
        ring.consume_into(&mut out);
        assert_eq!(ring.cursors.tail(), 3);
        assert!(ring.clear_if_empty());
        assert_eq!(ring.cursors.tail(), 0);
        assert_eq!(ring.cursors.head(), 0);
    }

    #[test]
    fn write_cancels_a_latched_clear() {
        let mut ring = empty::<4>();
        ring.write(1);
        assert!(!ring.clear_if_empty());
        assert!(ring.pending_clear);

        ring.write(2);
        assert!(!ring.pending_clear);
    }
}
