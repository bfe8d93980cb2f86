//! Head/tail cursor arithmetic.
//!
//! The whole observable state of a ring is two indices modulo the capacity and
//! a `full` flag that tells "holds `N` elements" apart from "holds nothing"
//! when `head == tail`. Every transition here is a pure function so both
//! disciplines share one set of index rules.

/// Snapshot of a ring's cursors.
///
/// `head` is the next write position, `tail` the oldest unread element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cursors {
    head: u16,
    tail: u16,
    full: bool,
}

impl Cursors {
    /// Cursors of an empty ring, realigned to the start of storage.
    pub const EMPTY: Self = Self {
        head: 0,
        tail: 0,
        full: false,
    };

    /// Index of the next write position.
    #[inline]
    pub const fn head(self) -> usize {
        self.head as usize
    }

    /// Index of the oldest unread element.
    #[inline]
    pub const fn tail(self) -> usize {
        self.tail as usize
    }

    #[inline]
    pub const fn is_full(self) -> bool {
        self.full
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        !self.full && self.head == self.tail
    }

    /// Number of unread elements for a ring of capacity `cap`.
    #[inline]
    pub const fn len(self, cap: usize) -> usize {
        if self.full {
            cap
        } else {
            (self.head as usize + cap - self.tail as usize) % cap
        }
    }

    /// Unread elements stored contiguously from `tail`, up to `head` or the
    /// physical end of storage, whichever comes first.
    #[inline]
    pub(crate) const fn contiguous(self, cap: usize) -> usize {
        if self.is_empty() {
            0
        } else if self.tail < self.head {
            (self.head - self.tail) as usize
        } else {
            cap - self.tail as usize
        }
    }

    /// Cursors after `count` elements were written at `head`, one after
    /// another, and how many unread elements that overwrote.
    pub(crate) const fn pushed(self, count: usize, cap: usize) -> (Self, usize) {
        if count == 0 {
            return (self, 0);
        }
        let total = self.len(cap) + count;
        let head = ((self.head as usize + count % cap) % cap) as u16;
        if total >= cap {
            let next = Self {
                head,
                tail: head,
                full: true,
            };
            (next, total - cap)
        } else {
            let next = Self {
                head,
                tail: self.tail,
                full: false,
            };
            (next, 0)
        }
    }

    /// Cursors after the oldest element of a full ring was given up so the
    /// slot at `head` may be rewritten.
    #[inline]
    pub(crate) const fn dropped_oldest(self, cap: usize) -> Self {
        debug_assert!(self.full);
        Self {
            head: self.head,
            tail: ((self.tail as usize + 1) % cap) as u16,
            full: false,
        }
    }

    /// Cursors after `count` elements were consumed from `tail`.
    #[inline]
    pub(crate) const fn consumed(self, count: usize, cap: usize) -> Self {
        debug_assert!(count <= self.len(cap));
        if count == 0 {
            return self;
        }
        Self {
            head: self.head,
            tail: ((self.tail as usize + count) % cap) as u16,
            full: false,
        }
    }

    /// Packs the cursors into one word: `head` in the high half, the unread
    /// length in the low half. The length (`0..=cap`) fits 16 bits for every
    /// allowed capacity, which `full` alone would not.
    #[inline]
    pub(crate) const fn pack(self, cap: usize) -> u32 {
        ((self.head as u32) << 16) | self.len(cap) as u32
    }

    #[inline]
    pub(crate) const fn unpack(word: u32, cap: usize) -> Self {
        let head = (word >> 16) as usize;
        let len = (word & 0xFFFF) as usize;
        Self {
            head: head as u16,
            tail: ((head + cap - len) % cap) as u16,
            full: len == cap,
        }
    }
}
