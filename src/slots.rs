//! Backing storage: `N` addressable slots followed by one sentinel slot.

use crate::element::Element;

/// Fixed storage for a ring of capacity `N`.
///
/// `end` sits physically right after `live[N - 1]` and always holds
/// `T::END`, so a run that reaches the physical end of storage is terminated
/// without touching `live[0]`.
#[repr(C)]
pub(crate) struct Slots<T: Element, const N: usize> {
    live: [T; N],
    end: T,
}

/// Read access to slot contents by index.
pub(crate) trait SlotRead<T> {
    fn read(&self, idx: usize) -> T;
}

impl<T: Element, const N: usize> Slots<T, N> {
    pub(crate) const INIT: Self = Self {
        live: [T::END; N],
        end: T::END,
    };

    #[inline]
    pub(crate) fn set(&mut self, idx: usize, value: T) {
        self.live[idx] = value;
    }

    #[inline]
    pub(crate) fn live(&self) -> &[T; N] {
        &self.live
    }

    #[inline]
    pub(crate) fn live_mut(&mut self) -> &mut [T; N] {
        &mut self.live
    }

    /// Pointer to live slot `idx` of the storage behind `this`, without
    /// creating a reference to the storage.
    ///
    /// # Safety
    /// `this` must point to a live `Slots` and `idx` must be below `N`.
    #[inline]
    pub(crate) unsafe fn slot_ptr(this: *mut Self, idx: usize) -> *mut T {
        debug_assert!(idx < N);
        unsafe { (&raw mut (*this).live).cast::<T>().add(idx) }
    }

    /// All `N + 1` physical slots, sentinel included.
    #[cfg(test)]
    pub(crate) fn physical(&self) -> &[T] {
        // SAFETY: `repr(C)` lays out `[T; N]` and then `T` with no padding
        // between them (the array size is a multiple of `T`'s alignment), and
        // the pointer is derived from the whole struct.
        unsafe { core::slice::from_raw_parts((self as *const Self).cast::<T>(), N + 1) }
    }
}

impl<T: Element, const N: usize> SlotRead<T> for Slots<T, N> {
    #[inline]
    fn read(&self, idx: usize) -> T {
        self.live[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::Slots;

    #[test]
    fn sentinel_slot_follows_last_live_slot() {
        let mut slots = Slots::<u8, 3>::INIT;
        slots.set(0, b'a');
        slots.set(2, b'c');

        assert_eq!(slots.physical(), &[b'a', 0, b'c', 0]);
    }
}
