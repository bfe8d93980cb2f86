//! Element types the ring can store.
//!
//! Every element type names its own end-of-data sentinel instead of borrowing
//! `Default`, so the sentinel is a documented per-type constant that can be
//! evaluated in `const` context (which is what lets a ring live in a `static`).

/// A value that can be stored in a [`RingBuffer`](crate::RingBuffer).
///
/// `END` is the sentinel kept in the slot following the newest element and
/// returned by [`consume`](crate::RingBuffer::consume) on an empty ring. It is
/// also where [`write_terminated`](crate::RingBuffer::write_terminated) stops
/// scanning, so an `END`-valued payload element cannot travel through that
/// call; use [`write_slice`](crate::RingBuffer::write_slice) for such data.
pub trait Element: Copy + PartialEq + 'static {
    /// End-of-data sentinel.
    const END: Self;
}

/// Character-like elements that support line framing and formatted text.
pub trait Text: Element {
    /// Line terminator searched for by `consume_line`.
    const NEWLINE: Self;
}

macro_rules! zero_sentinel {
    ($($t:ty),* $(,)?) => {
        $(
            impl Element for $t {
                const END: Self = 0;
            }
        )*
    };
}

zero_sentinel!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl Element for char {
    const END: Self = '\0';
}

impl Text for u8 {
    const NEWLINE: Self = b'\n';
}

impl Text for char {
    const NEWLINE: Self = '\n';
}
