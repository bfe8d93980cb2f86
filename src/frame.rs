//! Consumer-side copy algorithms shared by both disciplines.
//!
//! Both walk the unread region logically from `tail`, so a run that crosses
//! the physical end of storage is continued from slot 0 in the same pass.
//! They only read; the caller commits the returned count with
//! [`Cursors::consumed`].

use crate::cursor::Cursors;
use crate::element::{Element, Text};
use crate::slots::SlotRead;

/// Copies up to `dest.len()` unread elements into `dest`.
pub(crate) fn drain<T: Element>(
    c: Cursors,
    cap: usize,
    slots: &impl SlotRead<T>,
    dest: &mut [T],
) -> usize {
    let count = dest.len().min(c.len(cap));
    for (k, out) in dest[..count].iter_mut().enumerate() {
        *out = slots.read((c.tail() + k) % cap);
    }
    count
}

/// Copies one line, terminator included, and writes `T::END` after it.
///
/// At most `dest.len() - 1` elements are copied; a longer line is cut there
/// and its remainder is what the next call sees. Pending data without a
/// terminator is returned as a partial line. A `dest` shorter than 2 has no
/// room for an element and copies nothing, even with data pending.
pub(crate) fn line<T: Text>(
    c: Cursors,
    cap: usize,
    slots: &impl SlotRead<T>,
    dest: &mut [T],
) -> usize {
    let Some(room) = dest.len().checked_sub(1) else {
        return 0;
    };
    let limit = room.min(c.len(cap));

    let mut count = 0;
    while count < limit {
        let value = slots.read((c.tail() + count) % cap);
        dest[count] = value;
        count += 1;
        if value == T::NEWLINE {
            break;
        }
    }
    dest[count] = T::END;
    count
}

#[cfg(test)]
mod tests {
    use super::{drain, line};
    use crate::cursor::Cursors;
    use crate::slots::SlotRead;

    struct Raw<'a>(&'a [u8]);

    impl SlotRead<u8> for Raw<'_> {
        fn read(&self, idx: usize) -> u8 {
            self.0[idx]
        }
    }

    /// Cursors with `tail` at `tail` and `len` unread elements.
    fn at(tail: usize, len: usize, cap: usize) -> Cursors {
        let (c, _) = Cursors::EMPTY.pushed(tail, cap);
        let c = c.consumed(tail, cap);
        c.pushed(len, cap).0
    }

    #[test]
    fn line_stops_after_terminator() {
        let storage = *b"ab\ncd\n..";
        let mut out = [0xFFu8; 8];

        let n = line(at(0, 6, 8), 8, &Raw(&storage), &mut out);

        assert_eq!(n, 3);
        assert_eq!(&out[..4], b"ab\n\0");
    }

    #[test]
    fn line_terminator_on_last_physical_slot() {
        // unread: "xy\n" at 5..8, then "z" at 0
        let storage = *b"z....xy\n";
        let c = at(5, 4, 8);
        let mut out = [0xFFu8; 8];

        let n = line(c, 8, &Raw(&storage), &mut out);
        assert_eq!(&out[..n + 1], b"xy\n\0");

        let c = c.consumed(n, 8);
        assert_eq!(c.tail(), 0);
        let n = line(c, 8, &Raw(&storage), &mut out);
        assert_eq!(&out[..n + 1], b"z\0");
    }

    #[test]
    fn line_spanning_the_wrap_is_spliced() {
        let storage = *b"lo\n...hel";
        let c = at(6, 6, 9);
        let mut out = [0u8; 16];

        let n = line(c, 9, &Raw(&storage), &mut out);

        assert_eq!(&out[..n], b"hello\n");
        assert_eq!(out[n], 0);
    }

    #[test]
    fn long_line_is_truncated_to_room() {
        let storage = *b"0123456789";
        let c = at(0, 10, 10);
        let mut out = [0xFFu8; 5];

        let n = line(c, 10, &Raw(&storage), &mut out);

        assert_eq!(n, 4);
        assert_eq!(&out, b"0123\0");
    }

    #[test]
    fn empty_destination_copies_nothing() {
        let storage = *b"ab\n";
        let mut out: [u8; 0] = [];
        assert_eq!(line(at(0, 3, 3), 3, &Raw(&storage), &mut out), 0);
    }

    #[test]
    fn single_slot_destination_only_terminates() {
        let storage = *b"ab\n";
        let mut out = [0xFFu8; 1];
        assert_eq!(line(at(0, 3, 3), 3, &Raw(&storage), &mut out), 0);
        assert_eq!(out[0], 0);
    }

    #[test]
    fn nothing_pending_still_terminates_output() {
        let storage = *b"....";
        let mut out = [0xFFu8; 3];
        assert_eq!(line(Cursors::EMPTY, 4, &Raw(&storage), &mut out), 0);
        assert_eq!(out[0], 0);
    }

    #[test]
    fn drain_crosses_the_wrap() {
        let storage = *b"cd..ab";
        let c = at(4, 4, 6);
        let mut out = [0u8; 8];

        assert_eq!(drain(c, 6, &Raw(&storage), &mut out), 4);
        assert_eq!(&out[..4], b"abcd");

        let mut short = [0u8; 3];
        assert_eq!(drain(c, 6, &Raw(&storage), &mut short), 3);
        assert_eq!(&short, b"abc");
    }
}
