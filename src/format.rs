//! Formatted text writes.
//!
//! Text is rendered into a fixed stack scratch area first and then written as
//! one bulk write, so a message never reaches the ring half-formatted.

use core::fmt;

/// Largest formatted message, in bytes, that a single formatted write accepts.
///
/// Exceeding it panics rather than truncating the message.
pub const FORMAT_SCRATCH: usize = 600;

struct Scratch {
    buf: [u8; FORMAT_SCRATCH],
    len: usize,
    overflowed: bool,
}

impl fmt::Write for Scratch {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let Some(dest) = self.buf.get_mut(self.len..self.len + bytes.len()) else {
            self.overflowed = true;
            return Err(fmt::Error);
        };
        dest.copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }
}

/// Renders `args` and passes the bytes to `sink`.
///
/// # Panics
/// If the rendered text is longer than [`FORMAT_SCRATCH`], or if a formatting
/// trait implementation returns an error.
pub(crate) fn render(args: fmt::Arguments<'_>, sink: impl FnOnce(&[u8])) {
    if let Some(text) = args.as_str() {
        assert!(
            text.len() <= FORMAT_SCRATCH,
            "formatted write of {} bytes exceeds the {FORMAT_SCRATCH}-byte scratch area",
            text.len()
        );
        sink(text.as_bytes());
        return;
    }

    let mut scratch = Scratch {
        buf: [0; FORMAT_SCRATCH],
        len: 0,
        overflowed: false,
    };
    let result = fmt::write(&mut scratch, args);
    assert!(
        !scratch.overflowed,
        "formatted write exceeds the {FORMAT_SCRATCH}-byte scratch area"
    );
    if result.is_err() {
        panic!("a formatting trait implementation returned an error");
    }
    sink(&scratch.buf[..scratch.len]);
}
