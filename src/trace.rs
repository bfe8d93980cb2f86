//! Diagnostics routed to `tracing` when the `tracing` feature is enabled.
//! Without it these compile to nothing.

#[inline]
pub(crate) fn overwrote(dropped: usize, capacity: usize) {
    #[cfg(feature = "tracing")]
    if dropped > 0 {
        tracing::trace!(dropped, capacity, "write overwrote unread elements");
    }
    #[cfg(not(feature = "tracing"))]
    let _ = (dropped, capacity);
}

#[inline]
pub(crate) fn cleared(capacity: usize) {
    #[cfg(feature = "tracing")]
    tracing::debug!(capacity, "ring cleared");
    #[cfg(not(feature = "tracing"))]
    let _ = capacity;
}

#[inline]
pub(crate) fn deferred_clear(applied: bool) {
    #[cfg(feature = "tracing")]
    if applied {
        tracing::debug!("deferred clear applied");
    } else {
        tracing::trace!("deferred clear skipped, ring not empty");
    }
    #[cfg(not(feature = "tracing"))]
    let _ = applied;
}
