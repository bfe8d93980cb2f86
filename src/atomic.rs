//! Atomics used by the rings: `portable_atomic` on targets that need it,
//! `core::sync::atomic` everywhere else.

#[cfg(not(feature = "portable-atomic"))]
pub(crate) use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
#[cfg(feature = "portable-atomic")]
pub(crate) use portable_atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
