//! Overwrite-on-full circular buffers for no-std firmware.
//!
//! # Highlights
//! - Fixed capacity, no allocation, `const` construction for `static`s.
//! - Writers never block and never fail: a full ring overwrites its oldest
//!   unread elements.
//! - Element, block (zero-copy or copying) and line-oriented consumption, with
//!   lines spliced across the physical wraparound.
//! - Two concurrency disciplines chosen by type: [`Locked`] (spin lock, any
//!   number of threads) and [`IrqSafe`] (lock-free, one interrupt-context
//!   producer and one main-context consumer).
//!
//! # Quick start
//! ```
//! use meshring::{IrqRing, RingBuffer};
//!
//! // Shared log sink, any thread may write.
//! static LOG: RingBuffer<u8, 256> = RingBuffer::new();
//! writeln!(LOG, "rx len={} rssi={}", 42, -97);
//!
//! let mut line = [0u8; 64];
//! let n = LOG.consume_line(&mut line);
//! assert_eq!(&line[..n], b"rx len=42 rssi=-97\n");
//!
//! // Serial capture filled from an interrupt handler.
//! static UART: IrqRing<u8, 128> = IrqRing::new();
//! let mut tx = UART.producer();
//! let mut rx = UART.consumer();
//! tx.write_slice(b"AT+OK\r\n");
//!
//! let mut chunk = [0u8; 32];
//! let n = rx.consume_block_into(&mut chunk);
//! assert_eq!(&chunk[..n], b"AT+OK\r\n");
//! ```
//!
//! # No-std
//! The crate is `#![no_std]`. Tests require `std`.
//!
//! # Safety and concurrency
//! An [`IrqSafe`] ring relies on exactly one producer and one consumer. The
//! handles enforce it: `producer()`/`consumer()` panic while another handle of
//! the same kind is alive, and their methods take `&mut self`. A [`Locked`]
//! ring must not be written from an interrupt handler that can preempt a
//! lock holder.
//!
//! # Semantics
//! - `head` is the next write slot, `tail` the oldest unread element; a
//!   `full` flag tells a full ring from an empty one when they meet.
//! - Consuming from an empty ring yields `T::END` (or `None`/`0` from the
//!   `try_`, block and line variants); check `is_empty()` when `T::END` is a
//!   legitimate payload.
//! - `clear_if_empty()` resets the ring only if no write raced with it.
//!
//! # Features
//! - `portable-atomic`, `portable-atomic-unsafe-assume-single-core`,
//!   `portable-atomic-critical-section`: atomics for targets without native
//!   compare-and-swap. [`IrqSafe`] rings use a 64-bit compare-and-swap, so
//!   32-bit microcontrollers without one (Cortex-M, RV32) need one of the last
//!   two.
//! - `tracing`: overwrite and clear diagnostics through `tracing`.
#![no_std]

mod atomic;
pub mod cursor;
pub mod discipline;
pub mod element;
mod format;
mod frame;
mod irq;
mod locked;
pub mod ring;
mod slots;
mod trace;


pub use cursor::Cursors;
pub use discipline::{Discipline, IrqSafe, Locked, Store};
pub use element::{Element, Text};
pub use format::FORMAT_SCRATCH;
pub use irq::IrqStore;
pub use locked::LockedStore;
pub use ring::{Consumer, IrqRing, Producer, RingBuffer};

#[cfg(test)]
#[macro_use]
extern crate std;
