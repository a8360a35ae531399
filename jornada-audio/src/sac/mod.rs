//! SA1111 Serial Audio Controller: register access, clocking and L3 bus.
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`RegisterAccess`] | Platform-provided raw register reads/writes |
//! | [`Mmio`] | Volatile memory-mapped implementation of [`RegisterAccess`] |
//! | [`RegisterBus`] | Bounded retry + bounded polling over a [`RegisterAccess`] |
//! | [`registers`] | Symbolic register names and bitfield types |
//! | [`Sac`] | Controller setup, sample rate, L3 byte send |

pub mod registers;
mod bus;
mod controller;

pub use bus::{Mmio, RegisterAccess, RegisterBus};
pub use controller::{clock_divider, exact_clock_divider, snap_sample_rate, L3Bus, Sac};
pub use registers::{Direction, Register, Slot};
