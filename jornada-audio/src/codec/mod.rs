//! Philips UDA1344 stereo codec, controlled over the SA1111 L3 bus.
//!
//! # Feature gate
//!
//! This module is available when the `uda1344` feature is enabled (on by default).

pub(crate) mod registers;
mod uda1344;

pub use uda1344::Uda1344;
