//! # jornada-audio
//!
//! A `no_std` driver for the audio path of the HP Jornada 720: the SA1111
//! Serial Audio Controller (SAC), its double-buffered DMA engine and the
//! Philips UDA1344 codec on the SA1111 L3 bus.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Registers | [`sac::registers`] | Register names, offsets and bitfields |
//! | Bus | [`sac`] | [`RegisterAccess`](sac::RegisterAccess), bounded retry and polling, SAC setup, L3 |
//! | DMA | [`dma`] | Ping-pong engine, buffer descriptors, ISR sharing |
//! | Codec | [`codec`] | UDA1344 driver (feature-gated) |
//! | Trait | [`control`] | `AudioControl` for codec-style devices |
//! | Config | [`config`] | Retry policy, polling budgets, timings |
//!
//! ## Quick start
//!
//! ```ignore
//! use jornada_audio::config::SacConfig;
//! use jornada_audio::dma::{BufferDescriptor, SacDma, TransferState};
//! use jornada_audio::sac::{Mmio, Sac};
//!
//! let mut sac = Sac::new(unsafe { Mmio::new(SA1111_BASE) }, delay, SacConfig::default());
//! sac.init()?;
//! sac.set_sample_rate(44_100)?;
//!
//! let mut dma = SacDma::new(unsafe { Mmio::new(SA1111_BASE) }, delay2, SacConfig::default());
//! dma.reset_all()?;
//! dma.start_playback(
//!     BufferDescriptor::new(buf_phys, 16384, 4096).with_loop(true),
//!     |direction, buffer, state| { /* refill the period behind buffer.current_pointer() */ },
//! )?;
//!
//! // SA1111 audio DMA interrupt handler:
//! dma.on_irq(irq - SA1111_IRQ_BASE)?;
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `uda1344` | yes | UDA1344 codec driver |
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`] facade; no logger is installed here.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod constants;
pub mod control;
pub mod dma;
pub mod error;
pub mod sac;

#[cfg(feature = "uda1344")]
pub mod codec;

#[cfg(test)]
mod mocks;

pub use error::Error;
