//! Ping-pong DMA engine for SAC playback and capture.
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`BufferDescriptor`] | Caller-owned circular buffer: addresses, period, loop flag |
//! | [`SacDma`] | Per-direction state machine, slot A/B alternation, completion handling |
//! | [`SharedSacDma`] | Critical-section wrapper for use from a `static` and the ISR |
//! | [`DmaIrq`] | SA1111 audio DMA interrupt numbers |

mod buffer;
mod engine;
mod shared;

pub use buffer::{BufferDescriptor, DmaAddress};
pub use engine::{ChannelState, DmaIrq, EngineState, PeriodCallback, SacDma, Transfer, TransferState};
pub use shared::SharedSacDma;

pub use crate::sac::{Direction, Slot};
