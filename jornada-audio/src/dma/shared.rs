//! Sharing one [`SacDma`] between thread context and the completion interrupt.
//!
//! Every access runs inside a critical section, so the interrupt handler and
//! control calls (`start`, `stop`) never observe a half-updated channel.
//!
//! ```ignore
//! static DMA: SharedSacDma<Mmio, Delay> = SharedSacDma::new();
//!
//! DMA.install(SacDma::new(regs, delay, SacConfig::default()));
//! DMA.lock(|dma| dma.start_playback(buffer, period_done));
//!
//! fn sa1111_audio_irq(irq: u32) {
//!     let _ = DMA.on_irq(irq);
//! }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;

use super::engine::{SacDma, TransferState};
use crate::error::Error;
use crate::sac::{Direction, RegisterAccess, Slot};

/// A [`SacDma`] behind a critical-section mutex, usable from a `static`.
pub struct SharedSacDma<R, D> {
    inner: Mutex<RefCell<Option<SacDma<R, D>>>>,
}

impl<R, D> SharedSacDma<R, D> {
    /// An empty slot; [`install`](Self::install) an engine before use.
    pub const fn new() -> Self {
        SharedSacDma {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Put `dma` in place, returning the engine it replaces.
    pub fn install(&self, dma: SacDma<R, D>) -> Option<SacDma<R, D>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(dma))
    }

    /// Remove the engine.
    pub fn take(&self) -> Option<SacDma<R, D>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }

    /// Run `f` on the engine with interrupts masked.
    ///
    /// Returns `None` if no engine is installed.
    pub fn lock<T>(&self, f: impl FnOnce(&mut SacDma<R, D>) -> T) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).as_mut().map(f))
    }
}

impl<R, D> SharedSacDma<R, D>
where
    R: RegisterAccess,
    D: DelayNs,
{
    /// Interrupt entry point, see [`SacDma::on_irq`].
    pub fn on_irq(&self, irq: u32) -> Result<Option<TransferState>, Error> {
        match self.lock(|dma| dma.on_irq(irq)) {
            Some(result) => result,
            None => {
                log::warn!("sacdma: irq {} with no engine installed", irq);
                Ok(None)
            }
        }
    }

    /// Interrupt entry point, see [`SacDma::on_slot_complete`].
    pub fn on_slot_complete(&self, direction: Direction, slot: Slot) -> Option<TransferState> {
        self.lock(|dma| dma.on_slot_complete(direction, slot)).flatten()
    }
}

impl<R, D> Default for SharedSacDma<R, D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SacConfig;
    use crate::dma::{BufferDescriptor, DmaIrq, EngineState};
    use crate::mocks::{MockDelay, MockRegs};

    fn nop(_: Direction, _: &BufferDescriptor, _: TransferState) {}

    #[test]
    fn empty_slot_ignores_interrupts() {
        let shared: SharedSacDma<MockRegs, MockDelay> = SharedSacDma::new();
        assert_eq!(shared.on_irq(DmaIrq::AUDXMTDMADONEA), Ok(None));
        assert_eq!(shared.on_slot_complete(Direction::Playback, Slot::A), None);
        assert!(shared.lock(|_| ()).is_none());
    }

    #[test]
    fn control_and_interrupt_share_one_engine() {
        let shared = SharedSacDma::new();
        assert!(shared
            .install(SacDma::new(MockRegs::new(), MockDelay::new(), SacConfig::default()))
            .is_none());

        let started = shared.lock(|dma| dma.start_playback(BufferDescriptor::new(0xC000_0000, 8192, 4096), nop));
        assert_eq!(started, Some(Ok(())));

        shared.lock(|dma| dma.registers_mut().complete(Direction::Playback, Slot::A));
        assert_eq!(shared.on_irq(DmaIrq::AUDXMTDMADONEA), Ok(Some(TransferState::Running)));

        let offset = shared.lock(|dma| dma.channel(Direction::Playback).buffer().map(|b| b.offset()));
        assert_eq!(offset, Some(Some(4096)));

        let dma = shared.take().unwrap();
        assert_eq!(dma.state(Direction::Playback), EngineState::Running);
        assert!(shared.take().is_none());
    }

    #[test]
    fn unknown_irq_is_unsupported() {
        let shared = SharedSacDma::new();
        shared.install(SacDma::new(MockRegs::new(), MockDelay::new(), SacConfig::default()));
        assert_eq!(shared.on_irq(12), Err(Error::Unsupported));
    }
}
