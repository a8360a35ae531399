//! Double-buffered (ping-pong) DMA engine for the SAC.
//!
//! Each SAC DMA direction has two descriptor slots, A and B. The engine
//! arms one period at a time, strictly alternating slots by the parity of
//! an arm counter. Each completion interrupt advances the buffer pointer,
//! arms the next period on the other slot and notifies the upstream layer.
//!
//! ```text
//!   start ─► arm A [0..p)       irq A ─► arm B [p..2p)      irq B ─► arm A [2p..3p) ...
//!                               callback(Running)           callback(Running)
//!
//!   end of buffer, looping:     pointer ← start, loop_count += 1, arm, callback(Looped)
//!   end of buffer, one-shot:    nothing armed, channel stays Running
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut dma = SacDma::new(regs, delay, SacConfig::default());
//! dma.reset_all()?;
//! dma.start_playback(BufferDescriptor::new(addr, 16384, 4096).with_loop(true), period_done)?;
//!
//! // SA1111 audio DMA interrupt:
//! dma.on_irq(irq - irq_base)?;
//!
//! let buffer = dma.stop_playback();
//! ```

use embedded_hal::delay::DelayNs;

use super::buffer::{BufferDescriptor, DmaAddress};
use crate::config::SacConfig;
use crate::error::Error;
use crate::sac::registers::{DmaControl, Register, Sacr0};
use crate::sac::{Direction, RegisterAccess, RegisterBus, Slot};

/// Status passed to the period callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// A period completed and the next one was armed.
    Running,
    /// The buffer wrapped to its start and the first period was re-armed.
    Looped,
}

/// Called from the completion handler once per completed period, with the
/// direction that completed.
///
/// Runs in interrupt context with the engine locked: it must return quickly
/// and must not call back into the engine.
pub type PeriodCallback = fn(Direction, &BufferDescriptor, TransferState);

/// Lifecycle of a DMA channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing attached.
    Idle,
    /// Buffer attached, first transfer being programmed.
    Armed,
    /// Transfers are re-armed on completion.
    Running,
    /// Waiting for the in-flight transfer to drain.
    Stopping,
}

/// A transfer programmed into one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub slot: Slot,
    pub address: DmaAddress,
    pub len: u32,
}

/// A SAC DMA completion interrupt source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaIrq {
    pub direction: Direction,
    pub slot: Slot,
}

impl DmaIrq {
    /// Transmit slot A done (relative to the SA1111 IRQ base).
    pub const AUDXMTDMADONEA: u32 = 32;
    /// Receive slot A done.
    pub const AUDRCVDMADONEA: u32 = 33;
    /// Transmit slot B done.
    pub const AUDXMTDMADONEB: u32 = 34;
    /// Receive slot B done.
    pub const AUDRCVDMADONEB: u32 = 35;

    /// Decode an SA1111-relative interrupt number.
    pub fn from_sa1111_irq(irq: u32) -> Result<Self, Error> {
        let (direction, slot) = match irq {
            Self::AUDXMTDMADONEA => (Direction::Playback, Slot::A),
            Self::AUDRCVDMADONEA => (Direction::Capture, Slot::A),
            Self::AUDXMTDMADONEB => (Direction::Playback, Slot::B),
            Self::AUDRCVDMADONEB => (Direction::Capture, Slot::B),
            _ => return Err(Error::Unsupported),
        };
        Ok(DmaIrq { direction, slot })
    }

    /// SA1111-relative interrupt number of this source.
    pub const fn sa1111_irq(self) -> u32 {
        let slot_ofs = match self.slot {
            Slot::A => 0,
            Slot::B => 2,
        };
        Self::AUDXMTDMADONEA + slot_ofs + self.direction as u32
    }
}

/// Per-direction engine state.
#[derive(Debug)]
pub struct ChannelState {
    direction: Direction,
    state: EngineState,
    running: bool,
    arm_count: u32,
    buffer: Option<BufferDescriptor>,
    callback: Option<PeriodCallback>,
    in_flight: Option<Transfer>,
}

impl ChannelState {
    const fn new(direction: Direction) -> Self {
        ChannelState {
            direction,
            state: EngineState::Idle,
            running: false,
            arm_count: 0,
            buffer: None,
            callback: None,
            in_flight: None,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Whether completions re-arm the next period.
    pub fn running(&self) -> bool {
        self.running
    }

    /// Total arm operations so far; its parity selects the next slot.
    pub fn arm_count(&self) -> u32 {
        self.arm_count
    }

    /// Slot the next arm operation will use.
    pub fn next_slot(&self) -> Slot {
        Slot::from_parity(self.arm_count)
    }

    /// The attached buffer, if any.
    pub fn buffer(&self) -> Option<&BufferDescriptor> {
        self.buffer.as_ref()
    }

    /// The transfer programmed but not yet completed, if any.
    pub fn in_flight(&self) -> Option<Transfer> {
        self.in_flight
    }

    fn detach(&mut self) -> Option<BufferDescriptor> {
        self.state = EngineState::Idle;
        self.running = false;
        self.callback = None;
        self.in_flight = None;
        self.buffer.take()
    }
}

/// Ping-pong DMA engine for both SAC directions.
pub struct SacDma<R, D> {
    bus: RegisterBus<R, D>,
    config: SacConfig,
    channels: [ChannelState; 2],
}

impl<R, D> SacDma<R, D>
where
    R: RegisterAccess,
    D: DelayNs,
{
    /// Create an engine with both channels idle. No hardware access happens here.
    pub fn new(regs: R, delay: D, config: SacConfig) -> Self {
        SacDma {
            bus: RegisterBus::new(regs, delay, config.retry),
            config,
            channels: [
                ChannelState::new(Direction::Playback),
                ChannelState::new(Direction::Capture),
            ],
        }
    }

    /// Return a direction to its power-on state.
    ///
    /// Stops the channel if needed, zeroes its control, address and count
    /// registers and programs its FIFO threshold. The arm counter keeps its
    /// parity so slot alternation carries on across resets.
    pub fn reset(&mut self, direction: Direction) -> Result<(), Error> {
        self.stop(direction);

        self.bus.write(Register::DmaControl(direction), 0)?;
        for slot in [Slot::A, Slot::B] {
            self.bus.write(Register::DmaAddress(direction, slot), 0)?;
            self.bus.write(Register::DmaCount(direction, slot), 0)?;
        }

        let tx = self.config.tx_fifo_threshold;
        let rx = self.config.rx_fifo_threshold;
        self.bus.modify(Register::Sacr0, |v| match direction {
            Direction::Playback => Sacr0(v).with_tx_threshold(tx).0,
            Direction::Capture => Sacr0(v).with_rx_threshold(rx).0,
        })?;

        let ch = self.channel_mut(direction);
        ch.arm_count %= 2;
        log::debug!("sacdma: {:?} channel reset", direction);
        Ok(())
    }

    /// Reset both directions.
    pub fn reset_all(&mut self) -> Result<(), Error> {
        for direction in Direction::ALL {
            self.reset(direction)?;
        }
        Ok(())
    }

    /// Attach `buffer` to `direction` and arm its first period.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if the descriptor fails validation.
    /// - [`Error::AlreadyRunning`] if the channel is not idle. Nothing changes.
    /// - [`Error::DeviceBusy`] if programming the first transfer failed; the
    ///   channel is left idle with nothing attached.
    pub fn start(
        &mut self,
        direction: Direction,
        buffer: BufferDescriptor,
        callback: PeriodCallback,
    ) -> Result<(), Error> {
        if let Err(e) = buffer.validate() {
            log::warn!("sacdma: {:?} start rejected, invalid buffer {:?}", direction, buffer);
            return Err(e);
        }
        let ch = self.channel_mut(direction);
        if ch.state != EngineState::Idle {
            log::warn!("sacdma: {:?} start rejected, channel already running", direction);
            return Err(Error::AlreadyRunning);
        }

        ch.buffer = Some(buffer);
        ch.callback = Some(callback);
        ch.running = true;
        ch.state = EngineState::Armed;

        if let Err(e) = self.arm(direction) {
            self.channel_mut(direction).detach();
            log::warn!("sacdma: {:?} first transfer could not be armed: {}", direction, e);
            return Err(e);
        }
        self.channel_mut(direction).state = EngineState::Running;
        log::debug!("sacdma: {:?} started", direction);
        Ok(())
    }

    /// [`start`](Self::start) on the playback direction.
    pub fn start_playback(&mut self, buffer: BufferDescriptor, callback: PeriodCallback) -> Result<(), Error> {
        self.start(Direction::Playback, buffer, callback)
    }

    /// [`start`](Self::start) on the capture direction.
    pub fn start_capture(&mut self, buffer: BufferDescriptor, callback: PeriodCallback) -> Result<(), Error> {
        self.start(Direction::Capture, buffer, callback)
    }

    /// Stop `direction` and detach its buffer.
    ///
    /// No further period is armed. The hardware cannot abort a running
    /// transfer, so this waits for the in-flight one within the configured
    /// polling budget and returns to idle whether or not it drained.
    /// Returns the detached buffer, or `None` if the channel was already idle.
    pub fn stop(&mut self, direction: Direction) -> Option<BufferDescriptor> {
        let budget = self.config.dma_stop;
        let ch = self.channel_mut(direction);
        if ch.state == EngineState::Idle {
            return None;
        }
        ch.running = false;
        ch.state = EngineState::Stopping;

        if let Some(t) = ch.in_flight {
            let drained = self
                .bus
                .poll_until(Register::DmaControl(direction), budget, |v| DmaControl(v).done(t.slot));
            match drained {
                Ok(true) => {}
                Ok(false) => log::debug!("sacdma: {:?} stop: slot {:?} still draining", direction, t.slot),
                Err(e) => log::warn!("sacdma: {:?} stop: status unreadable: {}", direction, e),
            }
        }

        log::debug!("sacdma: {:?} stopped", direction);
        self.channel_mut(direction).detach()
    }

    /// [`stop`](Self::stop) on the playback direction.
    pub fn stop_playback(&mut self) -> Option<BufferDescriptor> {
        self.stop(Direction::Playback)
    }

    /// [`stop`](Self::stop) on the capture direction.
    pub fn stop_capture(&mut self) -> Option<BufferDescriptor> {
        self.stop(Direction::Capture)
    }

    /// Completion handler for one slot of one direction.
    ///
    /// Returns the status reported to the callback, or `None` if nothing was
    /// armed: the channel is stopped, the buffer ended without looping, or the
    /// completion was an anomaly (no matching transfer, invalid buffer state,
    /// re-arm failure), which is logged and otherwise ignored.
    pub fn on_slot_complete(&mut self, direction: Direction, slot: Slot) -> Option<TransferState> {
        let ch = self.channel_mut(direction);
        match ch.in_flight {
            Some(t) if t.slot == slot => ch.in_flight = None,
            Some(t) => {
                log::warn!("sacdma: {:?} completion on slot {:?}, expected {:?}", direction, slot, t.slot);
                return None;
            }
            None => {
                if ch.state != EngineState::Idle {
                    log::warn!("sacdma: {:?} completion on slot {:?} with nothing in flight", direction, slot);
                }
                return None;
            }
        }

        let running = ch.running;
        let Some(buffer) = ch.buffer.as_mut() else {
            log::warn!("sacdma: {:?} completion without a buffer", direction);
            return None;
        };
        if !buffer.is_sane() {
            log::warn!("sacdma: {:?} completion with invalid buffer {:?}", direction, buffer);
            return None;
        }

        let inside = buffer.advance();
        if !running {
            return None;
        }

        let status = if inside {
            TransferState::Running
        } else if buffer.looping() {
            buffer.rewind();
            TransferState::Looped
        } else {
            // One-shot buffer played out; left Running with nothing armed.
            log::debug!("sacdma: {:?} end of buffer", direction);
            return None;
        };

        if let Err(e) = self.arm(direction) {
            log::warn!("sacdma: {:?} re-arm failed: {}", direction, e);
            return None;
        }

        let ch = self.channel(direction);
        if let (Some(callback), Some(buffer)) = (ch.callback, ch.buffer.as_ref()) {
            callback(direction, buffer, status);
        }
        Some(status)
    }

    /// Completion handler keyed by SA1111-relative interrupt number.
    pub fn on_irq(&mut self, irq: u32) -> Result<Option<TransferState>, Error> {
        let src = DmaIrq::from_sa1111_irq(irq)?;
        Ok(self.on_slot_complete(src.direction, src.slot))
    }

    /// Program the next period of `direction` into the slot chosen by parity.
    fn arm(&mut self, direction: Direction) -> Result<Transfer, Error> {
        let ch = self.channel(direction);
        let Some(buffer) = ch.buffer.as_ref() else {
            return Err(Error::InvalidArgument);
        };
        let slot = ch.next_slot();
        let transfer = Transfer {
            slot,
            address: buffer.current_pointer(),
            len: buffer.next_transfer_len(),
        };

        let cs = DmaControl(self.bus.read(Register::DmaControl(direction))?);
        self.bus.write(Register::DmaAddress(direction, slot), transfer.address)?;
        self.bus.write(Register::DmaCount(direction, slot), transfer.len)?;
        // Only the armed slot's start bit is written as 1.
        let cs = cs.with_start(slot.opposite(), false).armed(slot);
        self.bus.write(Register::DmaControl(direction), cs.0)?;

        let ch = self.channel_mut(direction);
        ch.arm_count = ch.arm_count.wrapping_add(1);
        ch.in_flight = Some(transfer);
        log::trace!(
            "sacdma: {:?} armed slot {:?} at {:#010x} len {}",
            direction,
            slot,
            transfer.address,
            transfer.len
        );
        Ok(transfer)
    }

    /// Lifecycle state of `direction`.
    pub fn state(&self, direction: Direction) -> EngineState {
        self.channel(direction).state
    }

    /// Full state of `direction`.
    pub fn channel(&self, direction: Direction) -> &ChannelState {
        &self.channels[direction.index()]
    }

    fn channel_mut(&mut self, direction: Direction) -> &mut ChannelState {
        &mut self.channels[direction.index()]
    }

    /// Shared access to the underlying register block.
    pub fn registers(&self) -> &R {
        self.bus.registers()
    }

    /// Exclusive access to the underlying register block.
    pub fn registers_mut(&mut self) -> &mut R {
        self.bus.registers_mut()
    }

    /// Release the register block and delay provider.
    pub fn release(self) -> (R, D) {
        self.bus.release()
    }
}
