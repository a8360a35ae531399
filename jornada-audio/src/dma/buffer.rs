//! Buffer descriptor handed to the DMA engine.

use crate::constants::{MAX_DMA_BLOCK_SIZE, MIN_DMA_BLOCK_SIZE};
use crate::error::Error;

/// Bus address as seen by the SA1111 DMA controller.
pub type DmaAddress = u32;

/// A circular audio buffer in DMA-visible memory.
///
/// The caller owns the memory behind the addresses. The engine takes the
/// descriptor by value in `start` and hands it back from `stop`; in between,
/// only the completion handler updates `current_pointer` and `loop_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDescriptor {
    start_address: DmaAddress,
    current_pointer: DmaAddress,
    size: u32,
    period_size: u32,
    looping: bool,
    loop_count: u32,
}

impl BufferDescriptor {
    /// Describe `size` bytes at `start_address`, transferred `period_size` bytes at a time.
    ///
    /// Playback starts at `start_address` and does not loop.
    pub const fn new(start_address: DmaAddress, size: u32, period_size: u32) -> Self {
        BufferDescriptor {
            start_address,
            current_pointer: start_address,
            size,
            period_size,
            looping: false,
            loop_count: 0,
        }
    }

    /// Restart from `start_address` after the end of the buffer.
    pub const fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Begin at `pointer` instead of `start_address`.
    pub const fn with_current_pointer(mut self, pointer: DmaAddress) -> Self {
        self.current_pointer = pointer;
        self
    }

    pub const fn start_address(&self) -> DmaAddress {
        self.start_address
    }

    pub const fn current_pointer(&self) -> DmaAddress {
        self.current_pointer
    }

    pub const fn size(&self) -> u32 {
        self.size
    }

    pub const fn period_size(&self) -> u32 {
        self.period_size
    }

    pub const fn looping(&self) -> bool {
        self.looping
    }

    /// Number of times playback wrapped back to `start_address`.
    pub const fn loop_count(&self) -> u32 {
        self.loop_count
    }

    /// One past the last byte of the buffer.
    pub const fn end_address(&self) -> DmaAddress {
        self.start_address.wrapping_add(self.size)
    }

    /// Byte offset of `current_pointer` from `start_address`.
    pub const fn offset(&self) -> u32 {
        self.current_pointer.wrapping_sub(self.start_address)
    }

    /// Bytes left between `current_pointer` and the end of the buffer.
    pub const fn remaining(&self) -> u32 {
        self.size.saturating_sub(self.offset())
    }

    /// Length of the transfer starting at `current_pointer`: one period,
    /// clamped to what is left of the buffer.
    pub fn next_transfer_len(&self) -> u32 {
        self.period_size.min(self.remaining())
    }

    /// Whether `current_pointer` lies inside `[start_address, end_address)`.
    pub const fn pointer_in_bounds(&self) -> bool {
        self.current_pointer >= self.start_address && self.offset() < self.size
    }

    /// Check the descriptor before playback.
    ///
    /// Addresses must be non-null, the buffer non-empty and inside the 32-bit
    /// bus space, the period within the schedulable range, and the pointer
    /// inside the buffer on a period boundary.
    pub fn validate(&self) -> Result<(), Error> {
        if self.start_address == 0 || self.current_pointer == 0 {
            return Err(Error::InvalidArgument);
        }
        if self.size == 0 {
            return Err(Error::InvalidArgument);
        }
        if !(MIN_DMA_BLOCK_SIZE..=MAX_DMA_BLOCK_SIZE).contains(&self.period_size) {
            return Err(Error::InvalidArgument);
        }
        if self.start_address.checked_add(self.size).is_none() {
            return Err(Error::InvalidArgument);
        }
        if !self.pointer_in_bounds() {
            return Err(Error::InvalidArgument);
        }
        // Periods are armed on a grid anchored at start_address.
        if self.offset() % self.period_size != 0 {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }

    /// Whether the fields are still usable from interrupt context.
    pub(crate) fn is_sane(&self) -> bool {
        self.start_address != 0 && self.current_pointer != 0 && self.size != 0 && self.period_size != 0
    }

    /// Advance past one completed period, stopping at the end of the buffer.
    ///
    /// Returns `true` while the pointer is still inside the buffer.
    pub(crate) fn advance(&mut self) -> bool {
        let step = self.period_size.min(self.remaining());
        self.current_pointer = self.current_pointer.wrapping_add(step);
        self.offset() < self.size
    }

    /// Wrap back to `start_address` and count the loop.
    pub(crate) fn rewind(&mut self) {
        self.current_pointer = self.start_address;
        self.loop_count = self.loop_count.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: DmaAddress = 0xC000_0000;

    #[test]
    fn new_starts_at_beginning() {
        let b = BufferDescriptor::new(BASE, 16384, 4096);
        assert_eq!(b.current_pointer(), BASE);
        assert_eq!(b.offset(), 0);
        assert_eq!(b.end_address(), BASE + 16384);
        assert!(!b.looping());
        assert_eq!(b.loop_count(), 0);
        assert!(b.validate().is_ok());
    }

    #[test]
    fn rejects_null_and_empty() {
        assert_eq!(BufferDescriptor::new(0, 4096, 1024).validate(), Err(Error::InvalidArgument));
        assert_eq!(BufferDescriptor::new(BASE, 0, 1024).validate(), Err(Error::InvalidArgument));
    }

    #[test]
    fn rejects_bad_period() {
        assert_eq!(BufferDescriptor::new(BASE, 16384, 0).validate(), Err(Error::InvalidArgument));
        assert_eq!(BufferDescriptor::new(BASE, 16384, 32).validate(), Err(Error::InvalidArgument));
        assert_eq!(BufferDescriptor::new(BASE, 16384, 8192).validate(), Err(Error::InvalidArgument));
        assert!(BufferDescriptor::new(BASE, 16384, 8176).validate().is_ok());
    }

    #[test]
    fn rejects_address_overflow() {
        let b = BufferDescriptor::new(0xFFFF_F000, 0x2000, 1024);
        assert_eq!(b.validate(), Err(Error::InvalidArgument));
    }

    #[test]
    fn rejects_pointer_outside_buffer() {
        let b = BufferDescriptor::new(BASE, 8192, 4096).with_current_pointer(BASE + 8192);
        assert_eq!(b.validate(), Err(Error::InvalidArgument));
        let b = BufferDescriptor::new(BASE, 8192, 4096).with_current_pointer(BASE - 4);
        assert_eq!(b.validate(), Err(Error::InvalidArgument));
    }

    #[test]
    fn rejects_pointer_off_period_grid() {
        let b = BufferDescriptor::new(BASE, 16384, 4096).with_loop(true).with_current_pointer(BASE + 100);
        assert_eq!(b.validate(), Err(Error::InvalidArgument));
        let b = BufferDescriptor::new(BASE, 10000, 4096).with_current_pointer(BASE + 8192);
        assert!(b.validate().is_ok());
        assert_eq!(b.next_transfer_len(), 1808);
    }

    #[test]
    fn transfer_len_clamps_final_period() {
        let mut b = BufferDescriptor::new(BASE, 10000, 4096);
        assert_eq!(b.next_transfer_len(), 4096);
        assert!(b.advance());
        assert!(b.advance());
        assert_eq!(b.offset(), 8192);
        assert_eq!(b.next_transfer_len(), 1808);
        assert!(!b.advance());
        assert_eq!(b.current_pointer(), b.end_address());
        assert_eq!(b.next_transfer_len(), 0);
    }

    #[test]
    fn rewind_counts_loops() {
        let mut b = BufferDescriptor::new(BASE, 8192, 4096).with_loop(true);
        b.advance();
        b.advance();
        b.rewind();
        assert_eq!(b.current_pointer(), BASE);
        assert_eq!(b.loop_count(), 1);
    }
}
