/// Smallest period the engine will schedule, in bytes.
pub const MIN_DMA_BLOCK_SIZE: u32 = 64;

/// Largest single SAC DMA transfer, in bytes (13-bit count, word aligned).
pub const MAX_DMA_BLOCK_SIZE: u32 = 8176;

/// SA1111 audio clock base used for the exact divider calculation, in Hz.
pub const AUDIO_CLK_BASE: u32 = 561_600;

/// Default transmit FIFO DMA request threshold (SACR0.TFTH).
pub const SAC_FIFO_TX_THRESHOLD: u8 = 0x06;

/// Default receive FIFO DMA request threshold (SACR0.RFTH).
pub const SAC_FIFO_RX_THRESHOLD: u8 = 0x06;

/// Hard ceiling on attempts for any acknowledged register handshake.
pub const MAX_RETRY_ATTEMPTS: u8 = 10;

/// Sample rates supported by the SA1111 clock divider table, ascending.
pub const SUPPORTED_SAMPLE_RATES: [u32; 7] = [8000, 11025, 16000, 22050, 32000, 44100, 48000];
