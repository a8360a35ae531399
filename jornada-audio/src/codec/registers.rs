//! UDA1344 L3 addresses and register bitfields.
//!
//! The chip is write-only. Each register is a single byte; the top bits of
//! a DATA0 byte select which of the four data registers it addresses.

// ── L3 addresses ───────────────────────────────────────────────────────────

/// Device address on the L3 bus.
pub const L3_DEVICE: u8 = 0x05;

/// DATA0 transfer mode (volume, tone, filters, power).
pub const L3_DATA: u8 = L3_DEVICE << 2;

/// STATUS transfer mode (system clock, data format).
pub const L3_STATUS: u8 = (L3_DEVICE << 2) | 2;

// ── STATUS ─────────────────────────────────────────────────────────────────

/// Status register.
/// - Bits 5:4 — SC (system clock: 0 = 512fs, 1 = 384fs, 2 = 256fs)
/// - Bits 3:1 — IF (input format: 0 = I2S, 4 = MSB justified, ...)
/// - Bit  0   — DC (DC filter)
pub const STAT0: u8 = 0x00;

pub const STAT0_SC_512FS: u8 = 0 << 4;
pub const STAT0_SC_256FS: u8 = 2 << 4;
pub const STAT0_IF_I2S: u8 = 0 << 1;

// ── DATA0 ──────────────────────────────────────────────────────────────────

/// Volume: attenuation in dB, 0 = full scale, 63 = quietest.
pub const DATA0_VOLUME: u8 = 0x00;
pub const DATA0_VOLUME_MASK: u8 = 0x3F;

/// Tone.
/// - Bits 5:2 — bass boost (0..=15)
/// - Bits 1:0 — treble (0..=3)
pub const DATA1_TONE: u8 = 0x40;

/// Filters and mute.
/// - Bits 4:3 — de-emphasis (0 = off, 1 = 32 kHz, 2 = 44.1 kHz, 3 = 48 kHz)
/// - Bit  2   — mute
/// - Bits 1:0 — DSP mode (0 = flat, 1 = min, 3 = max)
pub const DATA2_FILTERS: u8 = 0x80;

/// Power control.
/// - Bits 1:0 — 0 = off, 1 = DAC, 2 = ADC, 3 = both
pub const DATA3_POWER: u8 = 0xC0;

pub const POWER_OFF: u8 = 0;
pub const POWER_ON: u8 = 3;

// ── Ranges ─────────────────────────────────────────────────────────────────

pub const MIN_VOLUME_DB: i8 = -63;
pub const MAX_VOLUME_DB: i8 = 0;
pub const MAX_BASS: u8 = 15;
pub const MAX_TREBLE: u8 = 3;
pub const MAX_DSP: u8 = 3;
pub const MAX_DEEMPHASIS: u8 = 3;
