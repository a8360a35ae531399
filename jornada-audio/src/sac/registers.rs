//! SA1111 Serial Audio Controller register map and bitfield types.
//!
//! Offsets are relative to the SA1111 chip base. The SAC block lives at
//! `0x0600`; the clock gating (`SKPCR`) and audio clock divider (`SKAUD`)
//! registers belong to the system controller block.
//!
//! Register values are 32-bit. Bit layouts follow the Intel SA1111
//! Developer's Manual, chapter 7.

use crate::error::Error;

// ── Offsets ────────────────────────────────────────────────────────────────

/// System controller: power/clock control.
const SKPCR: u32 = 0x0210;
/// System controller: audio clock divider.
const SKAUD: u32 = 0x0218;

/// Base of the SAC register block.
const SAC_BASE: u32 = 0x0600;

const SACR0: u32 = 0x00;
const SACR1: u32 = 0x04;
const SASR0: u32 = 0x0C;
const SASCR: u32 = 0x18;
const L3_CAR: u32 = 0x1C;
const L3_CDR: u32 = 0x20;

/// Transmit DMA control/status.
const SADTCS: u32 = 0x34;
/// Transmit DMA start address, slot A.
const SADTSA: u32 = 0x38;
/// Transmit DMA count, slot A.
const SADTCA: u32 = 0x3C;

/// Distance between the transmit and receive DMA register groups.
const DMA_REG_RX_OFS: u32 = 0x14;
/// Distance between slot A and slot B address/count registers.
const DMA_SLOT_B_OFS: u32 = 0x08;

// ── Direction / slot ───────────────────────────────────────────────────────

/// DMA direction of the SAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Memory → SAC transmit FIFO.
    Playback = 0,
    /// SAC receive FIFO → memory.
    Capture = 1,
}

impl Direction {
    /// Both directions, in hardware order.
    pub const ALL: [Direction; 2] = [Direction::Playback, Direction::Capture];

    /// Hardware index (0 = transmit, 1 = receive).
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Direction {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(Direction::Playback),
            1 => Ok(Direction::Capture),
            _ => Err(Error::Unsupported),
        }
    }
}

/// One of the two hardware descriptor sets of a DMA direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Slot A (selected on even arm counts).
    A,
    /// Slot B (selected on odd arm counts).
    B,
}

impl Slot {
    /// Slot selected by the given arm count.
    pub const fn from_parity(count: u32) -> Self {
        if count % 2 == 0 {
            Slot::A
        } else {
            Slot::B
        }
    }

    /// The other slot.
    pub const fn opposite(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

// ── Symbolic register names ────────────────────────────────────────────────

/// A named SA1111 register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// SAC global control (enable, reset, FIFO thresholds).
    Sacr0,
    /// SAC I2S/MSB-justified control (L3 enable, AC-link select).
    Sacr1,
    /// SAC status (FIFO flags, L3 handshake).
    Sasr0,
    /// SAC status clear.
    Sascr,
    /// L3 control bus address.
    L3Car,
    /// L3 control bus data.
    L3Cdr,
    /// DMA control/status for a direction.
    DmaControl(Direction),
    /// DMA start address for a direction and slot.
    DmaAddress(Direction, Slot),
    /// DMA byte count for a direction and slot.
    DmaCount(Direction, Slot),
    /// System controller power/clock control.
    Skpcr,
    /// System controller audio clock divider.
    Skaud,
}

impl Register {
    /// Byte offset from the SA1111 chip base.
    pub const fn offset(self) -> u32 {
        match self {
            Register::Sacr0 => SAC_BASE + SACR0,
            Register::Sacr1 => SAC_BASE + SACR1,
            Register::Sasr0 => SAC_BASE + SASR0,
            Register::Sascr => SAC_BASE + SASCR,
            Register::L3Car => SAC_BASE + L3_CAR,
            Register::L3Cdr => SAC_BASE + L3_CDR,
            Register::DmaControl(dir) => SAC_BASE + SADTCS + dma_group(dir),
            Register::DmaAddress(dir, slot) => SAC_BASE + SADTSA + dma_group(dir) + slot_ofs(slot),
            Register::DmaCount(dir, slot) => SAC_BASE + SADTCA + dma_group(dir) + slot_ofs(slot),
            Register::Skpcr => SKPCR,
            Register::Skaud => SKAUD,
        }
    }
}

const fn dma_group(dir: Direction) -> u32 {
    dir as u32 * DMA_REG_RX_OFS
}

const fn slot_ofs(slot: Slot) -> u32 {
    match slot {
        Slot::A => 0,
        Slot::B => DMA_SLOT_B_OFS,
    }
}

// ── Bitfield helpers ───────────────────────────────────────────────────────

macro_rules! bit_accessors {
    ($($(#[$doc:meta])* $get:ident / $with:ident = $bit:expr;)*) => {
        $(
            $(#[$doc])*
            pub const fn $get(self) -> bool {
                self.0 & (1 << $bit) != 0
            }

            $(#[$doc])*
            pub const fn $with(self, on: bool) -> Self {
                if on {
                    Self(self.0 | (1 << $bit))
                } else {
                    Self(self.0 & !(1 << $bit))
                }
            }
        )*
    };
}

// ── SADTCS / SADRCS ────────────────────────────────────────────────────────

/// DMA control/status register (`SADTCS` / `SADRCS`).
///
/// - Bit 0 — DEN (DMA enable)
/// - Bit 1 — DIE (DMA interrupt enable)
/// - Bit 2 — DBDA (slot A done, read-only)
/// - Bit 3 — DSTA (start slot A)
/// - Bit 4 — DBDB (slot B done, read-only)
/// - Bit 5 — DSTB (start slot B)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DmaControl(pub u32);

impl DmaControl {
    bit_accessors! {
        /// DEN: DMA enable.
        enabled / with_enabled = 0;
        /// DIE: DMA interrupt enable.
        interrupt_enabled / with_interrupt_enabled = 1;
        /// DBDA: slot A transfer done.
        done_a / with_done_a = 2;
        /// DSTA: slot A started.
        start_a / with_start_a = 3;
        /// DBDB: slot B transfer done.
        done_b / with_done_b = 4;
        /// DSTB: slot B started.
        start_b / with_start_b = 5;
    }

    /// Done flag of `slot`.
    pub const fn done(self, slot: Slot) -> bool {
        match slot {
            Slot::A => self.done_a(),
            Slot::B => self.done_b(),
        }
    }

    /// Set the done flag of `slot`.
    pub const fn with_done(self, slot: Slot, on: bool) -> Self {
        match slot {
            Slot::A => self.with_done_a(on),
            Slot::B => self.with_done_b(on),
        }
    }

    /// Set the start flag of `slot`.
    pub const fn with_start(self, slot: Slot, on: bool) -> Self {
        match slot {
            Slot::A => self.with_start_a(on),
            Slot::B => self.with_start_b(on),
        }
    }

    /// Value to write to kick off a transfer on `slot`.
    pub const fn armed(self, slot: Slot) -> Self {
        self.with_start(slot, true).with_enabled(true)
    }
}

// ── SACR0 ──────────────────────────────────────────────────────────────────

/// SAC global control register 0.
///
/// - Bit  0    — ENB (SAC enable)
/// - Bit  2    — BCKD (bit clock direction)
/// - Bit  3    — RST (FIFO/SAC reset)
/// - Bits 11:8 — TFTH (transmit FIFO threshold)
/// - Bits 15:12 — RFTH (receive FIFO threshold)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sacr0(pub u32);

impl Sacr0 {
    bit_accessors! {
        /// ENB: SAC enable.
        enabled / with_enabled = 0;
        /// BCKD: bit clock is an input.
        bit_clock_input / with_bit_clock_input = 2;
        /// RST: hold SAC in reset.
        reset / with_reset = 3;
    }

    /// TFTH field.
    pub const fn tx_threshold(self) -> u8 {
        ((self.0 >> 8) & 0xF) as u8
    }

    /// RFTH field.
    pub const fn rx_threshold(self) -> u8 {
        ((self.0 >> 12) & 0xF) as u8
    }

    /// Set TFTH, truncated to 4 bits.
    pub const fn with_tx_threshold(self, th: u8) -> Self {
        Self((self.0 & !(0xF << 8)) | (((th & 0xF) as u32) << 8))
    }

    /// Set RFTH, truncated to 4 bits.
    pub const fn with_rx_threshold(self, th: u8) -> Self {
        Self((self.0 & !(0xF << 12)) | (((th & 0xF) as u32) << 12))
    }
}

// ── SACR1 ──────────────────────────────────────────────────────────────────

/// SAC control register 1.
///
/// - Bit 0 — AMSL (0 = I2S, 1 = MSB-justified)
/// - Bit 1 — L3EN (L3 interface enable)
/// - Bit 2 — L3MB (L3 multi-byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sacr1(pub u32);

impl Sacr1 {
    bit_accessors! {
        /// AMSL: MSB-justified format instead of I2S.
        msb_justified / with_msb_justified = 0;
        /// L3EN: L3 control bus enabled.
        l3_enabled / with_l3_enabled = 1;
        /// L3MB: L3 multi-byte transfer.
        l3_multibyte / with_l3_multibyte = 2;
    }
}

// ── SASR0 / SASCR ──────────────────────────────────────────────────────────

/// SAC status register 0 (read-only).
///
/// - Bit 16 — L3WD (L3 write done)
/// - Bit 17 — L3RD (L3 read done)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sasr0(pub u32);

impl Sasr0 {
    bit_accessors! {
        /// L3WD: L3 write acknowledged.
        l3_write_done / with_l3_write_done = 16;
        /// L3RD: L3 read completed.
        l3_read_done / with_l3_read_done = 17;
    }
}

/// SAC status clear register (write-one-to-clear).
///
/// - Bit 16 — DTS (clear L3 write done)
/// - Bit 17 — RDD (clear L3 read done)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sascr(pub u32);

impl Sascr {
    bit_accessors! {
        /// DTS: clear L3WD.
        clear_write_done / with_clear_write_done = 16;
        /// RDD: clear L3RD.
        clear_read_done / with_clear_read_done = 17;
    }

    /// Clear both L3 handshake flags.
    pub const L3_CLEAR: Self = Sascr(0).with_clear_write_done(true).with_clear_read_done(true);
}

// ── SKPCR ──────────────────────────────────────────────────────────────────

/// System controller power/clock control.
///
/// - Bit 2 — I2SCLKEN
/// - Bit 3 — L3CLKEN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Skpcr(pub u32);

impl Skpcr {
    bit_accessors! {
        /// I2SCLKEN: I2S bit clock enabled.
        i2s_clock / with_i2s_clock = 2;
        /// L3CLKEN: L3 clock enabled.
        l3_clock / with_l3_clock = 3;
    }
}
