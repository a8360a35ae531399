//! UDA1344 codec driver.
//!
//! The UDA1344 cannot be read back, so the driver keeps a shadow copy of
//! every register and a dirty flag per register group. Setters update the
//! shadow and call [`Uda1344::sync`], which sends only the dirty groups in a
//! single L3 session.
//!
//! # Example
//!
//! ```ignore
//! let mut sac = Sac::new(regs, delay, SacConfig::default());
//! sac.init()?;
//! let mut codec = Uda1344::new(&mut sac);
//! codec.open()?;                      // 256fs I2S, 0 dB, power on
//! codec.set_volume(-20)?;
//! let rate = codec.set_sample_rate(44_100)?;
//! drop(codec);
//! sac.set_sample_rate(rate)?;         // codec clock first, then SA1111
//! ```

use super::registers as reg;
use crate::control::AudioControl;
use crate::error::Error;
use crate::sac::{snap_sample_rate, L3Bus};

const DIRTY_STATUS: u8 = 1 << 0;
const DIRTY_VOLUME: u8 = 1 << 1;
const DIRTY_TONE: u8 = 1 << 2;
const DIRTY_FILTERS: u8 = 1 << 3;
const DIRTY_POWER: u8 = 1 << 4;
const DIRTY_ALL: u8 = DIRTY_STATUS | DIRTY_VOLUME | DIRTY_TONE | DIRTY_FILTERS | DIRTY_POWER;

/// UDA1344 codec driver over an L3 bus.
pub struct Uda1344<L> {
    l3: L,
    active: bool,
    stat0: u8,
    /// Attenuation in dB (0..=63).
    attenuation: u8,
    bass: u8,
    treble: u8,
    muted: bool,
    deemphasis: u8,
    dsp: u8,
    power: u8,
    sample_rate: u32,
    dirty: u8,
}

impl<L: L3Bus> Uda1344<L> {
    /// Create a driver with power-on shadow values. Nothing is sent until
    /// [`open`](Self::open).
    pub fn new(l3: L) -> Self {
        Uda1344 {
            l3,
            active: false,
            stat0: reg::STAT0_SC_256FS | reg::STAT0_IF_I2S,
            attenuation: 0,
            bass: 0,
            treble: 0,
            muted: false,
            deemphasis: 0,
            dsp: 0,
            power: reg::POWER_OFF,
            sample_rate: 22_050,
            dirty: 0,
        }
    }

    /// Apply defaults and power the chip on: 256fs I2S, 0 dB, flat tone,
    /// maximum DSP filter, unmuted.
    pub fn open(&mut self) -> Result<(), Error> {
        self.active = true;
        self.stat0 = reg::STAT0_SC_256FS | reg::STAT0_IF_I2S;
        self.attenuation = 0;
        self.bass = 0;
        self.treble = 0;
        self.muted = false;
        self.deemphasis = 0;
        self.dsp = reg::MAX_DSP;
        self.power = reg::POWER_ON;
        self.sample_rate = 22_050;
        self.dirty = DIRTY_ALL;
        self.sync()?;
        log::debug!("uda1344: open");
        Ok(())
    }

    /// Power the chip off.
    pub fn close(&mut self) -> Result<(), Error> {
        self.active = false;
        self.power = reg::POWER_OFF;
        self.dirty |= DIRTY_POWER;
        self.sync()?;
        log::debug!("uda1344: closed");
        Ok(())
    }

    /// Select the codec system clock for `hz` and return the snapped rate.
    ///
    /// Must run before the SA1111 audio clock is reprogrammed for the same rate.
    pub fn set_sample_rate(&mut self, hz: u32) -> Result<u32, Error> {
        let rate = snap_sample_rate(hz);
        let clock = if rate >= 44_100 {
            reg::STAT0_SC_512FS
        } else {
            reg::STAT0_SC_256FS
        };
        self.stat0 = clock | reg::STAT0_IF_I2S;
        self.sample_rate = rate;
        self.dirty |= DIRTY_STATUS | DIRTY_VOLUME;
        self.sync()?;
        Ok(rate)
    }

    /// Set the volume in dB, clamped to -63..=0.
    pub fn set_volume(&mut self, db: i8) -> Result<(), Error> {
        let db = db.clamp(reg::MIN_VOLUME_DB, reg::MAX_VOLUME_DB);
        self.attenuation = db.unsigned_abs() & reg::DATA0_VOLUME_MASK;
        self.dirty |= DIRTY_VOLUME;
        self.sync()
    }

    pub fn set_mute(&mut self, muted: bool) -> Result<(), Error> {
        self.muted = muted;
        self.dirty |= DIRTY_FILTERS;
        self.sync()
    }

    /// Bass boost, clamped to 0..=15.
    pub fn set_bass(&mut self, bass: u8) -> Result<(), Error> {
        self.bass = bass.min(reg::MAX_BASS);
        self.dirty |= DIRTY_TONE;
        self.sync()
    }

    /// Treble, clamped to 0..=3.
    pub fn set_treble(&mut self, treble: u8) -> Result<(), Error> {
        self.treble = treble.min(reg::MAX_TREBLE);
        self.dirty |= DIRTY_TONE;
        self.sync()
    }

    /// DSP filter mode, clamped to 0..=3.
    pub fn set_dsp(&mut self, dsp: u8) -> Result<(), Error> {
        self.dsp = dsp.min(reg::MAX_DSP);
        self.dirty |= DIRTY_FILTERS;
        self.sync()
    }

    /// De-emphasis mode, clamped to 0..=3.
    pub fn set_deemphasis(&mut self, mode: u8) -> Result<(), Error> {
        self.deemphasis = mode.min(reg::MAX_DEEMPHASIS);
        self.dirty |= DIRTY_FILTERS;
        self.sync()
    }

    /// Volume in dB (-63..=0).
    pub fn volume(&self) -> i8 {
        -(self.attenuation as i8)
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn bass(&self) -> u8 {
        self.bass
    }

    pub fn treble(&self) -> u8 {
        self.treble
    }

    pub fn dsp(&self) -> u8 {
        self.dsp
    }

    pub fn deemphasis(&self) -> u8 {
        self.deemphasis
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Whether the codec is open (powered).
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether some settings have not reached the chip yet.
    pub fn has_pending(&self) -> bool {
        self.dirty != 0
    }

    /// Send every dirty register group in one L3 session.
    ///
    /// Groups sent successfully are marked clean. On failure the rest stay
    /// dirty and go out with the next sync.
    pub fn sync(&mut self) -> Result<(), Error> {
        if self.dirty == 0 {
            return Ok(());
        }
        self.l3.begin()?;
        let sent = self.send_dirty();
        let ended = self.l3.end();
        if let Err(e) = sent.and(ended) {
            log::warn!("uda1344: sync failed, pending {:#07b}: {}", self.dirty, e);
            return Err(e);
        }
        Ok(())
    }

    fn send_dirty(&mut self) -> Result<(), Error> {
        let groups = [
            (DIRTY_STATUS, reg::L3_STATUS, reg::STAT0 | self.stat0),
            (DIRTY_VOLUME, reg::L3_DATA, reg::DATA0_VOLUME | self.attenuation),
            (DIRTY_TONE, reg::L3_DATA, reg::DATA1_TONE | (self.bass << 2) | self.treble),
            (
                DIRTY_FILTERS,
                reg::L3_DATA,
                reg::DATA2_FILTERS | (self.deemphasis << 3) | (u8::from(self.muted) << 2) | self.dsp,
            ),
            (DIRTY_POWER, reg::L3_DATA, reg::DATA3_POWER | self.power),
        ];
        for (flag, address, byte) in groups {
            if self.dirty & flag != 0 {
                self.l3.send_byte(address, byte)?;
                self.dirty &= !flag;
            }
        }
        Ok(())
    }

    /// Release the L3 bus.
    pub fn release(self) -> L {
        self.l3
    }
}

impl<L: L3Bus> AudioControl for Uda1344<L> {
    type Error = Error;

    fn enable(&mut self) -> Result<(), Error> {
        self.open()
    }

    fn disable(&mut self) -> Result<(), Error> {
        self.close()
    }

    /// Linear 0.0..=1.0 onto -63..=0 dB in 1 dB steps. NaN is treated as 0.0.
    fn volume(&mut self, level: f32) -> Result<(), Error> {
        let level = if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) };
        let attenuation = ((1.0 - level) * 63.0 + 0.5) as i8;
        self.set_volume(-attenuation)
    }

    fn mute(&mut self, on: bool) -> Result<(), Error> {
        self.set_mute(on)
    }
}
