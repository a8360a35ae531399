//! SA1111 Serial Audio Controller setup, clocking and L3 control bus.
//!
//! # Example
//!
//! ```ignore
//! let mut sac = Sac::new(regs, delay, SacConfig::default());
//! sac.init()?;                          // I2S mode, reset, L3 + I2S clocks on
//! let rate = sac.set_sample_rate(44_100)?;
//! sac.l3_send_byte(0x14, 0x00)?;        // acknowledged L3 write
//! ```

use embedded_hal::delay::DelayNs;

use super::bus::{RegisterAccess, RegisterBus};
use super::registers::{Register, Sacr0, Sacr1, Sasr0, Sascr, Skpcr};
use crate::config::SacConfig;
use crate::constants::{AUDIO_CLK_BASE, SUPPORTED_SAMPLE_RATES};
use crate::error::Error;

/// Byte-oriented L3 control bus, as used by Philips UDA134x codecs.
pub trait L3Bus {
    /// Enable the bus and its clock ahead of a group of transfers.
    fn begin(&mut self) -> Result<(), Error>;

    /// Disable the bus and its clock.
    fn end(&mut self) -> Result<(), Error>;

    /// Send one `data` byte to L3 `address`, waiting for the acknowledgement.
    fn send_byte(&mut self, address: u8, data: u8) -> Result<(), Error>;
}

impl<T: L3Bus + ?Sized> L3Bus for &mut T {
    fn begin(&mut self) -> Result<(), Error> {
        T::begin(self)
    }

    fn end(&mut self) -> Result<(), Error> {
        T::end(self)
    }

    fn send_byte(&mut self, address: u8, data: u8) -> Result<(), Error> {
        T::send_byte(self, address, data)
    }
}

/// Snap `hz` down to the nearest rate the SA1111 divider table supports.
///
/// Rates below 8 kHz map to 8 kHz.
pub fn snap_sample_rate(hz: u32) -> u32 {
    SUPPORTED_SAMPLE_RATES
        .iter()
        .rev()
        .copied()
        .find(|&r| hz >= r)
        .unwrap_or(SUPPORTED_SAMPLE_RATES[0])
}

/// Audio clock divider for `hz` from the SA1111 manual table (48 kHz estimated).
pub fn clock_divider(hz: u32) -> u32 {
    match snap_sample_rate(hz) {
        48000 => 11,
        44100 => 12,
        32000 => 18,
        22050 => 25,
        16000 => 35,
        11025 => 51,
        _ => 70,
    }
}

/// Divider computed from the audio clock base, rounded to nearest.
///
/// Returns `None` for a zero rate.
pub fn exact_clock_divider(hz: u32) -> Option<u32> {
    if hz == 0 {
        return None;
    }
    Some((AUDIO_CLK_BASE + hz / 2) / hz)
}

/// SA1111 Serial Audio Controller.
pub struct Sac<R, D> {
    bus: RegisterBus<R, D>,
    config: SacConfig,
    sample_rate: Option<u32>,
}

impl<R, D> Sac<R, D>
where
    R: RegisterAccess,
    D: DelayNs,
{
    /// Create a controller. No hardware access happens until [`init`](Self::init).
    pub fn new(regs: R, delay: D, config: SacConfig) -> Self {
        Sac {
            bus: RegisterBus::new(regs, delay, config.retry),
            config,
            sample_rate: None,
        }
    }

    /// Select I2S, reset and enable the SAC, then enable L3 and the clocks.
    pub fn init(&mut self) -> Result<(), Error> {
        // AMSL = 0 selects I2S over MSB-justified
        self.bus.modify(Register::Sacr1, |v| Sacr1(v).with_msb_justified(false).0)?;

        self.bus.modify(Register::Sacr0, |v| Sacr0(v).with_enabled(true).with_reset(true).0)?;
        self.bus.delay_ms(self.config.reset_hold_ms);
        self.bus.modify(Register::Sacr0, |v| Sacr0(v).with_reset(false).0)?;

        self.enable_l3()?;
        self.bus.modify(Register::Skpcr, |v| Skpcr(v).with_l3_clock(true).with_i2s_clock(true).0)?;
        log::debug!("sac: initialised (I2S, L3 enabled)");
        Ok(())
    }

    /// Gate the clocks, disable L3 and the SAC.
    pub fn shutdown(&mut self) -> Result<(), Error> {
        self.bus.modify(Register::Skpcr, |v| Skpcr(v).with_i2s_clock(false).with_l3_clock(false).0)?;
        self.bus.write(Register::Sacr1, 0)?;
        self.bus.modify(Register::Sacr0, |v| Sacr0(v).with_enabled(false).0)?;
        log::debug!("sac: shut down");
        Ok(())
    }

    /// Program the audio clock divider for `hz` and return the rate actually set.
    ///
    /// The I2S clock is gated while `SKAUD` is rewritten.
    pub fn set_sample_rate(&mut self, hz: u32) -> Result<u32, Error> {
        let rate = snap_sample_rate(hz);
        self.set_i2s_clock(false)?;
        self.bus.write(Register::Skaud, clock_divider(rate) - 1)?;
        self.set_i2s_clock(true)?;
        self.sample_rate = Some(rate);
        log::debug!("sac: sample rate {} Hz (requested {})", rate, hz);
        Ok(rate)
    }

    /// Rate programmed by the last [`set_sample_rate`](Self::set_sample_rate).
    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    /// Gate or ungate the I2S bit clock.
    pub fn set_i2s_clock(&mut self, on: bool) -> Result<(), Error> {
        self.bus.modify(Register::Skpcr, |v| Skpcr(v).with_i2s_clock(on).0)?;
        Ok(())
    }

    /// Gate or ungate the L3 clock. Disabling it also disables the L3 interface.
    pub fn set_l3_clock(&mut self, on: bool) -> Result<(), Error> {
        if !on {
            self.bus.write(Register::Sacr1, 0)?;
        }
        self.bus.modify(Register::Skpcr, |v| Skpcr(v).with_l3_clock(on).0)?;
        Ok(())
    }

    fn enable_l3(&mut self) -> Result<(), Error> {
        self.bus.write(Register::Sacr1, Sacr1(0).with_l3_enabled(true).0)
    }

    /// Send one byte over L3 and wait for the write-done acknowledgement.
    ///
    /// An unacknowledged send is repeated per the retry policy; when every
    /// attempt goes unacknowledged the result is [`Error::DeviceBusy`].
    pub fn l3_send_byte(&mut self, address: u8, data: u8) -> Result<(), Error> {
        let retry = self.bus.retry_policy();
        for attempt in 1..=retry.attempts() {
            if self.l3_try_send(address, data)? {
                return Ok(());
            }
            log::debug!("sac: L3 write {:#04x}:{:#04x} not acknowledged (attempt {})", address, data, attempt);
            if attempt < retry.attempts() {
                self.bus.delay_us(retry.backoff_us());
            }
        }
        log::warn!("sac: L3 write {:#04x}:{:#04x} timed out", address, data);
        Err(Error::DeviceBusy)
    }

    fn l3_try_send(&mut self, address: u8, data: u8) -> Result<bool, Error> {
        self.bus.write(Register::L3Car, 0)?;
        self.bus.write(Register::L3Cdr, 0)?;
        self.bus.delay_ms(self.config.l3_settle_ms);
        self.bus.write(Register::Sascr, Sascr::L3_CLEAR.0)?;
        self.bus.write(Register::L3Car, address.into())?;
        self.bus.write(Register::L3Cdr, data.into())?;

        let acked = self
            .bus
            .poll_until(Register::Sasr0, self.config.l3_ack, |v| Sasr0(v).l3_write_done())?;

        self.bus.write(Register::Sascr, Sascr::L3_CLEAR.0)?;
        Ok(acked)
    }

    /// Shared access to the underlying register block.
    pub fn registers(&self) -> &R {
        self.bus.registers()
    }

    /// Release the register block and delay provider.
    pub fn release(self) -> (R, D) {
        self.bus.release()
    }
}

impl<R, D> L3Bus for Sac<R, D>
where
    R: RegisterAccess,
    D: DelayNs,
{
    fn begin(&mut self) -> Result<(), Error> {
        self.enable_l3()?;
        self.set_l3_clock(true)
    }

    fn end(&mut self) -> Result<(), Error> {
        self.set_l3_clock(false)
    }

    fn send_byte(&mut self, address: u8, data: u8) -> Result<(), Error> {
        self.l3_send_byte(address, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PollBudget, RetryPolicy};
    use crate::mocks::{MockDelay, MockRegs};

    fn make_sac() -> Sac<MockRegs, MockDelay> {
        Sac::new(MockRegs::new(), MockDelay::new(), SacConfig::default())
    }

    #[test]
    fn snap_rates_to_table() {
        assert_eq!(snap_sample_rate(0), 8000);
        assert_eq!(snap_sample_rate(7999), 8000);
        assert_eq!(snap_sample_rate(11025), 11025);
        assert_eq!(snap_sample_rate(22049), 16000);
        assert_eq!(snap_sample_rate(44100), 44100);
        assert_eq!(snap_sample_rate(47999), 44100);
        assert_eq!(snap_sample_rate(96000), 48000);
    }

    #[test]
    fn divider_table() {
        assert_eq!(clock_divider(48000), 11);
        assert_eq!(clock_divider(44100), 12);
        assert_eq!(clock_divider(22050), 25);
        assert_eq!(clock_divider(8000), 70);
        assert_eq!(clock_divider(100), 70);
    }

    #[test]
    fn exact_divider_rounds() {
        assert_eq!(exact_clock_divider(0), None);
        // (561600 + 4000) / 8000 = 70
        assert_eq!(exact_clock_divider(8000), Some(70));
        // (561600 + 22050) / 44100 = 13 (table says 12)
        assert_eq!(exact_clock_divider(44100), Some(13));
    }

    #[test]
    fn init_resets_and_enables() {
        let mut sac = make_sac();
        sac.init().unwrap();
        let (regs, delay) = sac.release();

        let sacr0 = regs.writes_to(Register::Sacr0);
        assert_eq!(sacr0.len(), 2);
        assert!(Sacr0(sacr0[0]).reset());
        assert!(Sacr0(sacr0[0]).enabled());
        assert!(!Sacr0(sacr0[1]).reset());
        assert!(Sacr0(sacr0[1]).enabled());

        assert!(Sacr1(regs.value(Register::Sacr1)).l3_enabled());
        assert!(!Sacr1(regs.value(Register::Sacr1)).msb_justified());
        let clk = Skpcr(regs.value(Register::Skpcr));
        assert!(clk.i2s_clock() && clk.l3_clock());
        assert_eq!(delay.total_us(), 5000);
    }

    #[test]
    fn shutdown_gates_everything() {
        let mut sac = make_sac();
        sac.init().unwrap();
        sac.shutdown().unwrap();
        let regs = sac.registers();
        assert_eq!(Skpcr(regs.value(Register::Skpcr)).0 & 0b1100, 0);
        assert_eq!(regs.value(Register::Sacr1), 0);
        assert!(!Sacr0(regs.value(Register::Sacr0)).enabled());
    }

    #[test]
    fn sample_rate_gates_i2s_clock_around_divider() {
        let mut sac = make_sac();
        sac.init().unwrap();
        let rate = sac.set_sample_rate(44_000).unwrap();
        assert_eq!(rate, 32000);
        assert_eq!(sac.sample_rate(), Some(32000));

        let (regs, _) = sac.release();
        let writes = regs.writes();
        let skaud = writes.iter().position(|(r, _)| *r == Register::Skaud).unwrap();
        assert_eq!(writes[skaud].1, 17);
        assert!(!Skpcr(writes[skaud - 1].1).i2s_clock());
        assert!(Skpcr(writes[skaud + 1].1).i2s_clock());
    }

    #[test]
    fn l3_send_byte_acknowledged() {
        let mut sac = make_sac();
        sac.l3_send_byte(0x16, 0x20).unwrap();
        let (regs, _) = sac.release();
        assert_eq!(regs.l3_sent(), &[(0x16, 0x20)]);
        // status cleared before and after the transfer
        assert_eq!(regs.writes_to(Register::Sascr), [Sascr::L3_CLEAR.0; 2]);
    }

    #[test]
    fn l3_send_byte_retries_until_acknowledged() {
        let mut regs = MockRegs::new();
        regs.nack_next_l3(2);
        let mut sac = Sac::new(regs, MockDelay::new(), SacConfig::default());
        sac.l3_send_byte(0x14, 0x3F).unwrap();
        let (regs, _) = sac.release();
        assert_eq!(regs.l3_sent().len(), 3);
    }

    #[test]
    fn l3_send_byte_reports_busy_after_budget() {
        let mut regs = MockRegs::new();
        regs.set_l3_ack(false);
        let config = SacConfig::default()
            .with_retry(RetryPolicy::new(3, 10).unwrap())
            .with_l3_ack(PollBudget::new(1000, 4));
        let mut sac = Sac::new(regs, MockDelay::new(), config);

        assert_eq!(sac.l3_send_byte(0x14, 0x01), Err(Error::DeviceBusy));
        let (regs, delay) = sac.release();
        assert_eq!(regs.l3_sent().len(), 3);
        // per attempt: 1 ms settle + 4 × 1 ms polling; plus 2 backoffs of 10 µs
        assert_eq!(delay.total_us(), 3 * 5000 + 20);
    }

    #[test]
    fn l3_begin_end_toggle_interface_and_clock() {
        let mut sac = make_sac();
        L3Bus::begin(&mut sac).unwrap();
        assert!(Sacr1(sac.registers().value(Register::Sacr1)).l3_enabled());
        assert!(Skpcr(sac.registers().value(Register::Skpcr)).l3_clock());

        L3Bus::end(&mut sac).unwrap();
        assert!(!Sacr1(sac.registers().value(Register::Sacr1)).l3_enabled());
        assert!(!Skpcr(sac.registers().value(Register::Skpcr)).l3_clock());
    }
}
