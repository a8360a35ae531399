//! Software stand-ins for the SA1111 register file and a delay provider.
//!
//! [`MockRegs`] behaves like a register file with just enough hardware
//! semantics for the drivers under test:
//!
//! - writing a DMA start bit clears that slot's done flag,
//! - [`MockRegs::complete`] raises a slot's done flag,
//! - an L3 data write (with a non-zero address latched) is recorded and,
//!   unless configured otherwise, acknowledged through `SASR0.L3WD`,
//! - a write to `SASCR` with DTS clears the acknowledgement.
//!
//! [`MockL3`] stands in for the whole L3 bus when testing the codec driver.

use std::collections::BTreeMap;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::error::Error;
use crate::sac::registers::{DmaControl, Register, Sascr, Sasr0, Slot};
use crate::sac::{Direction, L3Bus, RegisterAccess};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError;

pub struct MockRegs {
    file: BTreeMap<u32, u32>,
    writes: Vec<(Register, u32)>,
    fail_next: u32,
    l3_ack: bool,
    l3_nacks: u32,
    l3_acked: bool,
    l3_sent: Vec<(u8, u8)>,
}

impl MockRegs {
    pub fn new() -> Self {
        MockRegs {
            file: BTreeMap::new(),
            writes: Vec::new(),
            fail_next: 0,
            l3_ack: true,
            l3_nacks: 0,
            l3_acked: false,
            l3_sent: Vec::new(),
        }
    }

    /// Current value, 0 if never written.
    pub fn value(&self, register: Register) -> u32 {
        self.file.get(&register.offset()).copied().unwrap_or(0)
    }

    /// Preload a register without logging a write.
    pub fn set(&mut self, register: Register, value: u32) {
        self.file.insert(register.offset(), value);
    }

    /// Make the next `n` accesses (reads or writes) fail.
    pub fn fail_next(&mut self, n: u32) {
        self.fail_next = n;
    }

    /// Writes in chronological order.
    pub fn writes(&self) -> &[(Register, u32)] {
        &self.writes
    }

    /// Writes to one register in chronological order.
    pub fn writes_to(&self, register: Register) -> Vec<u32> {
        self.writes
            .iter()
            .filter(|(r, _)| *r == register)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Signal that the transfer on `slot` has drained.
    pub fn complete(&mut self, direction: Direction, slot: Slot) {
        let reg = Register::DmaControl(direction);
        let cs = DmaControl(self.value(reg)).with_done(slot, true);
        self.set(reg, cs.0);
    }

    /// Whether the L3 interface acknowledges writes at all.
    pub fn set_l3_ack(&mut self, ack: bool) {
        self.l3_ack = ack;
    }

    /// Leave the next `n` L3 byte writes unacknowledged.
    pub fn nack_next_l3(&mut self, n: u32) {
        self.l3_nacks = n;
    }

    /// (address, data) pairs sent over L3, including unacknowledged ones.
    pub fn l3_sent(&self) -> &[(u8, u8)] {
        &self.l3_sent
    }

    fn take_failure(&mut self) -> bool {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            true
        } else {
            false
        }
    }
}

impl RegisterAccess for MockRegs {
    type Error = MockBusError;

    fn read_register(&mut self, register: Register) -> Result<u32, MockBusError> {
        if self.take_failure() {
            return Err(MockBusError);
        }
        let v = self.value(register);
        if register == Register::Sasr0 {
            return Ok(Sasr0(v).with_l3_write_done(self.l3_acked).0);
        }
        Ok(v)
    }

    fn write_register(&mut self, register: Register, value: u32) -> Result<(), MockBusError> {
        if self.take_failure() {
            return Err(MockBusError);
        }
        self.writes.push((register, value));
        match register {
            Register::DmaControl(_) => {
                let mut cs = DmaControl(value);
                for slot in [Slot::A, Slot::B] {
                    if cs.with_start(slot, false) != cs {
                        cs = cs.with_done(slot, false);
                    }
                }
                self.set(register, cs.0);
            }
            Register::Sascr => {
                if Sascr(value).clear_write_done() {
                    self.l3_acked = false;
                }
            }
            Register::L3Cdr => {
                self.set(register, value);
                let addr = self.value(Register::L3Car);
                if addr != 0 {
                    self.l3_sent.push((addr as u8, value as u8));
                    if self.l3_nacks > 0 {
                        self.l3_nacks -= 1;
                        self.l3_acked = false;
                    } else {
                        self.l3_acked = self.l3_ack;
                    }
                }
            }
            _ => self.set(register, value),
        }
        Ok(())
    }
}

/// Delay provider that only counts.
pub struct MockDelay {
    calls: u32,
    total_ns: u64,
}

impl MockDelay {
    pub fn new() -> Self {
        MockDelay {
            calls: 0,
            total_ns: 0,
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls
    }

    pub fn total_us(&self) -> u64 {
        self.total_ns / 1000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ns += u64::from(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.calls += 1;
        self.total_ns += u64::from(us) * 1000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls += 1;
        self.total_ns += u64::from(ms) * 1_000_000;
    }
}

/// L3 bus that records every byte and can be told to fail.
pub struct MockL3 {
    sent: Vec<(u8, u8)>,
    begins: u32,
    ends: u32,
    fail_after: Option<usize>,
}

impl MockL3 {
    pub fn new() -> Self {
        MockL3 {
            sent: Vec::new(),
            begins: 0,
            ends: 0,
            fail_after: None,
        }
    }

    /// (address, data) pairs accepted so far.
    pub fn sent(&self) -> &[(u8, u8)] {
        &self.sent
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }

    pub fn begins(&self) -> u32 {
        self.begins
    }

    pub fn ends(&self) -> u32 {
        self.ends
    }

    /// Accept `n` more bytes, then report every send as busy.
    pub fn fail_after(&mut self, n: Option<usize>) {
        self.fail_after = n;
    }
}

impl L3Bus for MockL3 {
    fn begin(&mut self) -> Result<(), Error> {
        self.begins += 1;
        Ok(())
    }

    fn end(&mut self) -> Result<(), Error> {
        self.ends += 1;
        Ok(())
    }

    fn send_byte(&mut self, address: u8, data: u8) -> Result<(), Error> {
        match self.fail_after {
            Some(0) => return Err(Error::DeviceBusy),
            Some(ref mut n) => *n -= 1,
            None => {}
        }
        self.sent.push((address, data));
        Ok(())
    }
}
