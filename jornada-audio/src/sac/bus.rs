//! Register access interface and the retrying bus wrapper.
//!
//! [`RegisterAccess`] is the only thing the drivers need from the platform:
//! raw 32-bit reads and writes of named registers. A write must be complete
//! when it returns. [`RegisterBus`] layers the bounded retry policy and
//! bounded polling on top of it, using an injected delay so the timing is
//! deterministic under test.

use core::convert::Infallible;
use core::fmt::Debug;

use embedded_hal::delay::DelayNs;

use super::registers::Register;
use crate::config::{PollBudget, RetryPolicy};
use crate::error::Error;

/// Raw access to the SA1111 register file.
pub trait RegisterAccess {
    /// Error reported by a failed access (e.g. bus busy).
    type Error: Debug;

    /// Read the current raw value of `register`.
    fn read_register(&mut self, register: Register) -> Result<u32, Self::Error>;

    /// Write `value` to `register`. Side effects are complete on return.
    fn write_register(&mut self, register: Register, value: u32) -> Result<(), Self::Error>;
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &mut T {
    type Error = T::Error;

    fn read_register(&mut self, register: Register) -> Result<u32, Self::Error> {
        T::read_register(self, register)
    }

    fn write_register(&mut self, register: Register, value: u32) -> Result<(), Self::Error> {
        T::write_register(self, register, value)
    }
}

/// Memory-mapped SA1111 register block.
pub struct Mmio {
    base: *mut u32,
}

impl Mmio {
    /// Wrap the SA1111 register window mapped at `base`.
    ///
    /// # Safety
    ///
    /// `base` must point to the mapped SA1111 chip registers, valid for
    /// volatile 32-bit access at every [`Register::offset`], for as long as
    /// this value lives. No other code may access those registers concurrently
    /// except through this value.
    pub const unsafe fn new(base: *mut u32) -> Self {
        Mmio { base }
    }

    fn ptr(&self, register: Register) -> *mut u32 {
        // Offsets are byte offsets; every register is word aligned.
        self.base.wrapping_byte_add(register.offset() as usize)
    }
}

// SAFETY: `new` makes this value the sole accessor of the register window,
// so moving it to another context cannot introduce aliasing.
unsafe impl Send for Mmio {}

impl RegisterAccess for Mmio {
    type Error = Infallible;

    fn read_register(&mut self, register: Register) -> Result<u32, Infallible> {
        // SAFETY: `new` requires `base` to cover every register offset.
        Ok(unsafe { self.ptr(register).read_volatile() })
    }

    fn write_register(&mut self, register: Register, value: u32) -> Result<(), Infallible> {
        // SAFETY: `new` requires `base` to cover every register offset.
        unsafe { self.ptr(register).write_volatile(value) };
        Ok(())
    }
}

/// Register access with bounded retry and bounded polling.
pub struct RegisterBus<R, D> {
    regs: R,
    delay: D,
    retry: RetryPolicy,
}

impl<R, D> RegisterBus<R, D>
where
    R: RegisterAccess,
    D: DelayNs,
{
    /// Create a bus over `regs`, using `delay` for backoff and polling.
    pub fn new(regs: R, delay: D, retry: RetryPolicy) -> Self {
        RegisterBus { regs, delay, retry }
    }

    /// Read `register`, retrying per policy. Exhaustion → [`Error::DeviceBusy`].
    pub fn read(&mut self, register: Register) -> Result<u32, Error> {
        let mut attempt = 1;
        loop {
            match self.regs.read_register(register) {
                Ok(v) => return Ok(v),
                Err(e) => {
                    if attempt >= self.retry.attempts() {
                        log::warn!("sac: read {:?} failed after {} attempts: {:?}", register, attempt, e);
                        return Err(Error::DeviceBusy);
                    }
                }
            }
            attempt += 1;
            self.delay.delay_us(self.retry.backoff_us());
        }
    }

    /// Write `value` to `register`, retrying per policy.
    pub fn write(&mut self, register: Register, value: u32) -> Result<(), Error> {
        let mut attempt = 1;
        loop {
            match self.regs.write_register(register, value) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if attempt >= self.retry.attempts() {
                        log::warn!(
                            "sac: write {:?} <- {:#x} failed after {} attempts: {:?}",
                            register,
                            value,
                            attempt,
                            e
                        );
                        return Err(Error::DeviceBusy);
                    }
                }
            }
            attempt += 1;
            self.delay.delay_us(self.retry.backoff_us());
        }
    }

    /// Read-modify-write: writes `f(current)` and returns it.
    pub fn modify(&mut self, register: Register, f: impl FnOnce(u32) -> u32) -> Result<u32, Error> {
        let new_val = f(self.read(register)?);
        self.write(register, new_val)?;
        Ok(new_val)
    }

    /// Poll `register` until `done` holds or the budget runs out.
    ///
    /// Returns `Ok(true)` if the condition was observed, `Ok(false)` if the
    /// budget was exhausted. The register is checked once more after the
    /// last delay.
    pub fn poll_until(
        &mut self,
        register: Register,
        budget: PollBudget,
        mut done: impl FnMut(u32) -> bool,
    ) -> Result<bool, Error> {
        for _ in 0..budget.max_iterations {
            if done(self.read(register)?) {
                return Ok(true);
            }
            self.delay.delay_us(budget.interval_us);
        }
        Ok(done(self.read(register)?))
    }

    /// Busy-wait for `us` microseconds.
    pub fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    /// Busy-wait for `ms` milliseconds.
    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Retry policy in use.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Shared access to the underlying register block.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Exclusive access to the underlying register block.
    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Release the register block and delay provider.
    pub fn release(self) -> (R, D) {
        (self.regs, self.delay)
    }
}
