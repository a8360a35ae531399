//! Timing and retry configuration for the SAC drivers.
//!
//! Every wait in this crate is a bounded loop over an injected
//! [`DelayNs`](embedded_hal::delay::DelayNs); the budgets below set the
//! iteration counts and intervals. Defaults follow the timings of the
//! Jornada 720 sound driver.

use crate::constants::{MAX_RETRY_ATTEMPTS, SAC_FIFO_RX_THRESHOLD, SAC_FIFO_TX_THRESHOLD};
use crate::error::Error;

/// Retry policy for register accesses that can fail (bus busy, no ack).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u8,
    backoff_us: u32,
}

impl RetryPolicy {
    /// 10 attempts, 100 µs apart.
    pub const DEFAULT: Self = RetryPolicy {
        attempts: MAX_RETRY_ATTEMPTS,
        backoff_us: 100,
    };

    /// Create a policy with `attempts` total tries and `backoff_us` between them.
    ///
    /// `attempts` must be in `1..=10` and the backoff must stay below one
    /// millisecond, otherwise [`Error::InvalidArgument`] is returned.
    pub const fn new(attempts: u8, backoff_us: u32) -> Result<Self, Error> {
        if attempts == 0 || attempts > MAX_RETRY_ATTEMPTS || backoff_us >= 1000 {
            return Err(Error::InvalidArgument);
        }
        Ok(RetryPolicy {
            attempts,
            backoff_us,
        })
    }

    /// Total number of attempts (first try included).
    pub const fn attempts(&self) -> u8 {
        self.attempts
    }

    /// Delay between attempts in microseconds.
    pub const fn backoff_us(&self) -> u32 {
        self.backoff_us
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Bounded polling budget: at most `max_iterations` checks, `interval_us` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    /// Delay between two checks, in microseconds.
    pub interval_us: u32,
    /// Maximum number of delays before giving up.
    pub max_iterations: u32,
}

impl PollBudget {
    /// Create a polling budget.
    pub const fn new(interval_us: u32, max_iterations: u32) -> Self {
        PollBudget {
            interval_us,
            max_iterations,
        }
    }
}

/// Configuration shared by [`Sac`](crate::sac::Sac) and [`SacDma`](crate::dma::SacDma).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SacConfig {
    /// Retry policy applied to every register access.
    pub retry: RetryPolicy,
    /// Budget for waiting on the in-flight transfer in `stop`.
    pub dma_stop: PollBudget,
    /// Budget for waiting on the L3 write-done acknowledgement.
    pub l3_ack: PollBudget,
    /// How long SACR0.RST is held during reset, in milliseconds.
    pub reset_hold_ms: u32,
    /// Settle time after clearing the L3 address/data registers, in milliseconds.
    pub l3_settle_ms: u32,
    /// Transmit FIFO threshold programmed into SACR0.TFTH (4 bits).
    pub tx_fifo_threshold: u8,
    /// Receive FIFO threshold programmed into SACR0.RFTH (4 bits).
    pub rx_fifo_threshold: u8,
}

impl SacConfig {
    /// Jornada 720 defaults.
    pub const DEFAULT: Self = SacConfig {
        retry: RetryPolicy::DEFAULT,
        dma_stop: PollBudget::new(10, 1000),
        l3_ack: PollBudget::new(1000, 200),
        reset_hold_ms: 5,
        l3_settle_ms: 1,
        tx_fifo_threshold: SAC_FIFO_TX_THRESHOLD,
        rx_fifo_threshold: SAC_FIFO_RX_THRESHOLD,
    };

    /// Replace the retry policy.
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the DMA stop polling budget.
    pub const fn with_dma_stop(mut self, budget: PollBudget) -> Self {
        self.dma_stop = budget;
        self
    }

    /// Replace the L3 acknowledgement polling budget.
    pub const fn with_l3_ack(mut self, budget: PollBudget) -> Self {
        self.l3_ack = budget;
        self
    }
}

impl Default for SacConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_policy_bounds() {
        assert_eq!(RetryPolicy::new(0, 10), Err(Error::InvalidArgument));
        assert_eq!(RetryPolicy::new(11, 10), Err(Error::InvalidArgument));
        assert_eq!(RetryPolicy::new(3, 1000), Err(Error::InvalidArgument));

        let p = RetryPolicy::new(10, 999).unwrap();
        assert_eq!(p.attempts(), 10);
        assert_eq!(p.backoff_us(), 999);
    }

    #[test]
    fn defaults_match_driver_timings() {
        let cfg = SacConfig::default();
        assert_eq!(cfg.retry.attempts(), 10);
        assert_eq!(cfg.dma_stop, PollBudget::new(10, 1000));
        assert_eq!(cfg.l3_ack, PollBudget::new(1000, 200));
        assert_eq!(cfg.tx_fifo_threshold, 6);
        assert_eq!(cfg.rx_fifo_threshold, 6);
    }

    #[test]
    fn builders_replace_fields() {
        let cfg = SacConfig::DEFAULT
            .with_retry(RetryPolicy::new(2, 0).unwrap())
            .with_dma_stop(PollBudget::new(1, 5));
        assert_eq!(cfg.retry.attempts(), 2);
        assert_eq!(cfg.dma_stop.max_iterations, 5);
        assert_eq!(cfg.l3_ack, SacConfig::DEFAULT.l3_ack);
    }
}
