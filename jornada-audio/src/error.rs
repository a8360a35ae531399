//! Crate-wide error type.

/// Errors returned synchronously by control operations.
///
/// Interrupt-path anomalies are never reported through this type; they are
/// logged and the offending completion is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed buffer descriptor or out-of-range configuration value.
    #[error("invalid argument")]
    InvalidArgument,
    /// `start` issued on a channel that is not idle.
    #[error("DMA channel already running")]
    AlreadyRunning,
    /// A register handshake was not acknowledged within the retry budget.
    #[error("device busy: handshake not acknowledged within retry budget")]
    DeviceBusy,
    /// Direction or interrupt number outside the supported set.
    #[error("unsupported direction or interrupt source")]
    Unsupported,
}
