use crate::registers::RegisterAddress;

/// Why a transfer did not go through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportFault {
    /// The blocking transfer did not finish within the configured timeout.
    Timeout,
    /// The peripheral refused a non-blocking submission (e.g. it is already busy).
    Rejected,
    /// The SPI peripheral reported an error.
    Bus(embedded_hal::spi::ErrorKind),
    /// The chip-select line could not be driven.
    ChipSelect(embedded_hal::digital::ErrorKind),
}

/// Errors returned by every [`Expander`](crate::Expander) operation.
///
/// Nothing is retried internally, the caller decides what to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpanderError {
    /// An invalid argument: hardware address, port number, a write to a
    /// read-only register, a completion with nothing in flight or an operation
    /// the configured transfer mode cannot perform.
    Parameter,
    /// A transaction is already in flight on this device, or the shared
    /// transport is borrowed by someone else.
    Busy,
    /// The transfer failed or timed out.
    Transport(TransportFault),
    /// Programming the given register during initialization failed.
    Configuration(RegisterAddress),
}

impl From<TransportFault> for ExpanderError {
    fn from(fault: TransportFault) -> ExpanderError {
        ExpanderError::Transport(fault)
    }
}
