//! The transfer engine: how frames reach the bus.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::spi::{Error as _, SpiBus};

use crate::error::{ExpanderError, TransportFault};

/// Timeout for polling transfers, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u32 = 100;

/// How frames are handed to the transport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransferMode {
    /// Block until the transport reports done or the timeout expires. The
    /// device is back to idle when the call returns.
    #[default]
    Polling,
    /// Submit the frame and return. The device stays busy until a
    /// [`Completion`](crate::Completion) is delivered.
    Interrupt,
}

/// An SPI peripheral as seen by the driver.
///
/// Chip-select is not part of this trait, the driver drives it itself around
/// each transfer.
pub trait Transport {
    /// Shift `frame` out and wait for it to finish.
    fn transmit(&mut self, frame: &[u8], timeout_ms: u32) -> Result<(), TransportFault>;

    /// Hand `frame` to the peripheral and return without waiting. Completion is
    /// reported out of band, normally from the transfer-complete interrupt.
    ///
    /// `frame` is only borrowed for the duration of the call. An implementation
    /// backed by DMA or an interrupt-driven FIFO must copy it into its own
    /// buffer before returning.
    fn submit(&mut self, frame: &[u8]) -> Result<(), TransportFault>;

    /// Clock in `buffer.len()` bytes.
    fn receive(&mut self, buffer: &mut [u8], timeout_ms: u32) -> Result<(), TransportFault>;
}

/// A transport shared by all the expanders on one bus.
///
/// Use `CriticalSectionRawMutex` when completions are delivered from an
/// interrupt handler, `NoopRawMutex` otherwise.
pub type SharedTransport<M, T> = Mutex<M, RefCell<T>>;

/// Run `f` with exclusive access to the shared transport.
///
/// A second borrow while one is outstanding is reported as [`ExpanderError::Busy`].
pub(crate) fn with_transport<M, T, R>(
    shared: &SharedTransport<M, T>,
    f: impl FnOnce(&mut T) -> Result<R, ExpanderError>,
) -> Result<R, ExpanderError>
where
    M: RawMutex,
{
    shared.lock(|cell| match cell.try_borrow_mut() {
        Ok(mut transport) => f(&mut *transport),
        Err(_) => Err(ExpanderError::Busy),
    })
}

/// [`Transport`] for any blocking `embedded-hal` [`SpiBus`].
///
/// `SpiBus::write` may return before the bus is idle, which is exactly the
/// non-blocking submission used in [`TransferMode::Interrupt`]. Timeouts are
/// whatever the HAL enforces, this adapter never reports
/// [`TransportFault::Timeout`] itself.
pub struct SpiBusTransport<SPI> {
    spi: SPI,
}

impl<SPI> SpiBusTransport<SPI> {
    #[allow(missing_docs)]
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Destroys the adapter and releases the bus.
    pub fn into_inner(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiBus<u8>> Transport for SpiBusTransport<SPI> {
    fn transmit(&mut self, frame: &[u8], _timeout_ms: u32) -> Result<(), TransportFault> {
        self.spi.write(frame).map_err(bus_fault)?;
        self.spi.flush().map_err(bus_fault)
    }

    fn submit(&mut self, frame: &[u8]) -> Result<(), TransportFault> {
        self.spi.write(frame).map_err(bus_fault)
    }

    fn receive(&mut self, buffer: &mut [u8], _timeout_ms: u32) -> Result<(), TransportFault> {
        self.spi.read(buffer).map_err(bus_fault)?;
        self.spi.flush().map_err(bus_fault)
    }
}

fn bus_fault<E: embedded_hal::spi::Error>(e: E) -> TransportFault {
    TransportFault::Bus(e.kind())
}
