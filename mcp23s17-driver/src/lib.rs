//! # MCP23S17 driver
//!
//! A driver for the MCP23S17 16-bit I/O expander on an SPI bus shared with
//! other expanders. Each chip is told apart by its own chip-select line and
//! by its hardware address (pins A2, A1, A0, enabled through `IOCON.HAEN`).
//!
//! Transfers are either polled, where every call blocks until the frame is on
//! the wire, or interrupt driven, where a call only submits the frame and the
//! transfer-complete interrupt later delivers a [`Completion`] back to the
//! device. The mode is a [`Config`] value so both can be used in one build.
//!
//! ## Example usage
//!
//! ```
//! use core::cell::RefCell;
//!
//! use embassy_sync::blocking_mutex::{raw::NoopRawMutex, Mutex};
//! use mcp23s17_driver::{ChipSelect, Config, Expander, HardwareAddress, Port, Progress};
//! # use mcp23s17_driver::{Transport, TransportFault};
//! # struct Bus;
//! # impl Transport for Bus {
//! #     fn transmit(&mut self, _: &[u8], _: u32) -> Result<(), TransportFault> { Ok(()) }
//! #     fn submit(&mut self, _: &[u8]) -> Result<(), TransportFault> { Ok(()) }
//! #     fn receive(&mut self, buffer: &mut [u8], _: u32) -> Result<(), TransportFault> {
//! #         buffer.fill(0b1000_0001);
//! #         Ok(())
//! #     }
//! # }
//! # struct Pin;
//! # impl embedded_hal::digital::ErrorType for Pin { type Error = core::convert::Infallible; }
//! # impl embedded_hal::digital::OutputPin for Pin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # let (spi, cs_pin) = (Bus, Pin);
//!
//! // `spi` implements `Transport`, e.g. an `SpiBusTransport` around the HAL's `SpiBus`.
//! let bus: Mutex<NoopRawMutex, _> = Mutex::new(RefCell::new(spi));
//!
//! let mut buttons = Expander::initialize(
//!     HardwareAddress::new(0b001)?,
//!     &bus,
//!     ChipSelect::new(cs_pin),
//!     Port::A,
//!     Config::default(),
//! )?;
//!
//! // All of port A as pulled-up inputs
//! buttons.configure_direction(Port::A, 0xFF)?;
//! buttons.configure_pull_ups(Port::A, 0xFF)?;
//!
//! if let Progress::Complete(levels) = buttons.read_port(Port::A)? {
//!     assert_eq!(levels, 0b1000_0001);
//! }
//! # Ok::<(), mcp23s17_driver::ExpanderError>(())
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

/// Chip-select line handling.
pub mod chip_select;
/// Driver configuration.
pub mod config;
/// Error types.
pub mod error;
/// The device instance.
pub mod expander;
pub mod frame;
pub mod registers;
pub mod state;
pub mod transport;

pub use chip_select::ChipSelect;
pub use config::Config;
pub use error::{ExpanderError, TransportFault};
pub use expander::{Expander, InterruptMode, Progress};
pub use frame::HardwareAddress;
pub use registers::{Port, Register, RegisterAddress, IOCON};
pub use state::{Completion, CompletionSignal, State, Transaction};
pub use transport::{SharedTransport, SpiBusTransport, TransferMode, Transport};
