//! SPI framing.
//!
//! Every transaction starts with a control byte followed by the register address:
//!
//! ```text
//!   7   6   5   4   3    2    1    0
//! | 0 | 1 | 0 | 0 | A2 | A1 | A0 | R/W |
//! ```
//!
//! The four fixed bits identify the device type, `A2..A0` are the hardware
//! address strapped on the chip (only honoured once `IOCON.HAEN` is set) and
//! `R/W` is 1 for a read.

use crate::error::ExpanderError;
use crate::registers::{Port, Register, RegisterAddress};

/// Upper four fixed bits of the control byte (`0100`).
pub const CONTROL_PREFIX: u8 = 0b0100_0000;

/// The 3-bit hardware address set by the `A2`, `A1`, `A0` pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HardwareAddress(u8);

impl HardwareAddress {
    /// Hardware address space is three bits wide so 0-7 are valid.
    pub const MAX: u8 = 0b111;

    /// Create a hardware address, bounds-checking that it is valid.
    pub const fn new(address: u8) -> Result<Self, ExpanderError> {
        if address <= Self::MAX {
            Ok(Self(address))
        } else {
            Err(ExpanderError::Parameter)
        }
    }

    /// The address bits, right aligned.
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for HardwareAddress {
    type Error = ExpanderError;

    fn try_from(address: u8) -> Result<Self, Self::Error> {
        HardwareAddress::new(address)
    }
}

impl From<HardwareAddress> for u8 {
    fn from(address: HardwareAddress) -> Self {
        address.0
    }
}

/// Direction of a transaction, the `R/W` bit of the control byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    #[allow(missing_docs)]
    Write = 0,
    #[allow(missing_docs)]
    Read = 1,
}

/// Control byte for talking to the chip at `address`.
pub const fn control_byte(address: HardwareAddress, direction: Direction) -> u8 {
    CONTROL_PREFIX | (address.bits() << 1) | direction as u8
}

/// The pair of control bytes used by one device.
///
/// Computed once from the device's own hardware address when the device is
/// created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlBytes {
    /// Control byte with `R/W = 1`.
    pub read: u8,
    /// Control byte with `R/W = 0`.
    pub write: u8,
}

impl ControlBytes {
    #[allow(missing_docs)]
    pub const fn for_address(address: HardwareAddress) -> Self {
        Self {
            read: control_byte(address, Direction::Read),
            write: control_byte(address, Direction::Write),
        }
    }

    /// The control byte for `direction`.
    pub const fn get(self, direction: Direction) -> u8 {
        match direction {
            Direction::Read => self.read,
            Direction::Write => self.write,
        }
    }

    /// Resolve a logical (port, register) pair into the two-byte command prefix
    /// `[control, address]` shared by all frames.
    pub const fn command(self, register: Register, port: Port, direction: Direction) -> [u8; 2] {
        [self.get(direction), RegisterAddress::new(register, port).addr()]
    }
}

/// `[control, register, data]`
pub const fn write_frame(control: ControlBytes, register: RegisterAddress, data: u8) -> [u8; 3] {
    [control.write, register.addr(), data]
}

/// `[control, register]`. The data byte is clocked in by a following read
/// while chip-select stays asserted.
pub const fn read_frame(control: ControlBytes, register: RegisterAddress) -> [u8; 2] {
    [control.read, register.addr()]
}
