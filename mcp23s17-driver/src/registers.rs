//! Register map of the MCP23S17.
//!
//! Addresses follow the "interleaved" layout (`IOCON.BANK = 0`): every register
//! exists once per port, bank A at the even address and bank B at the odd one
//! directly after it.

use bitflags::bitflags;

use crate::error::ExpanderError;

/// One of the two 8-pin GPIO ports (banks) of the chip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Port {
    /// `GPA0`..`GPA7`
    A = 0,
    /// `GPB0`..`GPB7`
    B = 1,
}

impl Port {
    /// Offset added to a register's bank A address to reach this port's copy.
    pub const fn offset(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Port {
    type Error = ExpanderError;

    fn try_from(port: u8) -> Result<Self, Self::Error> {
        match port {
            0 => Ok(Port::A),
            1 => Ok(Port::B),
            _ => Err(ExpanderError::Parameter),
        }
    }
}

/// The registers present in each bank, in address order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    /// I/O direction (`IODIR`). 1 = input, 0 = output.
    Direction = 0,
    /// Input polarity (`IPOL`). 1 = `GPIO` bit reflects the inverted pin level.
    Polarity = 1,
    /// Interrupt-on-change enable (`GPINTEN`).
    InterruptEnable = 2,
    /// Default compare value for interrupt-on-change (`DEFVAL`).
    DefaultValue = 3,
    /// Interrupt control (`INTCON`). 1 = compare against `DEFVAL`, 0 = against the previous value.
    InterruptControl = 4,
    /// I/O configuration (`IOCON`). Both addresses alias the same register.
    IoConfig = 5,
    /// Pull-up enable (`GPPU`), 100k internal resistor.
    PullUp = 6,
    /// Interrupt flag (`INTF`), read-only.
    InterruptFlag = 7,
    /// Interrupt capture (`INTCAP`), read-only.
    InterruptCapture = 8,
    /// Port value (`GPIO`). Writes go to the output latch.
    Gpio = 9,
    /// Output latch (`OLAT`).
    OutputLatch = 10,
}

impl Register {
    /// All registers in address order.
    pub const ALL: [Register; 11] = [
        Register::Direction,
        Register::Polarity,
        Register::InterruptEnable,
        Register::DefaultValue,
        Register::InterruptControl,
        Register::IoConfig,
        Register::PullUp,
        Register::InterruptFlag,
        Register::InterruptCapture,
        Register::Gpio,
        Register::OutputLatch,
    ];

    /// Position of the register within a bank.
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// `INTF` and `INTCAP` are updated by the chip only.
    pub const fn is_read_only(self) -> bool {
        matches!(self, Register::InterruptFlag | Register::InterruptCapture)
    }
}

/// An 8-bit register address inside the chip.
///
/// Only constructible from a ([`Register`], [`Port`]) pair or a checked raw byte,
/// so it always names a register that exists.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterAddress(u8);

#[allow(missing_docs)]
impl RegisterAddress {
    pub const IODIRA: Self = Self::new(Register::Direction, Port::A);
    pub const IODIRB: Self = Self::new(Register::Direction, Port::B);
    pub const IPOLA: Self = Self::new(Register::Polarity, Port::A);
    pub const IPOLB: Self = Self::new(Register::Polarity, Port::B);
    pub const GPINTENA: Self = Self::new(Register::InterruptEnable, Port::A);
    pub const GPINTENB: Self = Self::new(Register::InterruptEnable, Port::B);
    pub const DEFVALA: Self = Self::new(Register::DefaultValue, Port::A);
    pub const DEFVALB: Self = Self::new(Register::DefaultValue, Port::B);
    pub const INTCONA: Self = Self::new(Register::InterruptControl, Port::A);
    pub const INTCONB: Self = Self::new(Register::InterruptControl, Port::B);
    pub const IOCONA: Self = Self::new(Register::IoConfig, Port::A);
    pub const IOCONB: Self = Self::new(Register::IoConfig, Port::B);
    pub const GPPUA: Self = Self::new(Register::PullUp, Port::A);
    pub const GPPUB: Self = Self::new(Register::PullUp, Port::B);
    pub const INTFA: Self = Self::new(Register::InterruptFlag, Port::A);
    pub const INTFB: Self = Self::new(Register::InterruptFlag, Port::B);
    pub const INTCAPA: Self = Self::new(Register::InterruptCapture, Port::A);
    pub const INTCAPB: Self = Self::new(Register::InterruptCapture, Port::B);
    pub const GPIOA: Self = Self::new(Register::Gpio, Port::A);
    pub const GPIOB: Self = Self::new(Register::Gpio, Port::B);
    pub const OLATA: Self = Self::new(Register::OutputLatch, Port::A);
    pub const OLATB: Self = Self::new(Register::OutputLatch, Port::B);
}

impl RegisterAddress {
    /// Highest valid address (`OLATB`).
    pub const MAX: u8 = 0x15;

    /// Address of `register` in the bank belonging to `port`.
    pub const fn new(register: Register, port: Port) -> Self {
        Self(2 * register.index() + port.offset())
    }

    /// The raw byte sent as the second byte of every frame.
    pub const fn addr(self) -> u8 {
        self.0
    }

    /// Which register this is, independent of the bank.
    pub const fn register(self) -> Register {
        Register::ALL[(self.0 / 2) as usize]
    }

    /// Which bank the address lives in.
    pub const fn port(self) -> Port {
        if self.0 & 1 == 0 {
            Port::A
        } else {
            Port::B
        }
    }
}

impl TryFrom<u8> for RegisterAddress {
    type Error = ExpanderError;

    fn try_from(addr: u8) -> Result<Self, Self::Error> {
        if addr <= Self::MAX {
            Ok(Self(addr))
        } else {
            Err(ExpanderError::Parameter)
        }
    }
}

impl From<RegisterAddress> for u8 {
    fn from(address: RegisterAddress) -> Self {
        address.0
    }
}

impl core::fmt::Debug for RegisterAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}{:?}(0x{:02x})", self.register(), self.port(), self.0)
    }
}

bitflags! {
    /// I/O Expander Configuration Register (`IOCON`) bit definitions.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct IOCON: u8 {
        /// Controls how the registers are addressed:
        ///
        ///   1 = The registers associated with each port are separated into different
        ///       banks. (*Not supported, cleared by [`Config::iocon_value`](crate::Config::iocon_value).*)
        ///
        ///   0 = The registers are in the same bank (addresses are interleaved).
        const BANK = 0b1000_0000;

        /// `INT` Pins Mirror bit:
        ///
        ///   1 = The `INT` pins are internally connected.
        ///
        ///   0 = `INTA` is associated with `PORTA` and `INTB` with `PORTB`.
        const MIRROR = 0b0100_0000;

        /// Sequential Operation mode bit:
        ///
        ///   1 = Sequential operation disabled, address pointer does not increment.
        ///
        ///   0 = Sequential operation enabled, address pointer increments.
        const SEQOP = 0b0010_0000;

        /// Slew Rate control bit for SDA output (I2C variant only).
        const DISSLW = 0b0001_0000;

        /// Hardware Address Enable bit:
        ///
        ///   1 = Enables the address pins A2, A1, A0.
        ///
        ///   0 = Disables the address pins.
        const HAEN = 0b0000_1000;

        /// Configures the `INT` pin as an open-drain output (overrides `INTPOL`).
        const ODR = 0b0000_0100;

        /// Polarity of the `INT` output pin. 1 = active-high, 0 = active-low.
        const INTPOL = 0b0000_0010;
    }
}

impl IOCON {
    /// Value programmed by default during initialization: active-high `INT`,
    /// hardware addressing on, slew-rate control off, sequential mode on.
    pub const DEFAULT: IOCON = IOCON::INTPOL.union(IOCON::HAEN).union(IOCON::DISSLW);
}
