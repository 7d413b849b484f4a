use crate::registers::IOCON;
use crate::transport::{TransferMode, DEFAULT_TIMEOUT_MS};

/// `DEFVAL` programmed for the initialized port when interrupt-on-change is on.
pub const INTERRUPT_DEFAULT_VALUE: u8 = 0x01;

/// Per-device settings.
///
/// ```
/// use mcp23s17_driver::{Config, TransferMode};
///
/// let config = Config::default()
///     .with_mode(TransferMode::Interrupt)
///     .with_timeout_ms(20);
/// assert!(!config.interrupt_on_change);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Polling or interrupt-driven transfers.
    pub mode: TransferMode,
    /// Timeout handed to every blocking transport call. Enforcing it is up to
    /// the [`Transport`](crate::Transport). [`SpiBusTransport`](crate::SpiBusTransport)
    /// ignores it and relies on whatever the HAL does.
    pub timeout_ms: u32,
    /// Program `DEFVAL` and enable interrupt-on-change for all eight pins of
    /// the port given to [`Expander::initialize`](crate::Expander::initialize).
    pub interrupt_on_change: bool,
    /// `IOCON` value written during initialization. `HAEN` is always added
    /// and `BANK` always cleared.
    pub iocon: IOCON,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: TransferMode::Polling,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            interrupt_on_change: false,
            iocon: IOCON::DEFAULT,
        }
    }
}

impl Config {
    /// Interrupt-driven transfers with interrupt-on-change enabled.
    pub fn interrupt_driven() -> Self {
        Self {
            mode: TransferMode::Interrupt,
            interrupt_on_change: true,
            ..Self::default()
        }
    }

    #[allow(missing_docs)]
    pub fn with_mode(mut self, mode: TransferMode) -> Self {
        self.mode = mode;
        self
    }

    #[allow(missing_docs)]
    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    #[allow(missing_docs)]
    pub fn with_interrupt_on_change(mut self, enabled: bool) -> Self {
        self.interrupt_on_change = enabled;
        self
    }

    #[allow(missing_docs)]
    pub fn with_iocon(mut self, iocon: IOCON) -> Self {
        self.iocon = iocon;
        self
    }

    /// The `IOCON` byte actually written. `HAEN` is always set. `BANK` is
    /// always cleared since register addresses assume the interleaved layout.
    pub fn iocon_value(&self) -> u8 {
        ((self.iocon | IOCON::HAEN) - IOCON::BANK).bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.mode, TransferMode::Polling);
        assert_eq!(config.timeout_ms, 100);
        assert_eq!(config.iocon_value(), 0b0001_1010);
    }

    #[test]
    fn haen_is_forced() {
        let config = Config::default().with_iocon(IOCON::MIRROR);
        assert_eq!(config.iocon_value(), 0b0100_1000);
    }

    #[test]
    fn bank_is_cleared() {
        let config = Config::default().with_iocon(IOCON::BANK | IOCON::INTPOL);
        assert_eq!(config.iocon_value() & IOCON::BANK.bits(), 0);
        assert_eq!(config.iocon_value(), 0b0000_1010);
    }

    #[test]
    fn interrupt_preset() {
        let config = Config::interrupt_driven();
        assert_eq!(config.mode, TransferMode::Interrupt);
        assert!(config.interrupt_on_change);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }
}
