use embedded_hal::digital::{Error as _, OutputPin};

use crate::error::TransportFault;

/// The chip-select line of one expander.
///
/// The MCP23S17 `CS` input is active low. [`ChipSelect::active_high`] is for
/// boards that put an inverting buffer in front of it.
pub struct ChipSelect<CS> {
    pin: CS,
    active_high: bool,
    selected: bool,
}

impl<CS: OutputPin> ChipSelect<CS> {
    /// Active-low chip-select.
    pub fn new(pin: CS) -> Self {
        Self {
            pin,
            active_high: false,
            selected: false,
        }
    }

    #[allow(missing_docs)]
    pub fn active_high(pin: CS) -> Self {
        Self {
            pin,
            active_high: true,
            selected: false,
        }
    }

    /// Drive the line to its active level.
    pub fn select(&mut self) -> Result<(), TransportFault> {
        self.drive(true)?;
        self.selected = true;
        Ok(())
    }

    /// Restore the inactive level.
    pub fn deselect(&mut self) -> Result<(), TransportFault> {
        self.drive(false)?;
        self.selected = false;
        Ok(())
    }

    /// Whether the line was last driven active.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Give the pin back.
    pub fn into_inner(self) -> CS {
        self.pin
    }

    fn drive(&mut self, active: bool) -> Result<(), TransportFault> {
        let result = if active == self.active_high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|e| TransportFault::ChipSelect(e.kind()))
    }
}
