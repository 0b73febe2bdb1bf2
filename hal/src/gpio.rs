//! GPIO (General Purpose Input/Output) abstraction
//!
//! Timer drivers only need a pin to be handed over to one of its alternate
//! functions; plain input/output use is kept for board bring-up code.

use crate::error::HalResult;

/// GPIO pin modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Input (floating)
    Input,
    /// Input with pull-up resistor
    InputPullUp,
    /// Input with pull-down resistor
    InputPullDown,
    /// Output (push-pull)
    Output,
    /// Output (open-drain)
    OutputOpenDrain,
    /// Alternate function (vendor-specific pin-mux selector)
    Alternate(u8),
}

/// GPIO pin levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Low level (0V)
    Low,
    /// High level (VCC)
    High,
}

/// GPIO pin trait (object-safe)
pub trait GpioPin {
    /// Configure pin mode
    fn set_mode(&mut self, mode: PinMode) -> HalResult<()>;

    /// Read current level
    fn read(&self) -> HalResult<Level>;

    /// Write level (for output pins)
    fn write(&mut self, level: Level) -> HalResult<()>;

    /// Toggle output
    fn toggle(&mut self) -> HalResult<()> {
        let current = self.read()?;
        let new_level = match current {
            Level::Low => Level::High,
            Level::High => Level::Low,
        };
        self.write(new_level)
    }

    /// Get pin number
    fn pin_number(&self) -> u32;
}
