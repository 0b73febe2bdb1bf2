//! Pin multiplexing for trigger inputs and driver outputs

use hal::error::{HalError, HalResult};
use hal::gpio::{GpioPin, PinMode};

use crate::channel::Channel;
use crate::mode::Driver;

/// Global trigger inputs a pin can feed.
pub const GLOBAL_TRIGGER_INPUTS: u8 = 16;

/// UTIMER signal carried by a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinSignal {
    /// External event feeding global trigger input `n`.
    TriggerInput(u8),
    /// Output of one driver of a timer channel.
    DriverOutput(Channel, Driver),
}

impl PinSignal {
    /// QEC channels never drive outputs, so only timer channels have
    /// driver pins.
    pub fn validate(self) -> HalResult<()> {
        match self {
            PinSignal::TriggerInput(n) if n >= GLOBAL_TRIGGER_INPUTS => {
                Err(HalError::InvalidParameter)
            }
            PinSignal::DriverOutput(channel, _) if channel.is_qec() => {
                Err(HalError::InvalidParameter)
            }
            _ => Ok(()),
        }
    }
}

/// Hands a pin to a UTIMER signal through alternate function `function`.
///
/// The pin is left untouched when the signal does not exist.
pub fn connect<P>(pin: &mut P, signal: PinSignal, function: u8) -> HalResult<()>
where
    P: GpioPin + ?Sized,
{
    signal.validate()?;
    pin.set_mode(PinMode::Alternate(function))?;
    trace!("pin {} -> {:?} (af {})", pin.pin_number(), signal, function);
    Ok(())
}
