//! CMSIS power states

/// Power state requested through a driver's power control operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Power off: no operation possible
    Off,
    /// Low-power mode: retain state, detect and signal wake-up events
    Low,
    /// Power on: full operation at maximum performance
    Full,
}
