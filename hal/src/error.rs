//! Common error types for HAL operations

use core::fmt;

/// CMSIS-Driver status: unspecified error.
pub const ARM_DRIVER_ERROR: i32 = -1;
/// CMSIS-Driver status: operation not supported.
pub const ARM_DRIVER_ERROR_UNSUPPORTED: i32 = -4;
/// CMSIS-Driver status: parameter error.
pub const ARM_DRIVER_ERROR_PARAMETER: i32 = -5;

/// HAL operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Invalid parameter provided
    InvalidParameter,
    /// Operation not supported by this implementation
    NotSupported,
    /// Operation issued before the peripheral reached the required state
    InvalidState,
    /// Hardware did not reach the state a register write asked for
    HardwareError,
}

impl HalError {
    /// CMSIS-Driver status code for this error.
    pub const fn status_code(self) -> i32 {
        match self {
            Self::InvalidParameter => ARM_DRIVER_ERROR_PARAMETER,
            Self::NotSupported => ARM_DRIVER_ERROR_UNSUPPORTED,
            Self::InvalidState | Self::HardwareError => ARM_DRIVER_ERROR,
        }
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::NotSupported => write!(f, "operation not supported"),
            Self::InvalidState => write!(f, "peripheral not in required state"),
            Self::HardwareError => write!(f, "hardware error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidParameter => defmt::write!(fmt, "InvalidParameter"),
            Self::NotSupported => defmt::write!(fmt, "NotSupported"),
            Self::InvalidState => defmt::write!(fmt, "InvalidState"),
            Self::HardwareError => defmt::write!(fmt, "HardwareError"),
        }
    }
}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;
