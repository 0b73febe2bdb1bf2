//! Channel identity and role

use core::fmt;

use hal::{HalError, HalResult};

/// Number of channels in one UTIMER block.
pub const CHANNEL_COUNT: usize = 16;

/// First channel wired as a quadrature-encoder front-end.
pub const FIRST_QEC_CHANNEL: u8 = 12;

/// Role a channel plays inside the block. Fixed by hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelRole {
    /// General-purpose timer (channels 0-11)
    Timer,
    /// Quadrature-encoder counter (channels 12-15)
    Qec,
}

/// Validated channel index (0-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(u8);

impl Channel {
    /// Creates a channel handle, rejecting indices outside the block.
    pub const fn new(index: u8) -> HalResult<Self> {
        if (index as usize) < CHANNEL_COUNT {
            Ok(Self(index))
        } else {
            Err(HalError::InvalidParameter)
        }
    }

    /// Raw channel index
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Hardware role of the channel
    pub const fn role(self) -> ChannelRole {
        if self.0 >= FIRST_QEC_CHANNEL {
            ChannelRole::Qec
        } else {
            ChannelRole::Timer
        }
    }

    /// Whether the channel is a QEC front-end
    pub const fn is_qec(self) -> bool {
        matches!(self.role(), ChannelRole::Qec)
    }

    /// Offset of a QEC channel within the QEC bank (0-3).
    pub const fn qec_index(self) -> Option<u8> {
        if self.is_qec() {
            Some(self.0 - FIRST_QEC_CHANNEL)
        } else {
            None
        }
    }

    /// Single-bit mask used by the global per-channel registers.
    pub(crate) const fn mask(self) -> u32 {
        1 << self.0
    }

    /// Iterates over every channel of the block.
    pub fn all() -> impl Iterator<Item = Channel> {
        (0..CHANNEL_COUNT as u8).map(Channel)
    }
}

impl TryFrom<u8> for Channel {
    type Error = HalError;

    fn try_from(index: u8) -> HalResult<Self> {
        Self::new(index)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UTIMER{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Channel {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "UTIMER{}", self.0);
    }
}
