//! Events reported to the application and the interrupt lines behind them

use crate::mode::CounterMode;

/// Event passed to a channel's callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum UtimerEvent {
    CaptureA = 0,
    CaptureB = 1,
    CompareA = 2,
    CompareB = 3,
    CompareABuf1 = 4,
    CompareABuf2 = 5,
    CompareBBuf1 = 6,
    CompareBBuf2 = 7,
    Underflow = 8,
    Overflow = 9,
}

impl UtimerEvent {
    /// Numeric event code
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Channel callback. Runs synchronously in interrupt context, so it must not block.
pub type SignalEvent = fn(UtimerEvent);

/// Hardware interrupt line of a channel. The discriminant is the bit
/// position in the channel's interrupt flag and mask registers and the
/// offset within the channel's IRQ group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IrqLine {
    /// Capture A, or compare A match
    CaptureA = 0,
    /// Capture B, or compare B match
    CaptureB = 1,
    /// Compare A buffer 1
    CaptureC = 2,
    /// Compare A buffer 2
    CaptureD = 3,
    /// Compare B buffer 1
    CaptureE = 4,
    /// Compare B buffer 2
    CaptureF = 5,
    Underflow = 6,
    Overflow = 7,
}

impl IrqLine {
    pub const ALL: [IrqLine; 8] = [
        IrqLine::CaptureA,
        IrqLine::CaptureB,
        IrqLine::CaptureC,
        IrqLine::CaptureD,
        IrqLine::CaptureE,
        IrqLine::CaptureF,
        IrqLine::Underflow,
        IrqLine::Overflow,
    ];

    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn bit(self) -> u32 {
        1 << self.index()
    }

    pub const fn from_index(index: u8) -> Option<Self> {
        if (index as usize) < Self::ALL.len() {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    /// Event reported for this line given the channel's cached mode.
    ///
    /// The A/B lines are shared by capture and compare; only a channel
    /// cached in [`CounterMode::Capturing`] reports captures.
    pub const fn event(self, mode: Option<CounterMode>) -> UtimerEvent {
        let capturing = matches!(mode, Some(CounterMode::Capturing));
        match self {
            IrqLine::CaptureA if capturing => UtimerEvent::CaptureA,
            IrqLine::CaptureA => UtimerEvent::CompareA,
            IrqLine::CaptureB if capturing => UtimerEvent::CaptureB,
            IrqLine::CaptureB => UtimerEvent::CompareB,
            IrqLine::CaptureC => UtimerEvent::CompareABuf1,
            IrqLine::CaptureD => UtimerEvent::CompareABuf2,
            IrqLine::CaptureE => UtimerEvent::CompareBBuf1,
            IrqLine::CaptureF => UtimerEvent::CompareBBuf2,
            IrqLine::Underflow => UtimerEvent::Underflow,
            IrqLine::Overflow => UtimerEvent::Overflow,
        }
    }
}

/// Set of interrupt lines of one channel, stored as the flag/mask bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqLines(u8);

impl IrqLines {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self(0xFF);

    pub const fn from_bits(bits: u32) -> Self {
        Self((bits & 0xFF) as u8)
    }

    pub const fn bits(self) -> u32 {
        self.0 as u32
    }

    pub const fn contains(self, line: IrqLine) -> bool {
        self.0 & (1 << line.index()) != 0
    }

    pub fn insert(&mut self, line: IrqLine) {
        self.0 |= 1 << line.index();
    }

    pub const fn with(self, line: IrqLine) -> Self {
        Self(self.0 | (1 << line.index()))
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Lines in bit order
    pub fn iter(self) -> impl Iterator<Item = IrqLine> {
        IrqLine::ALL.into_iter().filter(move |line| self.contains(*line))
    }
}

impl FromIterator<IrqLine> for IrqLines {
    fn from_iter<T: IntoIterator<Item = IrqLine>>(iter: T) -> Self {
        let mut lines = Self::EMPTY;
        for line in iter {
            lines.insert(line);
        }
        lines
    }
}
