//! Counter modes, directions and addressable counter registers

/// Operating mode of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CounterMode {
    /// Free-running counter, outputs toggle on cycle boundaries
    Basic,
    /// Basic mode with pointer buffering (single or double)
    Buffering,
    /// Counter driven by trigger inputs only, no output drive
    Triggering,
    /// Input capture into capture registers
    Capturing,
    /// Output compare on drivers A and B
    Comparing,
    /// Complementary outputs with dead-time insertion
    DeadTime,
}

impl CounterMode {
    /// Modes a QEC channel can run in
    pub const fn allowed_on_qec(self) -> bool {
        matches!(self, Self::Triggering | Self::Capturing)
    }

    /// Whether the mode drives the output pins
    pub const fn drives_outputs(self) -> bool {
        !matches!(self, Self::Triggering | Self::Capturing)
    }
}

/// Counting direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CounterDirection {
    /// Sawtooth counting up, overflow at the pointer value
    Up,
    /// Sawtooth counting down, underflow at zero
    Down,
    /// Up to the pointer (crest) then down to zero (trough)
    Triangle,
}

/// Output driver of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Driver {
    A,
    B,
}

/// Counter-related register selector used by `set_count`/`get_count`.
///
/// Which selectors are meaningful depends on the configured mode; the driver
/// does not police that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Counter {
    Cntr,
    CntrPtr,
    CntrPtrBuf1,
    CntrPtrBuf2,
    DtUp,
    DtUpBuf1,
    DtDown,
    DtDownBuf1,
    CompareA,
    CompareB,
    CompareABuf1,
    CompareBBuf1,
    CompareABuf2,
    CompareBBuf2,
    CaptureA,
    CaptureB,
    CaptureABuf1,
    CaptureBBuf1,
    CaptureABuf2,
    CaptureBBuf2,
}

impl Counter {
    /// Every selector, in CMSIS enumeration order.
    pub const ALL: [Counter; 20] = [
        Counter::Cntr,
        Counter::CntrPtr,
        Counter::CntrPtrBuf1,
        Counter::CntrPtrBuf2,
        Counter::DtUp,
        Counter::DtUpBuf1,
        Counter::DtDown,
        Counter::DtDownBuf1,
        Counter::CompareA,
        Counter::CompareB,
        Counter::CompareABuf1,
        Counter::CompareBBuf1,
        Counter::CompareABuf2,
        Counter::CompareBBuf2,
        Counter::CaptureA,
        Counter::CaptureB,
        Counter::CaptureABuf1,
        Counter::CaptureBBuf1,
        Counter::CaptureABuf2,
        Counter::CaptureBBuf2,
    ];
}
