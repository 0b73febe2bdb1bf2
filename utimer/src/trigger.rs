//! Trigger bindings and the trigger-type translator

use hal::{HalError, HalResult};

use crate::channel::Channel;
use crate::regs::{fault_ctrl, ChannelReg};

/// Counter action performed when a trigger fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerTarget {
    Start,
    Stop,
    Clear,
    UpCount,
    DownCount,
    CaptureA,
    CaptureB,
    DmaClearA,
    DmaClearB,
}

/// Class of the trigger signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerSource {
    /// Global trigger inputs 0-15
    Global,
    /// Driver-output events of the neighbouring channel
    ChannelEvent,
    /// Fault inputs 0-3
    Fault,
    /// Counter pause levels
    Pause,
}

/// Concrete trigger selector.
///
/// Variants are grouped by [`TriggerSource`]; the order inside each group is
/// the bit order the hardware routing registers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TriggerType {
    GlobalTrig0Rising = 0,
    GlobalTrig0Falling,
    GlobalTrig1Rising,
    GlobalTrig1Falling,
    GlobalTrig2Rising,
    GlobalTrig2Falling,
    GlobalTrig3Rising,
    GlobalTrig3Falling,
    GlobalTrig4Rising,
    GlobalTrig4Falling,
    GlobalTrig5Rising,
    GlobalTrig5Falling,
    GlobalTrig6Rising,
    GlobalTrig6Falling,
    GlobalTrig7Rising,
    GlobalTrig7Falling,
    GlobalTrig8Rising,
    GlobalTrig8Falling,
    GlobalTrig9Rising,
    GlobalTrig9Falling,
    GlobalTrig10Rising,
    GlobalTrig10Falling,
    GlobalTrig11Rising,
    GlobalTrig11Falling,
    GlobalTrig12Rising,
    GlobalTrig12Falling,
    GlobalTrig13Rising,
    GlobalTrig13Falling,
    GlobalTrig14Rising,
    GlobalTrig14Falling,
    GlobalTrig15Rising,
    GlobalTrig15Falling,
    DriveARisingB0 = 32,
    DriveARisingB1,
    DriveAFallingB0,
    DriveAFallingB1,
    DriveBRisingA0,
    DriveBRisingA1,
    DriveBFallingA0,
    DriveBFallingA1,
    Fault0Rising = 40,
    Fault0Falling,
    Fault1Rising,
    Fault1Falling,
    Fault2Rising,
    Fault2Falling,
    Fault3Rising,
    Fault3Falling,
    PauseSrc0High = 48,
    PauseSrc0Low,
    PauseSrc1High,
    PauseSrc1Low,
}

const CHANNEL_EVENT_FIRST: u8 = TriggerType::DriveARisingB0 as u8;
const FAULT_FIRST: u8 = TriggerType::Fault0Rising as u8;
const PAUSE_FIRST: u8 = TriggerType::PauseSrc0High as u8;

/// Last global trigger a QEC channel can be bound to
pub const QEC_LAST_GLOBAL_TRIGGER: TriggerType = TriggerType::GlobalTrig3Falling;

impl TriggerType {
    /// Source class this selector belongs to
    pub const fn source(self) -> TriggerSource {
        let raw = self as u8;
        if raw < CHANNEL_EVENT_FIRST {
            TriggerSource::Global
        } else if raw < FAULT_FIRST {
            TriggerSource::ChannelEvent
        } else if raw < PAUSE_FIRST {
            TriggerSource::Fault
        } else {
            TriggerSource::Pause
        }
    }

    /// Bit pattern the routing register expects for this selector.
    ///
    /// Fault selectors yield the input's enable bit, plus its polarity bit
    /// for rising edges.
    pub const fn translate(self) -> u32 {
        let raw = self as u8;
        match self.source() {
            TriggerSource::Global => 1 << raw,
            TriggerSource::ChannelEvent => 1 << (raw - CHANNEL_EVENT_FIRST),
            TriggerSource::Fault => {
                let offset = raw - FAULT_FIRST;
                let input = (offset / 2) as u32;
                let rising = offset % 2 == 0;
                let enable = 1 << (fault_ctrl::ENABLE_SHIFT + input);
                if rising {
                    enable | 1 << (fault_ctrl::POLARITY_SHIFT + input)
                } else {
                    enable
                }
            }
            TriggerSource::Pause => 1 << (raw - PAUSE_FIRST),
        }
    }
}

/// One trigger-to-action association for a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerBinding {
    pub target: TriggerTarget,
    pub source: TriggerSource,
    pub trigger: TriggerType,
}

impl TriggerBinding {
    pub const fn new(target: TriggerTarget, source: TriggerSource, trigger: TriggerType) -> Self {
        Self {
            target,
            source,
            trigger,
        }
    }

    /// Binding on a global trigger input
    pub const fn global(target: TriggerTarget, trigger: TriggerType) -> Self {
        Self::new(target, TriggerSource::Global, trigger)
    }

    /// Checks the binding against its source class and the channel role.
    pub fn validate(&self, channel: Channel) -> HalResult<()> {
        if self.trigger.source() != self.source {
            return Err(HalError::InvalidParameter);
        }
        if channel.is_qec()
            && self.source == TriggerSource::Global
            && self.trigger as u8 > QEC_LAST_GLOBAL_TRIGGER as u8
        {
            return Err(HalError::InvalidParameter);
        }
        Ok(())
    }

    /// Register the translated pattern is written to
    pub const fn register(&self) -> ChannelReg {
        use TriggerTarget::*;
        let bank1 = matches!(self.source, TriggerSource::ChannelEvent);
        match self.source {
            TriggerSource::Fault => ChannelReg::FaultCtrl,
            TriggerSource::Pause => ChannelReg::PauseSrc,
            TriggerSource::Global | TriggerSource::ChannelEvent => match (self.target, bank1) {
                (Start, false) => ChannelReg::StartSrc0,
                (Start, true) => ChannelReg::StartSrc1,
                (Stop, false) => ChannelReg::StopSrc0,
                (Stop, true) => ChannelReg::StopSrc1,
                (Clear, false) => ChannelReg::ClearSrc0,
                (Clear, true) => ChannelReg::ClearSrc1,
                (UpCount, false) => ChannelReg::UpSrc0,
                (UpCount, true) => ChannelReg::UpSrc1,
                (DownCount, false) => ChannelReg::DownSrc0,
                (DownCount, true) => ChannelReg::DownSrc1,
                (CaptureA, false) => ChannelReg::CaptureASrc0,
                (CaptureA, true) => ChannelReg::CaptureASrc1,
                (CaptureB, false) => ChannelReg::CaptureBSrc0,
                (CaptureB, true) => ChannelReg::CaptureBSrc1,
                (DmaClearA, false) => ChannelReg::DmaClearASrc0,
                (DmaClearA, true) => ChannelReg::DmaClearASrc1,
                (DmaClearB, false) => ChannelReg::DmaClearBSrc0,
                (DmaClearB, true) => ChannelReg::DmaClearBSrc1,
            },
        }
    }
}
