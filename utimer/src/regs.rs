//! UTIMER register layer
//!
//! The block is a global register page followed by one 4 KiB page per
//! channel. Everything above this module talks to the hardware through
//! [`UtimerRegisters`], which keeps the driver testable against
//! [`crate::sim::SimUtimer`].

use core::ptr;

use crate::channel::Channel;
use crate::mode::{Counter, Driver};

/// Registers shared by all channels. One bit per channel unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GlobalReg {
    /// Write 1 to start counters
    CntrStart,
    /// Write 1 to stop counters
    CntrStop,
    /// Write 1 to clear counters
    CntrClear,
    /// Counter running status (read-only)
    CntrRunning,
    /// Driver output enable, active low, bits `2n` (A) and `2n + 1` (B)
    DriverOen,
    /// Channel clock gating
    ClockEnable,
}

impl GlobalReg {
    pub const COUNT: usize = 6;

    pub const fn offset(self) -> usize {
        self.index() * 4
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Registers of one channel page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelReg {
    StartSrc0,
    StartSrc1,
    StopSrc0,
    StopSrc1,
    ClearSrc0,
    ClearSrc1,
    UpSrc0,
    UpSrc1,
    DownSrc0,
    DownSrc1,
    CaptureASrc0,
    CaptureASrc1,
    CaptureBSrc0,
    CaptureBSrc1,
    DmaClearASrc0,
    DmaClearASrc1,
    DmaClearBSrc0,
    DmaClearBSrc1,
    PauseSrc,
    CntrCtrl,
    CompareCtrlA,
    CompareCtrlB,
    BufOpCtrl,
    Cntr,
    CntrPtr,
    CntrPtrBuf1,
    CntrPtrBuf2,
    CaptureA,
    CaptureABuf1,
    CaptureABuf2,
    CaptureB,
    CaptureBBuf1,
    CaptureBBuf2,
    CompareA,
    CompareABuf1,
    CompareABuf2,
    CompareB,
    CompareBBuf1,
    CompareBBuf2,
    DtUp,
    DtUpBuf1,
    DtDown,
    DtDownBuf1,
    DeadTimeCtrl,
    DutyCycleCtrl,
    FaultCtrl,
    /// Interrupt flags, write 1 to clear
    Interrupt,
    /// Interrupt mask, 1 = masked
    InterruptMask,
}

impl ChannelReg {
    pub const COUNT: usize = 48;

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Byte offset inside the channel page
    pub const fn offset(self) -> usize {
        use ChannelReg::*;
        match self {
            // trigger source selectors are packed from the start of the page
            StartSrc0 | StartSrc1 | StopSrc0 | StopSrc1 | ClearSrc0 | ClearSrc1 | UpSrc0
            | UpSrc1 | DownSrc0 | DownSrc1 | CaptureASrc0 | CaptureASrc1 | CaptureBSrc0
            | CaptureBSrc1 | DmaClearASrc0 | DmaClearASrc1 | DmaClearBSrc0 | DmaClearBSrc1
            | PauseSrc => self.index() * 4,
            CntrCtrl => 0x80,
            CompareCtrlA => 0x84,
            CompareCtrlB => 0x88,
            BufOpCtrl => 0x8C,
            Cntr => 0x100,
            CntrPtr => 0x104,
            CntrPtrBuf1 => 0x108,
            CntrPtrBuf2 => 0x10C,
            CaptureA => 0x110,
            CaptureABuf1 => 0x114,
            CaptureABuf2 => 0x118,
            CaptureB => 0x120,
            CaptureBBuf1 => 0x124,
            CaptureBBuf2 => 0x128,
            CompareA => 0x130,
            CompareABuf1 => 0x134,
            CompareABuf2 => 0x138,
            CompareB => 0x140,
            CompareBBuf1 => 0x144,
            CompareBBuf2 => 0x148,
            DtUp => 0x150,
            DtUpBuf1 => 0x154,
            DtDown => 0x158,
            DtDownBuf1 => 0x15C,
            DeadTimeCtrl => 0x180,
            DutyCycleCtrl => 0x184,
            FaultCtrl => 0x188,
            Interrupt => 0x1A0,
            InterruptMask => 0x1A4,
        }
    }

    pub(crate) const fn compare_ctrl(driver: Driver) -> Self {
        match driver {
            Driver::A => Self::CompareCtrlA,
            Driver::B => Self::CompareCtrlB,
        }
    }
}

impl Counter {
    /// Register backing this selector
    pub const fn register(self) -> ChannelReg {
        match self {
            Counter::Cntr => ChannelReg::Cntr,
            Counter::CntrPtr => ChannelReg::CntrPtr,
            Counter::CntrPtrBuf1 => ChannelReg::CntrPtrBuf1,
            Counter::CntrPtrBuf2 => ChannelReg::CntrPtrBuf2,
            Counter::DtUp => ChannelReg::DtUp,
            Counter::DtUpBuf1 => ChannelReg::DtUpBuf1,
            Counter::DtDown => ChannelReg::DtDown,
            Counter::DtDownBuf1 => ChannelReg::DtDownBuf1,
            Counter::CompareA => ChannelReg::CompareA,
            Counter::CompareB => ChannelReg::CompareB,
            Counter::CompareABuf1 => ChannelReg::CompareABuf1,
            Counter::CompareBBuf1 => ChannelReg::CompareBBuf1,
            Counter::CompareABuf2 => ChannelReg::CompareABuf2,
            Counter::CompareBBuf2 => ChannelReg::CompareBBuf2,
            Counter::CaptureA => ChannelReg::CaptureA,
            Counter::CaptureB => ChannelReg::CaptureB,
            Counter::CaptureABuf1 => ChannelReg::CaptureABuf1,
            Counter::CaptureBBuf1 => ChannelReg::CaptureBBuf1,
            Counter::CaptureABuf2 => ChannelReg::CaptureABuf2,
            Counter::CaptureBBuf2 => ChannelReg::CaptureBBuf2,
        }
    }
}

/// Byte offset of channel 0's page from the block base
pub const CHANNEL_PAGE_BASE: usize = 0x1000;
/// Size of one channel page
pub const CHANNEL_PAGE_SIZE: usize = 0x1000;

/// `CntrCtrl` fields
pub mod cntr_ctrl {
    pub const EN: u32 = 1 << 0;
    pub const TYPE_SHIFT: u32 = 4;
    pub const TYPE_MASK: u32 = 0x7 << TYPE_SHIFT;
    pub const TYPE_SAWTOOTH: u32 = 0;
    pub const TYPE_SAWTOOTH_ONE_SHOT: u32 = 1;
    pub const TYPE_TRIANGLE_TROUGH: u32 = 2;
    pub const TYPE_TRIANGLE_TROUGH_CREST: u32 = 3;
    pub const TYPE_TRIANGLE_ONE_SHOT: u32 = 4;
    pub const DIR_DOWN: u32 = 1 << 8;

    pub const fn counter_type(value: u32) -> u32 {
        (value << TYPE_SHIFT) & TYPE_MASK
    }
}

/// `CompareCtrlA`/`CompareCtrlB` fields
pub mod compare_ctrl {
    pub const DRV_MATCH_SHIFT: u32 = 0;
    pub const DRV_CYCLE_END_SHIFT: u32 = 2;
    pub const DRV_START_VAL: u32 = 1 << 4;
    pub const DRV_STOP_VAL: u32 = 1 << 5;
    pub const DRV_DISABLE_VAL: u32 = 1 << 6;
    pub const COMPARE_EN: u32 = 1 << 8;
    pub const DRV_EN: u32 = 1 << 9;
    pub const BUF_EVENT_CREST: u32 = 1 << 12;
    pub const BUF_EVENT_TROUGH: u32 = 1 << 13;
    pub const BUF_EN: u32 = 1 << 14;
    pub const BUF_DOUBLE: u32 = 1 << 15;
    pub const BUF_FORCE: u32 = 1 << 16;
    pub const DMA_CLEAR_EN: u32 = 1 << 20;
}

/// `BufOpCtrl` fields
pub mod buf_op_ctrl {
    pub const CNTR_BUF_EN: u32 = 1 << 0;
    pub const CNTR_BUF_OP_SHIFT: u32 = 1;
    pub const CNTR_BUF_OP_MASK: u32 = 0x3 << CNTR_BUF_OP_SHIFT;
    pub const CAPTURE_BUF_EN: u32 = 1 << 4;
    pub const CAPTURE_A_BUF_OP_SHIFT: u32 = 8;
    pub const CAPTURE_B_BUF_OP_SHIFT: u32 = 10;
    pub const BUF_OP_FIELD_MASK: u32 = 0x3;
}

/// `DeadTimeCtrl` fields
pub mod dead_time_ctrl {
    pub const DT_EN: u32 = 1 << 0;
    pub const DT_BUF_EN: u32 = 1 << 1;
}

/// `DutyCycleCtrl` fields
pub mod duty_cycle_ctrl {
    pub const EN_A: u32 = 1 << 0;
    pub const FULL_A: u32 = 1 << 1;
    pub const EN_B: u32 = 1 << 8;
    pub const FULL_B: u32 = 1 << 9;
}

/// `FaultCtrl` fields
pub mod fault_ctrl {
    pub const ENABLE_SHIFT: u32 = 0;
    pub const POLARITY_SHIFT: u32 = 4;
    pub const PERSISTENT: u32 = 1 << 8;
}

/// Bit of `GlobalReg::DriverOen` gating one output driver.
pub const fn driver_oen_bit(channel: Channel, driver: Driver) -> u32 {
    let shift = channel.index() as u32 * 2;
    match driver {
        Driver::A => 1 << shift,
        Driver::B => 1 << (shift + 1),
    }
}

/// Register access used by the driver.
///
/// Implementations take `&self`: accesses go to hardware (or a model of it)
/// and are shared between thread mode and interrupt handlers.
pub trait UtimerRegisters {
    /// Read a global register
    fn read_global(&self, reg: GlobalReg) -> u32;

    /// Write a global register
    fn write_global(&self, reg: GlobalReg, value: u32);

    /// Read a channel register
    fn read(&self, channel: Channel, reg: ChannelReg) -> u32;

    /// Write a channel register
    fn write(&self, channel: Channel, reg: ChannelReg, value: u32);

    /// Read-modify-write a channel register
    fn modify<F: FnOnce(u32) -> u32>(&self, channel: Channel, reg: ChannelReg, f: F) {
        let value = self.read(channel, reg);
        self.write(channel, reg, f(value));
    }

    /// OR `bits` into a channel register
    fn set_bits(&self, channel: Channel, reg: ChannelReg, bits: u32) {
        self.modify(channel, reg, |v| v | bits);
    }

    /// Clear `bits` in a channel register
    fn clear_bits(&self, channel: Channel, reg: ChannelReg, bits: u32) {
        self.modify(channel, reg, |v| v & !bits);
    }

    /// OR `bits` into a global register
    fn set_global_bits(&self, reg: GlobalReg, bits: u32) {
        let value = self.read_global(reg);
        self.write_global(reg, value | bits);
    }

    /// Clear `bits` in a global register
    fn clear_global_bits(&self, reg: GlobalReg, bits: u32) {
        let value = self.read_global(reg);
        self.write_global(reg, value & !bits);
    }
}

/// Memory-mapped UTIMER block.
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Creates an accessor for the block at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the address of a UTIMER block and no other accessor
    /// for the same block may exist.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the block
    pub const fn base(&self) -> usize {
        self.base
    }

    fn global_ptr(&self, reg: GlobalReg) -> *mut u32 {
        (self.base + reg.offset()) as *mut u32
    }

    fn channel_ptr(&self, channel: Channel, reg: ChannelReg) -> *mut u32 {
        let page = CHANNEL_PAGE_BASE + channel.index() as usize * CHANNEL_PAGE_SIZE;
        (self.base + page + reg.offset()) as *mut u32
    }
}

impl UtimerRegisters for Mmio {
    fn read_global(&self, reg: GlobalReg) -> u32 {
        // SAFETY: address lies inside the block handed to `Mmio::new`.
        unsafe { ptr::read_volatile(self.global_ptr(reg)) }
    }

    fn write_global(&self, reg: GlobalReg, value: u32) {
        // SAFETY: see `read_global`.
        unsafe { ptr::write_volatile(self.global_ptr(reg), value) }
    }

    fn read(&self, channel: Channel, reg: ChannelReg) -> u32 {
        // SAFETY: see `read_global`.
        unsafe { ptr::read_volatile(self.channel_ptr(channel, reg)) }
    }

    fn write(&self, channel: Channel, reg: ChannelReg, value: u32) {
        // SAFETY: see `read_global`.
        unsafe { ptr::write_volatile(self.channel_ptr(channel, reg), value) }
    }
}
