//! Host-side model of the UTIMER block and the NVIC.
//!
//! [`SimUtimer`] implements [`UtimerRegisters`] with plain storage plus the
//! behavior the driver relies on: start/stop/clear pulses, the running
//! status, write-1-to-clear interrupt flags and a fast-forwarding counter
//! model. [`SimNvic`] records what the driver did to each IRQ line.

use core::cell::Cell;

use hal::error::{HalError, HalResult};
use hal::interrupt::{InterruptController, InterruptPriority, IrqNumber};
use heapless::{FnvIndexMap, Vec};

use crate::channel::{Channel, CHANNEL_COUNT};
use crate::event::{IrqLine, IrqLines};
use crate::mode::Driver;
use crate::regs::{
    buf_op_ctrl, cntr_ctrl, compare_ctrl, ChannelReg, GlobalReg, UtimerRegisters,
};

/// Register-level model of a UTIMER block.
pub struct SimUtimer {
    global: [Cell<u32>; GlobalReg::COUNT],
    channels: [[Cell<u32>; ChannelReg::COUNT]; CHANNEL_COUNT],
    falling: [Cell<bool>; CHANNEL_COUNT],
    writes: Cell<usize>,
    stuck: Cell<bool>,
}

impl SimUtimer {
    /// Powers up with every driver output disabled, the rest zeroed.
    pub fn new() -> Self {
        Self {
            global: core::array::from_fn(|i| {
                Cell::new(if i == GlobalReg::DriverOen.index() { u32::MAX } else { 0 })
            }),
            channels: core::array::from_fn(|_| core::array::from_fn(|_| Cell::new(0))),
            falling: core::array::from_fn(|_| Cell::new(false)),
            writes: Cell::new(0),
            stuck: Cell::new(false),
        }
    }

    /// Register writes issued through [`UtimerRegisters`] so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Makes start and stop pulses ignored, as a wedged block would.
    pub fn set_stuck(&self, stuck: bool) {
        self.stuck.set(stuck);
    }

    pub fn is_running(&self, channel: Channel) -> bool {
        self.global(GlobalReg::CntrRunning) & channel.mask() != 0
    }

    /// Interrupt flags that are set and not masked.
    pub fn pending_lines(&self, channel: Channel) -> IrqLines {
        let flags = self.reg(channel, ChannelReg::Interrupt);
        let mask = self.reg(channel, ChannelReg::InterruptMask);
        IrqLines::from_bits(flags & !mask)
    }

    /// Sets an interrupt flag as the hardware would.
    pub fn raise(&self, channel: Channel, line: IrqLine) {
        let flags = self.reg(channel, ChannelReg::Interrupt);
        self.set_reg(channel, ChannelReg::Interrupt, flags | line.bit());
    }

    /// Latches the counter into a driver's capture register.
    pub fn capture(&self, channel: Channel, driver: Driver) {
        let (chain, line, field_shift) = match driver {
            Driver::A => (
                [ChannelReg::CaptureA, ChannelReg::CaptureABuf1, ChannelReg::CaptureABuf2],
                IrqLine::CaptureA,
                buf_op_ctrl::CAPTURE_A_BUF_OP_SHIFT,
            ),
            Driver::B => (
                [ChannelReg::CaptureB, ChannelReg::CaptureBBuf1, ChannelReg::CaptureBBuf2],
                IrqLine::CaptureB,
                buf_op_ctrl::CAPTURE_B_BUF_OP_SHIFT,
            ),
        };
        let buf_op = self.reg(channel, ChannelReg::BufOpCtrl);
        let depth = if buf_op & buf_op_ctrl::CAPTURE_BUF_EN != 0 {
            ((buf_op >> field_shift) & buf_op_ctrl::BUF_OP_FIELD_MASK) as usize
        } else {
            0
        };
        self.shift_chain(channel, &chain[..=depth.min(2)]);
        self.set_reg(channel, chain[0], self.reg(channel, ChannelReg::Cntr));
        self.raise(channel, line);
    }

    /// Runs a started channel for `ticks` counter clocks.
    pub fn advance(&self, channel: Channel, ticks: u64) {
        let mut remaining = ticks;
        while remaining > 0 && self.is_running(channel) {
            let ctrl = self.reg(channel, ChannelReg::CntrCtrl);
            let kind = (ctrl & cntr_ctrl::TYPE_MASK) >> cntr_ctrl::TYPE_SHIFT;
            let top = self.reg(channel, ChannelReg::CntrPtr);
            let cntr = self.reg(channel, ChannelReg::Cntr);
            let triangle = kind >= cntr_ctrl::TYPE_TRIANGLE_TROUGH;
            let down = if triangle {
                self.falling[channel.index() as usize].get()
            } else {
                ctrl & cntr_ctrl::DIR_DOWN != 0
            };

            if !down && cntr >= top {
                remaining -= 1;
                if triangle {
                    self.falling[channel.index() as usize].set(true);
                    self.set_reg(channel, ChannelReg::Cntr, top.saturating_sub(1));
                    self.raise(channel, IrqLine::Overflow);
                    if kind == cntr_ctrl::TYPE_TRIANGLE_TROUGH_CREST {
                        self.transfer_buffers(channel);
                    }
                } else {
                    self.set_reg(channel, ChannelReg::Cntr, 0);
                    self.raise(channel, IrqLine::Overflow);
                    self.end_of_cycle(channel, kind == cntr_ctrl::TYPE_SAWTOOTH_ONE_SHOT);
                }
            } else if down && cntr == 0 {
                remaining -= 1;
                self.raise(channel, IrqLine::Underflow);
                if triangle {
                    self.falling[channel.index() as usize].set(false);
                    self.set_reg(channel, ChannelReg::Cntr, top.min(1));
                    self.end_of_cycle(channel, kind == cntr_ctrl::TYPE_TRIANGLE_ONE_SHOT);
                } else {
                    self.set_reg(channel, ChannelReg::Cntr, top);
                    self.end_of_cycle(channel, kind == cntr_ctrl::TYPE_SAWTOOTH_ONE_SHOT);
                }
            } else if down {
                let step = remaining.min(u64::from(cntr)) as u32;
                remaining -= u64::from(step);
                let next = cntr - step;
                self.check_matches(channel, next, cntr - 1);
                self.set_reg(channel, ChannelReg::Cntr, next);
            } else {
                let step = remaining.min(u64::from(top - cntr)) as u32;
                remaining -= u64::from(step);
                let next = cntr + step;
                self.check_matches(channel, cntr + 1, next);
                self.set_reg(channel, ChannelReg::Cntr, next);
            }
        }
    }

    fn end_of_cycle(&self, channel: Channel, one_shot: bool) {
        self.transfer_buffers(channel);
        if one_shot {
            let running = self.global(GlobalReg::CntrRunning);
            self.set_global(GlobalReg::CntrRunning, running & !channel.mask());
        }
    }

    /// Raises compare lines whose value lies in `low..=high`.
    fn check_matches(&self, channel: Channel, low: u32, high: u32) {
        for (ctrl, value, line) in [
            (ChannelReg::CompareCtrlA, ChannelReg::CompareA, IrqLine::CaptureA),
            (ChannelReg::CompareCtrlB, ChannelReg::CompareB, IrqLine::CaptureB),
        ] {
            if self.reg(channel, ctrl) & compare_ctrl::COMPARE_EN == 0 {
                continue;
            }
            if (low..=high).contains(&self.reg(channel, value)) {
                self.raise(channel, line);
            }
        }
    }

    fn transfer_buffers(&self, channel: Channel) {
        let buf_op = self.reg(channel, ChannelReg::BufOpCtrl);
        if buf_op & buf_op_ctrl::CNTR_BUF_EN != 0 {
            let double = (buf_op & buf_op_ctrl::CNTR_BUF_OP_MASK) >> buf_op_ctrl::CNTR_BUF_OP_SHIFT == 2;
            let chain = [ChannelReg::CntrPtr, ChannelReg::CntrPtrBuf1, ChannelReg::CntrPtrBuf2];
            self.pull_chain(channel, if double { &chain } else { &chain[..2] });
        }
        for (ctrl, chain) in [
            (
                ChannelReg::CompareCtrlA,
                [ChannelReg::CompareA, ChannelReg::CompareABuf1, ChannelReg::CompareABuf2],
            ),
            (
                ChannelReg::CompareCtrlB,
                [ChannelReg::CompareB, ChannelReg::CompareBBuf1, ChannelReg::CompareBBuf2],
            ),
        ] {
            let bits = self.reg(channel, ctrl);
            if bits & compare_ctrl::BUF_EN != 0 {
                let len = if bits & compare_ctrl::BUF_DOUBLE != 0 { 3 } else { 2 };
                self.pull_chain(channel, &chain[..len]);
            }
        }
    }

    /// Moves each buffer one step towards the head of the chain.
    fn pull_chain(&self, channel: Channel, chain: &[ChannelReg]) {
        for pair in chain.windows(2) {
            self.set_reg(channel, pair[0], self.reg(channel, pair[1]));
        }
    }

    /// Moves each value one step towards the tail of the chain.
    fn shift_chain(&self, channel: Channel, chain: &[ChannelReg]) {
        for pair in chain.windows(2).rev() {
            self.set_reg(channel, pair[1], self.reg(channel, pair[0]));
        }
    }

    fn global(&self, reg: GlobalReg) -> u32 {
        self.global[reg.index()].get()
    }

    fn set_global(&self, reg: GlobalReg, value: u32) {
        self.global[reg.index()].set(value);
    }

    fn reg(&self, channel: Channel, reg: ChannelReg) -> u32 {
        self.channels[channel.index() as usize][reg.index()].get()
    }

    fn set_reg(&self, channel: Channel, reg: ChannelReg, value: u32) {
        self.channels[channel.index() as usize][reg.index()].set(value);
    }

    fn channels_in(mask: u32) -> impl Iterator<Item = Channel> {
        Channel::all().filter(move |c| mask & c.mask() != 0)
    }
}

impl Default for SimUtimer {
    fn default() -> Self {
        Self::new()
    }
}

impl UtimerRegisters for SimUtimer {
    fn read_global(&self, reg: GlobalReg) -> u32 {
        self.global(reg)
    }

    fn write_global(&self, reg: GlobalReg, value: u32) {
        self.writes.set(self.writes.get() + 1);
        match reg {
            GlobalReg::CntrStart => {
                if self.stuck.get() {
                    return;
                }
                let clocked = self.global(GlobalReg::ClockEnable);
                let mut running = self.global(GlobalReg::CntrRunning);
                for channel in Self::channels_in(value & clocked) {
                    if self.reg(channel, ChannelReg::CntrCtrl) & cntr_ctrl::EN != 0 {
                        running |= channel.mask();
                    }
                }
                self.set_global(GlobalReg::CntrRunning, running);
            }
            GlobalReg::CntrStop => {
                if !self.stuck.get() {
                    let running = self.global(GlobalReg::CntrRunning);
                    self.set_global(GlobalReg::CntrRunning, running & !value);
                }
            }
            GlobalReg::CntrClear => {
                for channel in Self::channels_in(value) {
                    self.set_reg(channel, ChannelReg::Cntr, 0);
                    self.falling[channel.index() as usize].set(false);
                }
            }
            GlobalReg::CntrRunning => {}
            GlobalReg::DriverOen | GlobalReg::ClockEnable => self.set_global(reg, value),
        }
    }

    fn read(&self, channel: Channel, reg: ChannelReg) -> u32 {
        self.reg(channel, reg)
    }

    fn write(&self, channel: Channel, reg: ChannelReg, value: u32) {
        self.writes.set(self.writes.get() + 1);
        match reg {
            ChannelReg::Interrupt => {
                let flags = self.reg(channel, reg);
                self.set_reg(channel, reg, flags & !value);
            }
            _ => self.set_reg(channel, reg, value),
        }
    }
}

/// State of one simulated NVIC line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NvicLine {
    pub enabled: bool,
    pub pending: bool,
    pub priority: InterruptPriority,
}

/// Number of IRQ lines [`SimNvic`] can track
pub const SIM_NVIC_LINES: usize = 256;

/// Interrupt controller model keyed by IRQ number.
#[derive(Default)]
pub struct SimNvic {
    lines: FnvIndexMap<IrqNumber, NvicLine, SIM_NVIC_LINES>,
}

impl SimNvic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self, irq: IrqNumber) -> NvicLine {
        self.lines.get(&irq).copied().unwrap_or_default()
    }

    pub fn is_enabled(&self, irq: IrqNumber) -> bool {
        self.line(irq).enabled
    }

    /// Priority of a line that has been programmed at least once.
    pub fn priority(&self, irq: IrqNumber) -> Option<InterruptPriority> {
        self.lines.get(&irq).map(|line| line.priority)
    }

    /// Marks a line pending, as a peripheral request would.
    pub fn pend(&mut self, irq: IrqNumber) -> HalResult<()> {
        self.entry(irq)?.pending = true;
        Ok(())
    }

    /// Enabled IRQ numbers in ascending order.
    pub fn enabled_irqs(&self) -> Vec<IrqNumber, SIM_NVIC_LINES> {
        let mut irqs: Vec<IrqNumber, SIM_NVIC_LINES> = self
            .lines
            .iter()
            .filter(|(_, line)| line.enabled)
            .map(|(irq, _)| *irq)
            .collect();
        irqs.sort_unstable();
        irqs
    }

    fn entry(&mut self, irq: IrqNumber) -> HalResult<&mut NvicLine> {
        if !self.lines.contains_key(&irq) {
            self.lines
                .insert(irq, NvicLine::default())
                .map_err(|_| HalError::HardwareError)?;
        }
        self.lines.get_mut(&irq).ok_or(HalError::HardwareError)
    }
}

impl InterruptController for SimNvic {
    fn enable_interrupt(&mut self, irq_num: IrqNumber) -> HalResult<()> {
        self.entry(irq_num)?.enabled = true;
        Ok(())
    }

    fn disable_interrupt(&mut self, irq_num: IrqNumber) -> HalResult<()> {
        self.entry(irq_num)?.enabled = false;
        Ok(())
    }

    fn set_priority(&mut self, irq_num: IrqNumber, priority: InterruptPriority) -> HalResult<()> {
        self.entry(irq_num)?.priority = priority;
        Ok(())
    }

    fn is_pending(&self, irq_num: IrqNumber) -> bool {
        self.line(irq_num).pending
    }

    fn clear_pending(&mut self, irq_num: IrqNumber) -> HalResult<()> {
        self.entry(irq_num)?.pending = false;
        Ok(())
    }
}
