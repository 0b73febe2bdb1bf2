//! NVIC interrupt controller

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::NVIC;
use hal::error::{HalError, HalResult};
use hal::interrupt::{InterruptController, InterruptPriority, IrqNumber};

/// Number of external interrupt lines an ARMv8-M NVIC can address.
pub const MAX_IRQ_LINES: IrqNumber = 480;

/// External interrupt line number understood by `cortex-m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NvicIrq(u16);

impl NvicIrq {
    /// Validates a raw IRQ number against the NVIC range.
    pub fn new(irq_num: IrqNumber) -> HalResult<Self> {
        if irq_num >= MAX_IRQ_LINES {
            return Err(HalError::InvalidParameter);
        }
        Ok(Self(irq_num as u16))
    }
}

// SAFETY: `NvicIrq::new` only admits numbers the NVIC implements.
unsafe impl InterruptNumber for NvicIrq {
    fn number(self) -> u16 {
        self.0
    }
}

/// NVIC wrapper implementing [`InterruptController`].
///
/// Priorities are given in the CMSIS `NVIC_SetPriority` convention, right
/// aligned, and shifted into the implemented upper bits of the priority byte.
pub struct Nvic {
    nvic: NVIC,
    prio_bits: u8,
}

impl Nvic {
    /// Wraps the NVIC peripheral of a core implementing `prio_bits` priority bits.
    pub fn new(nvic: NVIC, prio_bits: u8) -> Self {
        Self {
            nvic,
            prio_bits: prio_bits.min(8),
        }
    }

    /// Releases the NVIC peripheral.
    pub fn free(self) -> NVIC {
        self.nvic
    }
}

/// Converts a right-aligned priority into the NVIC priority byte.
pub fn hw_priority(priority: InterruptPriority, prio_bits: u8) -> u8 {
    if prio_bits == 0 {
        return 0;
    }
    let max = ((1u16 << prio_bits) - 1) as u8;
    priority.min(max) << (8 - prio_bits)
}

impl InterruptController for Nvic {
    fn enable_interrupt(&mut self, irq_num: IrqNumber) -> HalResult<()> {
        let line = NvicIrq::new(irq_num)?;
        // SAFETY: handlers for UTIMER lines are installed before routing enables them.
        unsafe { NVIC::unmask(line) };
        Ok(())
    }

    fn disable_interrupt(&mut self, irq_num: IrqNumber) -> HalResult<()> {
        NVIC::mask(NvicIrq::new(irq_num)?);
        Ok(())
    }

    fn set_priority(&mut self, irq_num: IrqNumber, priority: InterruptPriority) -> HalResult<()> {
        let line = NvicIrq::new(irq_num)?;
        let prio = hw_priority(priority, self.prio_bits);
        // SAFETY: priorities are only changed while the line is masked.
        unsafe { self.nvic.set_priority(line, prio) };
        Ok(())
    }

    fn is_pending(&self, irq_num: IrqNumber) -> bool {
        match NvicIrq::new(irq_num) {
            Ok(line) => NVIC::is_pending(line),
            Err(_) => false,
        }
    }

    fn clear_pending(&mut self, irq_num: IrqNumber) -> HalResult<()> {
        NVIC::unpend(NvicIrq::new(irq_num)?);
        Ok(())
    }
}
