//! Interrupt controller abstraction

use crate::error::HalResult;

/// Interrupt priority (0 = highest on most platforms)
pub type InterruptPriority = u8;

/// Physical interrupt line number as seen by the interrupt controller
pub type IrqNumber = u32;

/// Interrupt controller abstraction
pub trait InterruptController {
    /// Enable interrupt
    fn enable_interrupt(&mut self, irq_num: IrqNumber) -> HalResult<()>;

    /// Disable interrupt
    fn disable_interrupt(&mut self, irq_num: IrqNumber) -> HalResult<()>;

    /// Set interrupt priority
    fn set_priority(&mut self, irq_num: IrqNumber, priority: InterruptPriority) -> HalResult<()>;

    /// Check if interrupt is pending
    fn is_pending(&self, irq_num: IrqNumber) -> bool;

    /// Clear pending interrupt
    fn clear_pending(&mut self, irq_num: IrqNumber) -> HalResult<()>;
}
