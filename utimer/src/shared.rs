//! Shared access from thread mode and interrupt handlers
//!
//! A board crate places one [`SharedUtimer`] in a `static`, installs the
//! driver once during bring-up and reaches it from both contexts.
//!
//! ```ignore
//! static UTIMER: SharedUtimer<Mmio, Nvic> = SharedUtimer::new();
//!
//! #[interrupt]
//! fn QEC0_CAPTURE_A() {
//!     let _ = UTIMER.dispatch_irq(QEC0_CAPTURE_A_IRQ);
//! }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use hal::error::{HalError, HalResult};
use hal::interrupt::IrqNumber;

use crate::driver::Utimer;
use crate::regs::UtimerRegisters;

/// Driver slot guarded by a critical section
pub struct SharedUtimer<R, I> {
    inner: Mutex<RefCell<Option<Utimer<R, I>>>>,
}

impl<R, I> SharedUtimer<R, I> {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Installs the driver, handing back any previous one.
    pub fn install(&self, utimer: Utimer<R, I>) -> Option<Utimer<R, I>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(utimer))
    }

    /// Removes the driver from the slot.
    pub fn take(&self) -> Option<Utimer<R, I>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }

    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).is_some())
    }

    /// Runs `f` with exclusive access to the driver.
    ///
    /// Fails with `InvalidState` when nothing is installed or when the
    /// driver is already borrowed, as it is from inside an event callback.
    pub fn with<F, T>(&self, f: F) -> HalResult<T>
    where
        F: FnOnce(&mut Utimer<R, I>) -> T,
    {
        critical_section::with(|cs| {
            let mut slot = self
                .inner
                .borrow(cs)
                .try_borrow_mut()
                .map_err(|_| HalError::InvalidState)?;
            let utimer = slot.as_mut().ok_or(HalError::InvalidState)?;
            Ok(f(utimer))
        })
    }

    /// Runs `f` with shared access to the driver.
    ///
    /// Usable from event callbacks, since dispatch only holds a shared borrow.
    pub fn with_ref<F, T>(&self, f: F) -> HalResult<T>
    where
        F: FnOnce(&Utimer<R, I>) -> T,
    {
        critical_section::with(|cs| {
            let slot = self
                .inner
                .borrow(cs)
                .try_borrow()
                .map_err(|_| HalError::InvalidState)?;
            let utimer = slot.as_ref().ok_or(HalError::InvalidState)?;
            Ok(f(utimer))
        })
    }
}

impl<R: UtimerRegisters, I> SharedUtimer<R, I> {
    /// Dispatches a physical IRQ to the installed driver.
    pub fn dispatch_irq(&self, irq: IrqNumber) -> HalResult<()> {
        self.with_ref(|utimer| utimer.dispatch_irq(irq))?
    }
}

impl<R, I> Default for SharedUtimer<R, I> {
    fn default() -> Self {
        Self::new()
    }
}
