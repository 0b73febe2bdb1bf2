//! Event dispatch
//!
//! Interrupt handlers only need shared access: they clear the flag that
//! fired and call the channel's callback with the event it stands for.

use hal::error::{HalError, HalResult};
use hal::interrupt::IrqNumber;

use crate::channel::Channel;
use crate::driver::Utimer;
use crate::event::{IrqLine, IrqLines};
use crate::regs::{ChannelReg, UtimerRegisters};
use crate::routing;

impl<R: UtimerRegisters, I> Utimer<R, I> {
    /// Services one interrupt line of a channel.
    ///
    /// The flag is cleared before the callback runs, so an event raised
    /// again from inside the callback is not lost.
    pub fn handle_interrupt(&self, channel: Channel, line: IrqLine) {
        self.regs.write(channel, ChannelReg::Interrupt, line.bit());

        let info = self.info(channel);
        if let Some(callback) = info.callback {
            callback(line.event(info.mode));
        }
    }

    /// Services the line behind a physical IRQ number.
    pub fn dispatch_irq(&self, irq: IrqNumber) -> HalResult<()> {
        let (channel, line) =
            routing::locate(&self.config, irq).ok_or(HalError::InvalidParameter)?;
        self.handle_interrupt(channel, line);
        Ok(())
    }

    /// Services every flagged, unmasked line of a channel in line order
    /// and returns the lines that were handled.
    pub fn poll(&self, channel: Channel) -> IrqLines {
        let flags = self.regs.read(channel, ChannelReg::Interrupt);
        let mask = self.regs.read(channel, ChannelReg::InterruptMask);
        let pending = IrqLines::from_bits(flags & !mask);
        for line in pending.iter() {
            self.handle_interrupt(channel, line);
        }
        pending
    }
}
