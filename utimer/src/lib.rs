#![no_std]

//! # UTIMER driver
//!
//! Driver for the sixteen-channel universal timer block. Channels 0-11 are
//! general-purpose timers, channels 12-15 are quadrature-encoder front-ends
//! restricted to triggering and capturing.
//!
//! - Static per-channel provisioning ([`UtimerConfig`])
//! - Mode and direction encoding into the channel control registers
//! - Interrupt routing derived from the cached mode and direction
//! - Per-channel lifecycle with guarded transitions ([`UtimerDriver`])
//! - Interrupt dispatch to a `fn(UtimerEvent)` callback
//!
//! ```ignore
//! let mut utimer = Utimer::new(unsafe { Mmio::new(UTIMER_BASE) }, nvic, BOARD_CONFIG);
//! let ch0 = Channel::new(0)?;
//! utimer.initialize(ch0, Some(on_event))?;
//! utimer.power_control(ch0, PowerState::Full)?;
//! utimer.config_counter(ch0, CounterMode::Basic, CounterDirection::Up)?;
//! utimer.set_count(ch0, Counter::CntrPtr, 0x0BEB_C200)?;
//! utimer.start(ch0)?;
//! ```

#[cfg(test)]
extern crate std;

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod channel;
pub mod config;
mod dispatch;
pub mod driver;
pub mod encoder;
pub mod event;
pub mod mode;
pub mod pins;
pub mod regs;
pub mod routing;
pub mod shared;
pub mod sim;
pub mod trigger;

#[cfg(test)]
mod tests;

pub use channel::{Channel, ChannelRole, CHANNEL_COUNT, FIRST_QEC_CHANNEL};
pub use config::{
    BufferDepth, ChannelConfig, DriverConfig, DutyCycle, FaultMode, IrqPriorities, OutputAction,
    PinLevel, TriangleBufferEvent, UtimerConfig,
};
pub use driver::{ChannelState, DriverVersion, Utimer, UtimerDriver, VERSION};
pub use event::{IrqLine, IrqLines, SignalEvent, UtimerEvent};
pub use mode::{Counter, CounterDirection, CounterMode, Driver};
pub use regs::{Mmio, UtimerRegisters};
pub use shared::SharedUtimer;
pub use trigger::{TriggerBinding, TriggerSource, TriggerTarget, TriggerType};

pub use hal::{HalError, HalResult, PowerState};
