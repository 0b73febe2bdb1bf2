//! Channel lifecycle controller
//!
//! [`Utimer`] owns the register block, the interrupt controller and the
//! static configuration, and keeps one runtime record per channel. Every
//! operation checks its guards before touching a register, so a rejected
//! call leaves the hardware untouched.

use hal::error::{HalError, HalResult};
use hal::interrupt::InterruptController;
use hal::power::PowerState;

use crate::channel::{Channel, CHANNEL_COUNT};
use crate::config::{ChannelConfig, FaultMode, UtimerConfig};
use crate::encoder;
use crate::event::{IrqLines, SignalEvent};
use crate::mode::{Counter, CounterDirection, CounterMode};
use crate::regs::{fault_ctrl, GlobalReg, UtimerRegisters};
use crate::routing;
use crate::trigger::{TriggerBinding, TriggerSource};

/// API and implementation version, CMSIS `major << 8 | minor` encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverVersion {
    pub api: u16,
    pub driver: u16,
}

impl DriverVersion {
    pub const fn new(api: (u8, u8), driver: (u8, u8)) -> Self {
        Self {
            api: (api.0 as u16) << 8 | api.1 as u16,
            driver: (driver.0 as u16) << 8 | driver.1 as u16,
        }
    }
}

/// Version reported by [`UtimerDriver::version`]
pub const VERSION: DriverVersion = DriverVersion::new((1, 0), (1, 0));

/// Runtime flags of one channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelState {
    pub initialized: bool,
    pub powered: bool,
    pub configured: bool,
    pub triggered: bool,
    pub started: bool,
}

/// Operation set of a UTIMER instance
pub trait UtimerDriver {
    /// API and driver version
    fn version(&self) -> DriverVersion;

    /// Binds the event callback. Timer channels must supply one.
    fn initialize(&mut self, channel: Channel, callback: Option<SignalEvent>) -> HalResult<()>;

    /// Gates the channel clock. `Low` is not implemented.
    fn power_control(&mut self, channel: Channel, state: PowerState) -> HalResult<()>;

    /// Applies a mode and direction and routes the matching interrupt lines.
    fn config_counter(
        &mut self,
        channel: Channel,
        mode: CounterMode,
        direction: CounterDirection,
    ) -> HalResult<()>;

    /// Writes one of the counter registers.
    fn set_count(&mut self, channel: Channel, counter: Counter, value: u32) -> HalResult<()>;

    /// Reads one of the counter registers.
    fn get_count(&self, channel: Channel, counter: Counter) -> u32;

    /// Adds a trigger binding to the channel.
    fn config_trigger(&mut self, channel: Channel, binding: TriggerBinding) -> HalResult<()>;

    /// Starts the counter and confirms it is running.
    fn start(&mut self, channel: Channel) -> HalResult<()>;

    /// Stops the counter, optionally clearing it, and confirms it halted.
    fn stop(&mut self, channel: Channel, clear: bool) -> HalResult<()>;

    /// Returns the channel to its unbound state.
    fn uninitialize(&mut self, channel: Channel) -> HalResult<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ChannelInfo {
    pub(crate) state: ChannelState,
    pub(crate) callback: Option<SignalEvent>,
    pub(crate) mode: Option<CounterMode>,
    pub(crate) direction: Option<CounterDirection>,
}

impl ChannelInfo {
    /// Lines routed for the cached mode and direction
    fn routed_lines(&self, channel: Channel, config: &ChannelConfig) -> IrqLines {
        match (self.state.configured, self.mode, self.direction) {
            (true, Some(mode), Some(direction)) => {
                routing::active_lines(channel, mode, direction, config)
            }
            _ => IrqLines::EMPTY,
        }
    }
}

/// One UTIMER block
pub struct Utimer<R, I> {
    pub(crate) regs: R,
    irq: I,
    pub(crate) config: UtimerConfig,
    pub(crate) channels: [ChannelInfo; CHANNEL_COUNT],
}

impl<R, I> Utimer<R, I> {
    /// Takes ownership of the block, its interrupt controller and its
    /// provisioning table. Every channel starts uninitialized.
    pub fn new(regs: R, irq: I, config: UtimerConfig) -> Self {
        Self {
            regs,
            irq,
            config,
            channels: [ChannelInfo::default(); CHANNEL_COUNT],
        }
    }

    /// Releases the block and the interrupt controller.
    pub fn free(self) -> (R, I) {
        (self.regs, self.irq)
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn interrupts(&self) -> &I {
        &self.irq
    }

    pub fn config(&self) -> &UtimerConfig {
        &self.config
    }

    pub fn channel_state(&self, channel: Channel) -> ChannelState {
        self.info(channel).state
    }

    /// Mode applied by the last successful `config_counter`
    pub fn mode(&self, channel: Channel) -> Option<CounterMode> {
        self.info(channel).mode
    }

    /// Direction applied by the last successful `config_counter`
    pub fn direction(&self, channel: Channel) -> Option<CounterDirection> {
        self.info(channel).direction
    }

    pub(crate) fn info(&self, channel: Channel) -> &ChannelInfo {
        &self.channels[channel.index() as usize]
    }

    fn info_mut(&mut self, channel: Channel) -> &mut ChannelInfo {
        &mut self.channels[channel.index() as usize]
    }
}

impl<R, I> Utimer<R, I>
where
    R: UtimerRegisters,
    I: InterruptController,
{
    fn teardown_lines(&mut self, channel: Channel) -> HalResult<()> {
        let lines = self
            .info(channel)
            .routed_lines(channel, self.config.channel(channel));
        if !lines.is_empty() {
            trace!("UTIMER{}: masking lines {:#x}", channel.index(), lines.bits() as u8);
        }
        routing::disable(&self.regs, &mut self.irq, &self.config, channel, lines)
    }

    fn power_off(&mut self, channel: Channel) -> HalResult<()> {
        if self.info(channel).state.started {
            self.regs.write_global(GlobalReg::CntrStop, channel.mask());
        }
        self.teardown_lines(channel)?;
        encoder::disable_outputs(&self.regs, channel);
        self.regs.clear_global_bits(GlobalReg::ClockEnable, channel.mask());

        let state = &mut self.info_mut(channel).state;
        state.powered = false;
        state.configured = false;
        state.triggered = false;
        state.started = false;
        debug!("UTIMER{}: powered off", channel.index());
        Ok(())
    }
}

impl<R, I> UtimerDriver for Utimer<R, I>
where
    R: UtimerRegisters,
    I: InterruptController,
{
    fn version(&self) -> DriverVersion {
        VERSION
    }

    fn initialize(&mut self, channel: Channel, callback: Option<SignalEvent>) -> HalResult<()> {
        let info = self.info_mut(channel);
        if info.state.initialized {
            return Ok(());
        }
        if callback.is_none() && !channel.is_qec() {
            return Err(HalError::InvalidParameter);
        }

        info.callback = callback;
        info.state.initialized = true;
        debug!("UTIMER{}: initialized", channel.index());
        Ok(())
    }

    fn power_control(&mut self, channel: Channel, state: PowerState) -> HalResult<()> {
        let current = self.info(channel).state;
        match state {
            PowerState::Off => {
                if !current.powered {
                    return Ok(());
                }
                self.power_off(channel)
            }
            PowerState::Full => {
                if !current.initialized {
                    return Err(HalError::InvalidState);
                }
                if current.powered {
                    return Ok(());
                }
                self.regs.set_global_bits(GlobalReg::ClockEnable, channel.mask());
                self.info_mut(channel).state.powered = true;
                debug!("UTIMER{}: powered", channel.index());
                Ok(())
            }
            PowerState::Low => Err(HalError::NotSupported),
        }
    }

    fn config_counter(
        &mut self,
        channel: Channel,
        mode: CounterMode,
        direction: CounterDirection,
    ) -> HalResult<()> {
        let current = self.info(channel).state;
        if !current.powered || current.started {
            return Err(HalError::InvalidState);
        }
        if channel.is_qec() && !mode.allowed_on_qec() {
            return Err(HalError::NotSupported);
        }

        if current.configured {
            self.teardown_lines(channel)?;
        }

        let config = *self.config.channel(channel);
        encoder::reset(&self.regs, channel);
        encoder::encode_direction(&self.regs, channel, &config, direction);
        encoder::encode_mode(&self.regs, channel, &config, mode);
        if let Some(duty) = config.duty_cycle.filter(|_| mode.drives_outputs()) {
            encoder::encode_duty_cycle(&self.regs, channel, &config, duty);
        }

        let info = self.info_mut(channel);
        info.mode = Some(mode);
        info.direction = Some(direction);
        info.state.configured = true;

        let lines = routing::active_lines(channel, mode, direction, &config);
        routing::enable(&self.regs, &mut self.irq, &self.config, channel, lines)?;
        debug!(
            "UTIMER{}: configured {:?} {:?}, lines {:#x}",
            channel.index(),
            mode,
            direction,
            lines.bits() as u8
        );
        Ok(())
    }

    fn set_count(&mut self, channel: Channel, counter: Counter, value: u32) -> HalResult<()> {
        if !self.info(channel).state.configured {
            return Err(HalError::InvalidState);
        }
        self.regs.write(channel, counter.register(), value);
        Ok(())
    }

    fn get_count(&self, channel: Channel, counter: Counter) -> u32 {
        self.regs.read(channel, counter.register())
    }

    fn config_trigger(&mut self, channel: Channel, binding: TriggerBinding) -> HalResult<()> {
        if !self.info(channel).state.configured {
            return Err(HalError::InvalidState);
        }
        binding.validate(channel)?;

        let mut bits = binding.trigger.translate();
        if binding.source == TriggerSource::Fault
            && self.config.channel(channel).fault_mode == FaultMode::Persistent
        {
            bits |= fault_ctrl::PERSISTENT;
        }
        self.regs.set_bits(channel, binding.register(), bits);
        self.info_mut(channel).state.triggered = true;
        debug!(
            "UTIMER{}: trigger {:?} on {:?}",
            channel.index(),
            binding.trigger,
            binding.target
        );
        Ok(())
    }

    fn start(&mut self, channel: Channel) -> HalResult<()> {
        if !self.info(channel).state.configured {
            return Err(HalError::InvalidState);
        }
        self.regs.write_global(GlobalReg::CntrStart, channel.mask());
        if self.regs.read_global(GlobalReg::CntrRunning) & channel.mask() == 0 {
            return Err(HalError::HardwareError);
        }
        self.info_mut(channel).state.started = true;
        debug!("UTIMER{}: started", channel.index());
        Ok(())
    }

    fn stop(&mut self, channel: Channel, clear: bool) -> HalResult<()> {
        if !self.info(channel).state.configured {
            return Err(HalError::InvalidState);
        }
        self.regs.write_global(GlobalReg::CntrStop, channel.mask());
        if clear {
            self.regs.write_global(GlobalReg::CntrClear, channel.mask());
        }
        if self.regs.read_global(GlobalReg::CntrRunning) & channel.mask() != 0 {
            return Err(HalError::HardwareError);
        }
        self.info_mut(channel).state.started = false;
        debug!("UTIMER{}: stopped (clear: {})", channel.index(), clear);
        Ok(())
    }

    fn uninitialize(&mut self, channel: Channel) -> HalResult<()> {
        if self.info(channel).state.powered {
            self.power_off(channel)?;
        }
        *self.info_mut(channel) = ChannelInfo::default();
        debug!("UTIMER{}: uninitialized", channel.index());
        Ok(())
    }
}
