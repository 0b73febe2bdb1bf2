//! Static channel provisioning
//!
//! A board crate describes every channel once, typically as a `const`
//! [`UtimerConfig`] built from the `with_*` methods below, and hands it to
//! [`Utimer::new`](crate::Utimer::new). The configuration is read-only for
//! the lifetime of the driver.

use hal::interrupt::{InterruptPriority, IrqNumber};

use crate::channel::{Channel, CHANNEL_COUNT};
use crate::event::IrqLine;
use crate::mode::Driver;

/// Action applied to an output driver on an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OutputAction {
    NoChange = 0,
    Low = 1,
    High = 2,
    Toggle = 3,
}

/// Static output level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinLevel {
    Low,
    High,
}

/// Depth of a shadow-register chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BufferDepth {
    None = 0,
    Single = 1,
    Double = 2,
}

impl BufferDepth {
    pub const fn field(self) -> u32 {
        self as u32
    }
}

/// Buffer-transfer points of a triangle counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriangleBufferEvent {
    /// Transfer at the trough only
    Trough,
    /// Transfer at both trough and crest
    TroughAndCrest,
}

/// How a fault input affects the outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultMode {
    /// Outputs recover at the next cycle once the fault input clears
    Transient,
    /// Outputs stay in the fault state until the counter is restarted
    Persistent,
}

/// Duty-cycle override forced on the active drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DutyCycle {
    /// Output held inactive (0 %)
    Zero,
    /// Output held active (100 %)
    Full,
}

/// Per-driver output shaping and buffering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverConfig {
    /// Driver is used by this channel
    pub enabled: bool,
    /// Level while the output is disabled
    pub idle_level: PinLevel,
    /// Level when the counter starts
    pub start_level: PinLevel,
    /// Level when the counter stops
    pub stop_level: PinLevel,
    /// Action on a compare match (compare and dead-time modes)
    pub at_match: OutputAction,
    /// Action at the end of each counter cycle
    pub at_cycle_end: OutputAction,
    /// Compare-value buffering
    pub compare_buffer: BufferDepth,
    /// Capture-value buffering
    pub capture_buffer: BufferDepth,
    /// Transfer compare buffers at the crest
    pub buffer_at_crest: bool,
    /// Transfer compare buffers at the trough
    pub buffer_at_trough: bool,
    /// Force buffer transfer regardless of the event selection
    pub fixed_buffer: bool,
    /// Clear the compare buffer on a DMA trigger
    pub dma_clear: bool,
}

impl DriverConfig {
    /// Inactive driver
    pub const fn new() -> Self {
        Self {
            enabled: false,
            idle_level: PinLevel::Low,
            start_level: PinLevel::Low,
            stop_level: PinLevel::Low,
            at_match: OutputAction::NoChange,
            at_cycle_end: OutputAction::NoChange,
            compare_buffer: BufferDepth::None,
            capture_buffer: BufferDepth::None,
            buffer_at_crest: false,
            buffer_at_trough: false,
            fixed_buffer: false,
            dma_clear: false,
        }
    }

    /// Active driver with default shaping
    pub const fn enabled() -> Self {
        Self::new().with_enabled(true)
    }

    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub const fn with_idle_level(mut self, level: PinLevel) -> Self {
        self.idle_level = level;
        self
    }

    pub const fn with_start_level(mut self, level: PinLevel) -> Self {
        self.start_level = level;
        self
    }

    pub const fn with_stop_level(mut self, level: PinLevel) -> Self {
        self.stop_level = level;
        self
    }

    pub const fn with_match_action(mut self, action: OutputAction) -> Self {
        self.at_match = action;
        self
    }

    pub const fn with_cycle_end_action(mut self, action: OutputAction) -> Self {
        self.at_cycle_end = action;
        self
    }

    pub const fn with_compare_buffer(mut self, depth: BufferDepth) -> Self {
        self.compare_buffer = depth;
        self
    }

    pub const fn with_capture_buffer(mut self, depth: BufferDepth) -> Self {
        self.capture_buffer = depth;
        self
    }

    /// Selects the buffer-transfer events (crest, trough)
    pub const fn with_buffer_events(mut self, crest: bool, trough: bool) -> Self {
        self.buffer_at_crest = crest;
        self.buffer_at_trough = trough;
        self
    }

    pub const fn with_fixed_buffer(mut self, fixed: bool) -> Self {
        self.fixed_buffer = fixed;
        self
    }

    pub const fn with_dma_clear(mut self, dma_clear: bool) -> Self {
        self.dma_clear = dma_clear;
        self
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Priorities of the eight interrupt lines a channel can use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqPriorities {
    pub capture_a: InterruptPriority,
    pub capture_b: InterruptPriority,
    pub capture_c: InterruptPriority,
    pub capture_d: InterruptPriority,
    pub capture_e: InterruptPriority,
    pub capture_f: InterruptPriority,
    pub underflow: InterruptPriority,
    pub overflow: InterruptPriority,
}

impl IrqPriorities {
    pub const fn new() -> Self {
        Self::uniform(0)
    }

    /// Same priority on every line
    pub const fn uniform(priority: InterruptPriority) -> Self {
        Self {
            capture_a: priority,
            capture_b: priority,
            capture_c: priority,
            capture_d: priority,
            capture_e: priority,
            capture_f: priority,
            underflow: priority,
            overflow: priority,
        }
    }

    pub const fn with(mut self, line: IrqLine, priority: InterruptPriority) -> Self {
        match line {
            IrqLine::CaptureA => self.capture_a = priority,
            IrqLine::CaptureB => self.capture_b = priority,
            IrqLine::CaptureC => self.capture_c = priority,
            IrqLine::CaptureD => self.capture_d = priority,
            IrqLine::CaptureE => self.capture_e = priority,
            IrqLine::CaptureF => self.capture_f = priority,
            IrqLine::Underflow => self.underflow = priority,
            IrqLine::Overflow => self.overflow = priority,
        }
        self
    }

    pub const fn get(&self, line: IrqLine) -> InterruptPriority {
        match line {
            IrqLine::CaptureA => self.capture_a,
            IrqLine::CaptureB => self.capture_b,
            IrqLine::CaptureC => self.capture_c,
            IrqLine::CaptureD => self.capture_d,
            IrqLine::CaptureE => self.capture_e,
            IrqLine::CaptureF => self.capture_f,
            IrqLine::Underflow => self.underflow,
            IrqLine::Overflow => self.overflow,
        }
    }
}

impl Default for IrqPriorities {
    fn default() -> Self {
        Self::new()
    }
}

/// Static configuration of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    pub driver_a: DriverConfig,
    pub driver_b: DriverConfig,
    /// One-shot counter without buffered reload
    pub fixed_buffer: bool,
    /// Buffer-transfer points used by triangle counting
    pub triangle_buffer: TriangleBufferEvent,
    /// Pointer buffering used in buffering mode
    pub pointer_buffer: BufferDepth,
    /// Enable capture buffering in capturing mode
    pub capture_buffering: bool,
    /// Enable dead-time register buffering
    pub dead_time_buffering: bool,
    pub fault_mode: FaultMode,
    pub duty_cycle: Option<DutyCycle>,
    pub irq_priorities: IrqPriorities,
}

impl ChannelConfig {
    pub const fn new() -> Self {
        Self {
            driver_a: DriverConfig::new(),
            driver_b: DriverConfig::new(),
            fixed_buffer: false,
            triangle_buffer: TriangleBufferEvent::Trough,
            pointer_buffer: BufferDepth::None,
            capture_buffering: false,
            dead_time_buffering: false,
            fault_mode: FaultMode::Transient,
            duty_cycle: None,
            irq_priorities: IrqPriorities::new(),
        }
    }

    pub const fn with_driver_a(mut self, driver: DriverConfig) -> Self {
        self.driver_a = driver;
        self
    }

    pub const fn with_driver_b(mut self, driver: DriverConfig) -> Self {
        self.driver_b = driver;
        self
    }

    pub const fn with_fixed_buffer(mut self, fixed: bool) -> Self {
        self.fixed_buffer = fixed;
        self
    }

    pub const fn with_triangle_buffer(mut self, event: TriangleBufferEvent) -> Self {
        self.triangle_buffer = event;
        self
    }

    pub const fn with_pointer_buffer(mut self, depth: BufferDepth) -> Self {
        self.pointer_buffer = depth;
        self
    }

    pub const fn with_capture_buffering(mut self, enabled: bool) -> Self {
        self.capture_buffering = enabled;
        self
    }

    pub const fn with_dead_time_buffering(mut self, enabled: bool) -> Self {
        self.dead_time_buffering = enabled;
        self
    }

    pub const fn with_fault_mode(mut self, mode: FaultMode) -> Self {
        self.fault_mode = mode;
        self
    }

    pub const fn with_duty_cycle(mut self, duty: Option<DutyCycle>) -> Self {
        self.duty_cycle = duty;
        self
    }

    pub const fn with_irq_priorities(mut self, priorities: IrqPriorities) -> Self {
        self.irq_priorities = priorities;
        self
    }

    /// Configuration of one output driver
    pub const fn driver(&self, driver: Driver) -> &DriverConfig {
        match driver {
            Driver::A => &self.driver_a,
            Driver::B => &self.driver_b,
        }
    }

    /// Drivers marked active, A first
    pub fn active_drivers(&self) -> impl Iterator<Item = Driver> + '_ {
        [Driver::A, Driver::B]
            .into_iter()
            .filter(move |d| self.driver(*d).enabled)
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// First IRQ number of the timer-role bank on the reference SoC
pub const DEFAULT_IRQ_BASE: IrqNumber = 240;
/// First IRQ number of the QEC bank on the reference SoC
pub const DEFAULT_QEC_IRQ_BASE: IrqNumber = 368;

/// Provisioning table for a whole UTIMER block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UtimerConfig {
    /// IRQ of channel 0, capture A; each channel owns eight consecutive lines
    pub irq_base: IrqNumber,
    /// IRQ of QEC channel 12, capture A; each QEC channel owns two lines
    pub qec_irq_base: IrqNumber,
    pub channels: [ChannelConfig; CHANNEL_COUNT],
}

impl UtimerConfig {
    pub const fn new() -> Self {
        Self {
            irq_base: DEFAULT_IRQ_BASE,
            qec_irq_base: DEFAULT_QEC_IRQ_BASE,
            channels: [ChannelConfig::new(); CHANNEL_COUNT],
        }
    }

    pub const fn with_irq_bases(mut self, irq_base: IrqNumber, qec_irq_base: IrqNumber) -> Self {
        self.irq_base = irq_base;
        self.qec_irq_base = qec_irq_base;
        self
    }

    pub const fn with_channel(mut self, channel: Channel, config: ChannelConfig) -> Self {
        self.channels[channel.index() as usize] = config;
        self
    }

    pub const fn channel(&self, channel: Channel) -> &ChannelConfig {
        &self.channels[channel.index() as usize]
    }
}

impl Default for UtimerConfig {
    fn default() -> Self {
        Self::new()
    }
}
