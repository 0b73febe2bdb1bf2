//! Channel configuration encoder
//!
//! Turns a channel's static configuration plus the requested mode and
//! direction into register fields. Every function here only ORs bits in;
//! [`reset`] is the caller's tool for starting from a clean channel.

use crate::channel::Channel;
use crate::config::{
    BufferDepth, ChannelConfig, DriverConfig, DutyCycle, PinLevel, TriangleBufferEvent,
};
use crate::event::IrqLines;
use crate::mode::{CounterDirection, CounterMode, Driver};
use crate::regs::{
    buf_op_ctrl, cntr_ctrl, compare_ctrl, dead_time_ctrl, driver_oen_bit, duty_cycle_ctrl,
    ChannelReg, GlobalReg, UtimerRegisters,
};

/// Control registers returned to their reset value by [`reset`].
const CONTROL_REGS: [ChannelReg; 6] = [
    ChannelReg::CntrCtrl,
    ChannelReg::CompareCtrlA,
    ChannelReg::CompareCtrlB,
    ChannelReg::BufOpCtrl,
    ChannelReg::DeadTimeCtrl,
    ChannelReg::DutyCycleCtrl,
];

/// Clears the mode-dependent control registers of a channel and masks
/// all of its interrupt lines.
pub fn reset<R: UtimerRegisters>(regs: &R, channel: Channel) {
    for reg in CONTROL_REGS {
        regs.write(channel, reg, 0);
    }
    regs.write(channel, ChannelReg::InterruptMask, IrqLines::ALL.bits());
}

/// `CntrCtrl` bits for a counting direction
pub fn direction_bits(config: &ChannelConfig, direction: CounterDirection) -> u32 {
    let counter_type = match direction {
        CounterDirection::Up | CounterDirection::Down if config.fixed_buffer => {
            cntr_ctrl::TYPE_SAWTOOTH_ONE_SHOT
        }
        CounterDirection::Up | CounterDirection::Down => cntr_ctrl::TYPE_SAWTOOTH,
        CounterDirection::Triangle if config.fixed_buffer => cntr_ctrl::TYPE_TRIANGLE_ONE_SHOT,
        CounterDirection::Triangle => match config.triangle_buffer {
            TriangleBufferEvent::Trough => cntr_ctrl::TYPE_TRIANGLE_TROUGH,
            TriangleBufferEvent::TroughAndCrest => cntr_ctrl::TYPE_TRIANGLE_TROUGH_CREST,
        },
    };
    let dir = match direction {
        CounterDirection::Down => cntr_ctrl::DIR_DOWN,
        CounterDirection::Up | CounterDirection::Triangle => 0,
    };
    cntr_ctrl::EN | cntr_ctrl::counter_type(counter_type) | dir
}

/// Programs the counter type and direction.
pub fn encode_direction<R: UtimerRegisters>(
    regs: &R,
    channel: Channel,
    config: &ChannelConfig,
    direction: CounterDirection,
) {
    regs.set_bits(channel, ChannelReg::CntrCtrl, direction_bits(config, direction));
}

/// Programs the mode-specific output, buffering and dead-time fields.
pub fn encode_mode<R: UtimerRegisters>(
    regs: &R,
    channel: Channel,
    config: &ChannelConfig,
    mode: CounterMode,
) {
    match mode {
        CounterMode::Basic => {
            enable_outputs(regs, channel, config);
            shape_drivers(regs, channel, config, output_bits);
        }
        CounterMode::Buffering => {
            enable_outputs(regs, channel, config);
            shape_drivers(regs, channel, config, output_bits);
            regs.set_bits(channel, ChannelReg::BufOpCtrl, pointer_buffer_bits(config.pointer_buffer));
        }
        CounterMode::Triggering => disable_outputs(regs, channel),
        CounterMode::Capturing => {
            disable_outputs(regs, channel);
            if config.capture_buffering {
                regs.set_bits(channel, ChannelReg::BufOpCtrl, capture_buffer_bits(config));
            }
        }
        CounterMode::Comparing => {
            enable_outputs(regs, channel, config);
            shape_drivers(regs, channel, config, compare_bits);
        }
        CounterMode::DeadTime => {
            enable_outputs(regs, channel, config);
            let mut dt = dead_time_ctrl::DT_EN;
            if config.dead_time_buffering {
                dt |= dead_time_ctrl::DT_BUF_EN;
            }
            regs.set_bits(channel, ChannelReg::DeadTimeCtrl, dt);
            shape_drivers(regs, channel, config, compare_bits);
        }
    }
}

/// Forces the configured duty cycle on the active drivers.
pub fn encode_duty_cycle<R: UtimerRegisters>(
    regs: &R,
    channel: Channel,
    config: &ChannelConfig,
    duty: DutyCycle,
) {
    let mut bits = 0;
    for driver in config.active_drivers() {
        let (en, full) = match driver {
            Driver::A => (duty_cycle_ctrl::EN_A, duty_cycle_ctrl::FULL_A),
            Driver::B => (duty_cycle_ctrl::EN_B, duty_cycle_ctrl::FULL_B),
        };
        bits |= en;
        if duty == DutyCycle::Full {
            bits |= full;
        }
    }
    regs.set_bits(channel, ChannelReg::DutyCycleCtrl, bits);
}

/// Driver output enable is active low in the global register. Drivers
/// left out of the configuration are gated off.
fn enable_outputs<R: UtimerRegisters>(regs: &R, channel: Channel, config: &ChannelConfig) {
    let all = driver_oen_bit(channel, Driver::A) | driver_oen_bit(channel, Driver::B);
    let active = config
        .active_drivers()
        .fold(0, |acc, driver| acc | driver_oen_bit(channel, driver));
    regs.clear_global_bits(GlobalReg::DriverOen, active);
    if all & !active != 0 {
        regs.set_global_bits(GlobalReg::DriverOen, all & !active);
    }
}

pub(crate) fn disable_outputs<R: UtimerRegisters>(regs: &R, channel: Channel) {
    let bits = driver_oen_bit(channel, Driver::A) | driver_oen_bit(channel, Driver::B);
    regs.set_global_bits(GlobalReg::DriverOen, bits);
}

fn shape_drivers<R: UtimerRegisters>(
    regs: &R,
    channel: Channel,
    config: &ChannelConfig,
    bits: fn(&DriverConfig) -> u32,
) {
    for driver in config.active_drivers() {
        regs.set_bits(channel, ChannelReg::compare_ctrl(driver), bits(config.driver(driver)));
    }
}

fn level_bit(level: PinLevel, bit: u32) -> u32 {
    match level {
        PinLevel::Low => 0,
        PinLevel::High => bit,
    }
}

/// Drive enable plus idle, start, stop and cycle-end shaping
pub fn output_bits(driver: &DriverConfig) -> u32 {
    compare_ctrl::DRV_EN
        | (driver.at_cycle_end as u32) << compare_ctrl::DRV_CYCLE_END_SHIFT
        | level_bit(driver.start_level, compare_ctrl::DRV_START_VAL)
        | level_bit(driver.stop_level, compare_ctrl::DRV_STOP_VAL)
        | level_bit(driver.idle_level, compare_ctrl::DRV_DISABLE_VAL)
}

/// Output shaping plus compare match and compare buffering
pub fn compare_bits(driver: &DriverConfig) -> u32 {
    let mut bits = output_bits(driver)
        | compare_ctrl::COMPARE_EN
        | (driver.at_match as u32) << compare_ctrl::DRV_MATCH_SHIFT;
    if driver.buffer_at_crest {
        bits |= compare_ctrl::BUF_EVENT_CREST;
    }
    if driver.buffer_at_trough {
        bits |= compare_ctrl::BUF_EVENT_TROUGH;
    }
    match driver.compare_buffer {
        BufferDepth::None => {}
        BufferDepth::Single => bits |= compare_ctrl::BUF_EN,
        BufferDepth::Double => bits |= compare_ctrl::BUF_EN | compare_ctrl::BUF_DOUBLE,
    }
    if driver.fixed_buffer {
        bits |= compare_ctrl::BUF_FORCE;
    }
    if driver.dma_clear {
        bits |= compare_ctrl::DMA_CLEAR_EN;
    }
    bits
}

fn pointer_buffer_bits(depth: BufferDepth) -> u32 {
    let op = match depth {
        BufferDepth::Double => BufferDepth::Double,
        BufferDepth::None | BufferDepth::Single => BufferDepth::Single,
    };
    buf_op_ctrl::CNTR_BUF_EN | op.field() << buf_op_ctrl::CNTR_BUF_OP_SHIFT
}

fn capture_buffer_bits(config: &ChannelConfig) -> u32 {
    buf_op_ctrl::CAPTURE_BUF_EN
        | config.driver_a.capture_buffer.field() << buf_op_ctrl::CAPTURE_A_BUF_OP_SHIFT
        | config.driver_b.capture_buffer.field() << buf_op_ctrl::CAPTURE_B_BUF_OP_SHIFT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputAction;
    use crate::sim::SimUtimer;

    fn ch(n: u8) -> Channel {
        Channel::new(n).unwrap()
    }

    #[test]
    fn sawtooth_directions() {
        let cfg = ChannelConfig::new();
        assert_eq!(direction_bits(&cfg, CounterDirection::Up), cntr_ctrl::EN);
        assert_eq!(
            direction_bits(&cfg, CounterDirection::Down),
            cntr_ctrl::EN | cntr_ctrl::DIR_DOWN
        );
        let one_shot = ChannelConfig::new().with_fixed_buffer(true);
        assert_eq!(
            direction_bits(&one_shot, CounterDirection::Up),
            cntr_ctrl::EN | cntr_ctrl::counter_type(cntr_ctrl::TYPE_SAWTOOTH_ONE_SHOT)
        );
    }

    #[test]
    fn triangle_buffer_points() {
        let trough = ChannelConfig::new();
        let both = ChannelConfig::new().with_triangle_buffer(TriangleBufferEvent::TroughAndCrest);
        let fixed = both.with_fixed_buffer(true);
        let ty = |cfg: &ChannelConfig| {
            (direction_bits(cfg, CounterDirection::Triangle) & cntr_ctrl::TYPE_MASK)
                >> cntr_ctrl::TYPE_SHIFT
        };
        assert_eq!(ty(&trough), cntr_ctrl::TYPE_TRIANGLE_TROUGH);
        assert_eq!(ty(&both), cntr_ctrl::TYPE_TRIANGLE_TROUGH_CREST);
        assert_eq!(ty(&fixed), cntr_ctrl::TYPE_TRIANGLE_ONE_SHOT);
    }

    #[test]
    fn basic_mode_ignores_match_action() {
        let driver = DriverConfig::enabled()
            .with_match_action(OutputAction::Toggle)
            .with_cycle_end_action(OutputAction::High)
            .with_start_level(PinLevel::High);
        let bits = output_bits(&driver);
        assert_eq!(bits & 0x3, 0);
        assert_eq!(bits & compare_ctrl::COMPARE_EN, 0);
        assert_ne!(bits & compare_ctrl::DRV_EN, 0);
        assert_eq!((bits >> compare_ctrl::DRV_CYCLE_END_SHIFT) & 0x3, OutputAction::High as u32);
        assert_ne!(bits & compare_ctrl::DRV_START_VAL, 0);
        assert_eq!(bits & compare_ctrl::DRV_STOP_VAL, 0);
    }

    #[test]
    fn compare_buffering_per_driver() {
        let driver = DriverConfig::enabled()
            .with_match_action(OutputAction::Toggle)
            .with_compare_buffer(BufferDepth::Double)
            .with_buffer_events(true, false)
            .with_dma_clear(true);
        let bits = compare_bits(&driver);
        assert_eq!(bits & 0x3, OutputAction::Toggle as u32);
        for flag in [
            compare_ctrl::COMPARE_EN,
            compare_ctrl::DRV_EN,
            compare_ctrl::BUF_EN,
            compare_ctrl::BUF_DOUBLE,
            compare_ctrl::BUF_EVENT_CREST,
            compare_ctrl::DMA_CLEAR_EN,
        ] {
            assert_ne!(bits & flag, 0);
        }
        assert_eq!(bits & compare_ctrl::BUF_EVENT_TROUGH, 0);
        assert_eq!(bits & compare_ctrl::BUF_FORCE, 0);
    }

    #[test]
    fn buffering_mode_selects_double_pointer_buffer() {
        let regs = SimUtimer::new();
        let cfg = ChannelConfig::new()
            .with_driver_a(DriverConfig::enabled())
            .with_pointer_buffer(BufferDepth::Double);
        encode_mode(&regs, ch(1), &cfg, CounterMode::Buffering);
        let buf = regs.read(ch(1), ChannelReg::BufOpCtrl);
        assert_eq!(buf, buf_op_ctrl::CNTR_BUF_EN | 2 << buf_op_ctrl::CNTR_BUF_OP_SHIFT);
        assert_eq!(regs.read_global(GlobalReg::DriverOen) & driver_oen_bit(ch(1), Driver::A), 0);
        assert_ne!(regs.read_global(GlobalReg::DriverOen) & driver_oen_bit(ch(1), Driver::B), 0);
        assert_ne!(regs.read(ch(1), ChannelReg::CompareCtrlA) & compare_ctrl::DRV_EN, 0);
        assert_eq!(regs.read(ch(1), ChannelReg::CompareCtrlB), 0);
    }

    #[test]
    fn basic_mode_gates_unconfigured_driver() {
        let regs = SimUtimer::new();
        regs.write_global(GlobalReg::DriverOen, 0);
        let cfg = ChannelConfig::new().with_driver_b(DriverConfig::enabled());
        encode_mode(&regs, ch(7), &cfg, CounterMode::Basic);
        let oen = regs.read_global(GlobalReg::DriverOen);
        assert_ne!(oen & driver_oen_bit(ch(7), Driver::A), 0);
        assert_eq!(oen & driver_oen_bit(ch(7), Driver::B), 0);
        assert_eq!(oen & driver_oen_bit(ch(6), Driver::A), 0);
    }

    #[test]
    fn capturing_mode_buffers_independently() {
        let regs = SimUtimer::new();
        let cfg = ChannelConfig::new()
            .with_driver_a(DriverConfig::enabled().with_capture_buffer(BufferDepth::Double))
            .with_driver_b(DriverConfig::enabled().with_capture_buffer(BufferDepth::Single))
            .with_capture_buffering(true);
        encode_mode(&regs, ch(4), &cfg, CounterMode::Capturing);
        let buf = regs.read(ch(4), ChannelReg::BufOpCtrl);
        assert_ne!(buf & buf_op_ctrl::CAPTURE_BUF_EN, 0);
        assert_eq!((buf >> buf_op_ctrl::CAPTURE_A_BUF_OP_SHIFT) & 0x3, 2);
        assert_eq!((buf >> buf_op_ctrl::CAPTURE_B_BUF_OP_SHIFT) & 0x3, 1);
        let oen = driver_oen_bit(ch(4), Driver::A) | driver_oen_bit(ch(4), Driver::B);
        assert_eq!(regs.read_global(GlobalReg::DriverOen) & oen, oen);
        assert_eq!(regs.read(ch(4), ChannelReg::CompareCtrlA), 0);
    }

    #[test]
    fn capturing_without_buffering_leaves_buffers_off() {
        let regs = SimUtimer::new();
        let cfg = ChannelConfig::new()
            .with_driver_a(DriverConfig::enabled().with_capture_buffer(BufferDepth::Double));
        encode_mode(&regs, ch(4), &cfg, CounterMode::Capturing);
        assert_eq!(regs.read(ch(4), ChannelReg::BufOpCtrl), 0);
    }

    #[test]
    fn dead_time_mode() {
        let regs = SimUtimer::new();
        let cfg = ChannelConfig::new()
            .with_driver_a(DriverConfig::enabled())
            .with_driver_b(DriverConfig::enabled())
            .with_dead_time_buffering(true);
        encode_mode(&regs, ch(6), &cfg, CounterMode::DeadTime);
        assert_eq!(
            regs.read(ch(6), ChannelReg::DeadTimeCtrl),
            dead_time_ctrl::DT_EN | dead_time_ctrl::DT_BUF_EN
        );
        for reg in [ChannelReg::CompareCtrlA, ChannelReg::CompareCtrlB] {
            let bits = regs.read(ch(6), reg);
            assert_ne!(bits & compare_ctrl::COMPARE_EN, 0);
            assert_ne!(bits & compare_ctrl::DRV_EN, 0);
        }
    }

    #[test]
    fn duty_cycle_only_on_active_drivers() {
        let regs = SimUtimer::new();
        let cfg = ChannelConfig::new().with_driver_b(DriverConfig::enabled());
        encode_duty_cycle(&regs, ch(2), &cfg, DutyCycle::Full);
        assert_eq!(
            regs.read(ch(2), ChannelReg::DutyCycleCtrl),
            duty_cycle_ctrl::EN_B | duty_cycle_ctrl::FULL_B
        );
    }

    #[test]
    fn reset_clears_control_registers() {
        let regs = SimUtimer::new();
        let cfg = ChannelConfig::new().with_driver_a(DriverConfig::enabled());
        encode_direction(&regs, ch(0), &cfg, CounterDirection::Down);
        encode_mode(&regs, ch(0), &cfg, CounterMode::Comparing);
        reset(&regs, ch(0));
        for reg in CONTROL_REGS {
            assert_eq!(regs.read(ch(0), reg), 0);
        }
        assert_eq!(regs.read(ch(0), ChannelReg::InterruptMask), 0xFF);
    }
}
