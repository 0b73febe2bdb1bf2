//! Lifecycle guards and transitions

use super::*;
use crate::config::{
    BufferDepth, ChannelConfig, DriverConfig, DutyCycle, FaultMode, IrqPriorities,
    DEFAULT_IRQ_BASE, DEFAULT_QEC_IRQ_BASE,
};
use crate::driver::{ChannelState, VERSION};
use crate::event::IrqLine;
use crate::mode::{Counter, Driver};
use crate::regs::{
    cntr_ctrl, compare_ctrl, driver_oen_bit, duty_cycle_ctrl, fault_ctrl, ChannelReg, GlobalReg,
    UtimerRegisters,
};
use crate::routing;
use crate::trigger::{TriggerBinding, TriggerSource, TriggerTarget, TriggerType};
use hal::HalError;

const OUTPUT_MODES: [CounterMode; 4] = [
    CounterMode::Basic,
    CounterMode::Buffering,
    CounterMode::Comparing,
    CounterMode::DeadTime,
];

fn rich_config(channel: Channel) -> UtimerConfig {
    let driver = DriverConfig::enabled().with_compare_buffer(BufferDepth::Double);
    UtimerConfig::new().with_channel(
        channel,
        ChannelConfig::new()
            .with_driver_a(driver)
            .with_driver_b(driver)
            .with_irq_priorities(IrqPriorities::uniform(2)),
    )
}

#[test]
fn test_version() {
    let utimer = utimer(UtimerConfig::new());
    assert_eq!(utimer.version(), VERSION);
    assert_eq!(VERSION.api, 0x0100);
}

#[test]
fn test_initialize_is_idempotent() {
    let mut utimer = utimer(UtimerConfig::new());
    utimer.initialize(ch(0), Some(record)).unwrap();
    utimer.initialize(ch(0), Some(record_other)).unwrap();
    utimer.initialize(ch(0), None).unwrap();

    utimer.handle_interrupt(ch(0), IrqLine::Overflow);
    assert_eq!(take_events(), [UtimerEvent::Overflow]);
    assert!(take_other_events().is_empty());
    assert_eq!(utimer.registers().write_count(), 1);
}

#[test]
fn test_timer_channels_need_a_callback() {
    let mut utimer = utimer(UtimerConfig::new());
    for index in 0..12 {
        assert_eq!(utimer.initialize(ch(index), None), Err(HalError::InvalidParameter));
        assert_eq!(utimer.channel_state(ch(index)), ChannelState::default());
    }
    for index in 12..16 {
        utimer.initialize(ch(index), None).unwrap();
        assert!(utimer.channel_state(ch(index)).initialized);
    }
}

#[test]
fn test_guards_leave_registers_untouched() {
    let mut utimer = utimer(UtimerConfig::new());
    let binding = TriggerBinding::global(TriggerTarget::Start, TriggerType::GlobalTrig0Rising);

    assert_eq!(
        utimer.power_control(ch(3), PowerState::Full),
        Err(HalError::InvalidState)
    );
    assert_eq!(
        utimer.config_counter(ch(3), CounterMode::Basic, CounterDirection::Up),
        Err(HalError::InvalidState)
    );
    assert_eq!(utimer.set_count(ch(3), Counter::Cntr, 5), Err(HalError::InvalidState));
    assert_eq!(utimer.config_trigger(ch(3), binding), Err(HalError::InvalidState));
    assert_eq!(utimer.start(ch(3)), Err(HalError::InvalidState));
    assert_eq!(utimer.stop(ch(3), true), Err(HalError::InvalidState));

    utimer.initialize(ch(3), Some(record)).unwrap();
    assert_eq!(
        utimer.config_counter(ch(3), CounterMode::Basic, CounterDirection::Up),
        Err(HalError::InvalidState)
    );

    powered(&mut utimer, ch(3));
    let writes = utimer.registers().write_count();
    assert_eq!(utimer.set_count(ch(3), Counter::Cntr, 5), Err(HalError::InvalidState));
    assert_eq!(utimer.config_trigger(ch(3), binding), Err(HalError::InvalidState));
    assert_eq!(utimer.start(ch(3)), Err(HalError::InvalidState));
    assert_eq!(utimer.registers().write_count(), writes);
    assert!(utimer.interrupts().enabled_irqs().is_empty());
}

#[test]
fn test_power_states() {
    let mut utimer = utimer(UtimerConfig::new());
    utimer.power_control(ch(1), PowerState::Off).unwrap();
    assert_eq!(utimer.power_control(ch(1), PowerState::Low), Err(HalError::NotSupported));

    powered(&mut utimer, ch(1));
    assert_eq!(utimer.registers().read_global(GlobalReg::ClockEnable), ch(1).mask());
    let writes = utimer.registers().write_count();
    utimer.power_control(ch(1), PowerState::Full).unwrap();
    assert_eq!(utimer.registers().write_count(), writes);
    assert_eq!(utimer.power_control(ch(1), PowerState::Low), Err(HalError::NotSupported));
    assert!(utimer.channel_state(ch(1)).powered);
}

#[test]
fn test_qec_channels_reject_output_modes() {
    let mut utimer = utimer(UtimerConfig::new());
    for index in 12..16 {
        powered(&mut utimer, ch(index));
        let writes = utimer.registers().write_count();
        for mode in OUTPUT_MODES {
            for direction in [CounterDirection::Up, CounterDirection::Down, CounterDirection::Triangle] {
                assert_eq!(
                    utimer.config_counter(ch(index), mode, direction),
                    Err(HalError::NotSupported)
                );
            }
        }
        assert_eq!(utimer.registers().write_count(), writes);
        assert!(!utimer.channel_state(ch(index)).configured);

        utimer
            .config_counter(ch(index), CounterMode::Triggering, CounterDirection::Up)
            .unwrap();
        utimer
            .config_counter(ch(index), CounterMode::Capturing, CounterDirection::Up)
            .unwrap();
    }
}

#[test]
fn test_counter_round_trip() {
    let mut utimer = utimer(UtimerConfig::new());
    configured(&mut utimer, ch(5), CounterMode::Comparing, CounterDirection::Up);
    for counter in Counter::ALL {
        for value in [0, 1, 0x8000_0000, 0xFFFF_FFFF, 0x0BEB_C200] {
            utimer.set_count(ch(5), counter, value).unwrap();
            assert_eq!(utimer.get_count(ch(5), counter), value, "{:?}", counter);
        }
    }
}

#[test]
fn test_config_encodes_and_routes() {
    let mut utimer = utimer(rich_config(ch(2)));
    configured(&mut utimer, ch(2), CounterMode::Comparing, CounterDirection::Triangle);

    let regs = utimer.registers();
    assert_ne!(regs.read(ch(2), ChannelReg::CntrCtrl) & cntr_ctrl::EN, 0);
    assert_ne!(regs.read(ch(2), ChannelReg::CompareCtrlA) & compare_ctrl::BUF_DOUBLE, 0);
    assert_eq!(regs.read(ch(2), ChannelReg::InterruptMask), 0);

    let enabled = utimer.interrupts().enabled_irqs();
    assert_eq!(enabled.len(), 8);
    assert_eq!(enabled[0], DEFAULT_IRQ_BASE + 16);
    assert_eq!(utimer.interrupts().priority(DEFAULT_IRQ_BASE + 23), Some(2));
    assert_eq!(utimer.mode(ch(2)), Some(CounterMode::Comparing));
    assert_eq!(utimer.direction(ch(2)), Some(CounterDirection::Triangle));
}

#[test]
fn test_reconfigure_replaces_routing() {
    let mut utimer = utimer(rich_config(ch(2)));
    configured(&mut utimer, ch(2), CounterMode::Comparing, CounterDirection::Triangle);
    utimer
        .config_counter(ch(2), CounterMode::Basic, CounterDirection::Up)
        .unwrap();

    let overflow = routing::irq_number(utimer.config(), ch(2), IrqLine::Overflow).unwrap();
    assert_eq!(utimer.interrupts().enabled_irqs().as_slice(), &[overflow]);
    assert_eq!(
        utimer.registers().read(ch(2), ChannelReg::InterruptMask),
        0xFF & !IrqLine::Overflow.bit()
    );
    assert_eq!(
        utimer.registers().read(ch(2), ChannelReg::CompareCtrlA) & compare_ctrl::COMPARE_EN,
        0
    );
}

#[test]
fn test_qec_capture_routes_to_qec_bank() {
    let config = UtimerConfig::new().with_channel(
        ch(13),
        ChannelConfig::new()
            .with_driver_a(DriverConfig::enabled())
            .with_driver_b(DriverConfig::enabled()),
    );
    let mut utimer = utimer(config);
    utimer.initialize(ch(13), None).unwrap();
    utimer.power_control(ch(13), PowerState::Full).unwrap();
    utimer
        .config_counter(ch(13), CounterMode::Capturing, CounterDirection::Triangle)
        .unwrap();
    assert_eq!(
        utimer.interrupts().enabled_irqs().as_slice(),
        &[DEFAULT_QEC_IRQ_BASE + 2, DEFAULT_QEC_IRQ_BASE + 3]
    );
}

#[test]
fn test_configure_while_started_is_rejected() {
    let mut utimer = utimer(UtimerConfig::new());
    configured(&mut utimer, ch(0), CounterMode::Basic, CounterDirection::Up);
    utimer.set_count(ch(0), Counter::CntrPtr, 100).unwrap();
    utimer.start(ch(0)).unwrap();
    assert_eq!(
        utimer.config_counter(ch(0), CounterMode::Basic, CounterDirection::Down),
        Err(HalError::InvalidState)
    );
}

#[test]
fn test_start_and_stop_confirm_hardware_state() {
    let mut utimer = utimer(UtimerConfig::new());
    configured(&mut utimer, ch(4), CounterMode::Basic, CounterDirection::Up);

    utimer.registers().set_stuck(true);
    assert_eq!(utimer.start(ch(4)), Err(HalError::HardwareError));
    assert!(!utimer.channel_state(ch(4)).started);

    utimer.registers().set_stuck(false);
    utimer.start(ch(4)).unwrap();
    assert!(utimer.channel_state(ch(4)).started);

    utimer.registers().set_stuck(true);
    assert_eq!(utimer.stop(ch(4), false), Err(HalError::HardwareError));
    assert!(utimer.channel_state(ch(4)).started);

    utimer.registers().set_stuck(false);
    utimer.stop(ch(4), false).unwrap();
    assert!(!utimer.channel_state(ch(4)).started);
}

#[test]
fn test_trigger_bindings_accumulate() {
    let config = UtimerConfig::new().with_channel(
        ch(6),
        ChannelConfig::new().with_fault_mode(FaultMode::Persistent),
    );
    let mut utimer = utimer(config);
    configured(&mut utimer, ch(6), CounterMode::Triggering, CounterDirection::Up);

    for trigger in [TriggerType::GlobalTrig2Rising, TriggerType::GlobalTrig9Falling] {
        utimer
            .config_trigger(ch(6), TriggerBinding::global(TriggerTarget::Start, trigger))
            .unwrap();
    }
    utimer
        .config_trigger(
            ch(6),
            TriggerBinding::new(
                TriggerTarget::Stop,
                TriggerSource::Fault,
                TriggerType::Fault1Rising,
            ),
        )
        .unwrap();

    let regs = utimer.registers();
    assert_eq!(
        regs.read(ch(6), ChannelReg::StartSrc0),
        TriggerType::GlobalTrig2Rising.translate() | TriggerType::GlobalTrig9Falling.translate()
    );
    assert_eq!(
        regs.read(ch(6), ChannelReg::FaultCtrl),
        TriggerType::Fault1Rising.translate() | fault_ctrl::PERSISTENT
    );
    assert!(utimer.channel_state(ch(6)).triggered);
}

#[test]
fn test_trigger_class_mismatch_is_rejected() {
    let mut utimer = utimer(UtimerConfig::new());
    configured(&mut utimer, ch(7), CounterMode::Triggering, CounterDirection::Up);
    let writes = utimer.registers().write_count();

    let binding = TriggerBinding::new(
        TriggerTarget::Clear,
        TriggerSource::ChannelEvent,
        TriggerType::GlobalTrig1Rising,
    );
    assert_eq!(utimer.config_trigger(ch(7), binding), Err(HalError::InvalidParameter));
    assert!(!utimer.channel_state(ch(7)).triggered);
    assert_eq!(utimer.registers().write_count(), writes);
}

#[test]
fn test_duty_cycle_only_in_output_modes() {
    let cfg = ChannelConfig::new()
        .with_driver_a(DriverConfig::enabled())
        .with_duty_cycle(Some(DutyCycle::Full));
    let mut utimer = utimer(UtimerConfig::new().with_channel(ch(8), cfg).with_channel(ch(9), cfg));
    configured(&mut utimer, ch(8), CounterMode::Basic, CounterDirection::Up);
    configured(&mut utimer, ch(9), CounterMode::Capturing, CounterDirection::Up);

    assert_eq!(
        utimer.registers().read(ch(8), ChannelReg::DutyCycleCtrl),
        duty_cycle_ctrl::EN_A | duty_cycle_ctrl::FULL_A
    );
    assert_eq!(utimer.registers().read(ch(9), ChannelReg::DutyCycleCtrl), 0);
}

#[test]
fn test_power_off_tears_down() {
    let mut utimer = utimer(rich_config(ch(10)));
    configured(&mut utimer, ch(10), CounterMode::Comparing, CounterDirection::Up);
    utimer.set_count(ch(10), Counter::CntrPtr, 1000).unwrap();
    utimer.start(ch(10)).unwrap();

    utimer.power_control(ch(10), PowerState::Off).unwrap();

    let regs = utimer.registers();
    assert!(!regs.is_running(ch(10)));
    assert_eq!(regs.read_global(GlobalReg::ClockEnable) & ch(10).mask(), 0);
    let oen = driver_oen_bit(ch(10), Driver::A) | driver_oen_bit(ch(10), Driver::B);
    assert_eq!(regs.read_global(GlobalReg::DriverOen) & oen, oen);
    assert!(utimer.interrupts().enabled_irqs().is_empty());
    assert_eq!(
        utimer.channel_state(ch(10)),
        ChannelState { initialized: true, ..ChannelState::default() }
    );
    assert_eq!(utimer.mode(ch(10)), Some(CounterMode::Comparing));

    assert_eq!(utimer.start(ch(10)), Err(HalError::InvalidState));
}

#[test]
fn test_uninitialize_resets_channel() {
    let mut utimer = utimer(rich_config(ch(11)));
    configured(&mut utimer, ch(11), CounterMode::Comparing, CounterDirection::Down);
    utimer.uninitialize(ch(11)).unwrap();

    assert_eq!(utimer.channel_state(ch(11)), ChannelState::default());
    assert_eq!(utimer.mode(ch(11)), None);
    assert_eq!(utimer.direction(ch(11)), None);
    assert!(utimer.interrupts().enabled_irqs().is_empty());

    utimer.handle_interrupt(ch(11), IrqLine::Underflow);
    assert!(take_events().is_empty());

    utimer.uninitialize(ch(11)).unwrap();
    utimer.initialize(ch(11), Some(record_other)).unwrap();
}
