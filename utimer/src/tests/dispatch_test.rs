//! Interrupt dispatch

use super::*;
use crate::config::{BufferDepth, ChannelConfig, DriverConfig};
use crate::event::IrqLine;
use crate::regs::{ChannelReg, UtimerRegisters};
use crate::routing;
use hal::HalError;

fn two_drivers(depth: BufferDepth) -> ChannelConfig {
    let driver = DriverConfig::enabled().with_compare_buffer(depth);
    ChannelConfig::new().with_driver_a(driver).with_driver_b(driver)
}

#[test]
fn test_capture_and_compare_share_a_line() {
    let mut utimer = utimer(UtimerConfig::new().with_channel(ch(3), two_drivers(BufferDepth::None)));
    configured(&mut utimer, ch(3), CounterMode::Capturing, CounterDirection::Up);
    utimer.registers().raise(ch(3), IrqLine::CaptureA);
    utimer.handle_interrupt(ch(3), IrqLine::CaptureA);
    assert_eq!(take_events(), [UtimerEvent::CaptureA]);

    utimer
        .config_counter(ch(3), CounterMode::Comparing, CounterDirection::Up)
        .unwrap();
    utimer.registers().raise(ch(3), IrqLine::CaptureA);
    utimer.handle_interrupt(ch(3), IrqLine::CaptureA);
    utimer.handle_interrupt(ch(3), IrqLine::CaptureB);
    assert_eq!(take_events(), [UtimerEvent::CompareA, UtimerEvent::CompareB]);
}

#[test]
fn test_fixed_lines_ignore_mode() {
    let mut utimer = utimer(UtimerConfig::new());
    configured(&mut utimer, ch(0), CounterMode::Capturing, CounterDirection::Up);
    for line in [
        IrqLine::CaptureC,
        IrqLine::CaptureD,
        IrqLine::CaptureE,
        IrqLine::CaptureF,
        IrqLine::Underflow,
        IrqLine::Overflow,
    ] {
        utimer.handle_interrupt(ch(0), line);
    }
    assert_eq!(
        take_events(),
        [
            UtimerEvent::CompareABuf1,
            UtimerEvent::CompareABuf2,
            UtimerEvent::CompareBBuf1,
            UtimerEvent::CompareBBuf2,
            UtimerEvent::Underflow,
            UtimerEvent::Overflow,
        ]
    );
}

#[test]
fn test_flag_is_cleared() {
    let mut utimer = utimer(UtimerConfig::new());
    configured(&mut utimer, ch(1), CounterMode::Basic, CounterDirection::Triangle);
    utimer.registers().raise(ch(1), IrqLine::Overflow);
    utimer.registers().raise(ch(1), IrqLine::Underflow);

    utimer.handle_interrupt(ch(1), IrqLine::Overflow);
    assert_eq!(
        utimer.registers().read(ch(1), ChannelReg::Interrupt),
        IrqLine::Underflow.bit()
    );
    assert_eq!(take_events(), [UtimerEvent::Overflow]);
}

#[test]
fn test_missing_callback_still_clears_flag() {
    let mut utimer = utimer(UtimerConfig::new().with_channel(ch(14), two_drivers(BufferDepth::None)));
    utimer.initialize(ch(14), None).unwrap();
    utimer.power_control(ch(14), hal::PowerState::Full).unwrap();
    utimer
        .config_counter(ch(14), CounterMode::Capturing, CounterDirection::Up)
        .unwrap();

    utimer.registers().raise(ch(14), IrqLine::CaptureB);
    let irq = routing::irq_number(utimer.config(), ch(14), IrqLine::CaptureB).unwrap();
    utimer.dispatch_irq(irq).unwrap();
    assert_eq!(utimer.registers().read(ch(14), ChannelReg::Interrupt), 0);
    assert!(take_events().is_empty());
}

#[test]
fn test_dispatch_irq_lookup() {
    let config = UtimerConfig::new().with_channel(ch(12), two_drivers(BufferDepth::None));
    let mut utimer = utimer(config);
    configured(&mut utimer, ch(12), CounterMode::Capturing, CounterDirection::Up);
    configured(&mut utimer, ch(7), CounterMode::Basic, CounterDirection::Down);

    let qec_b = routing::irq_number(&config, ch(12), IrqLine::CaptureB).unwrap();
    let underflow = routing::irq_number(&config, ch(7), IrqLine::Underflow).unwrap();
    utimer.dispatch_irq(qec_b).unwrap();
    utimer.dispatch_irq(underflow).unwrap();
    assert_eq!(take_events(), [UtimerEvent::CaptureB, UtimerEvent::Underflow]);

    assert_eq!(utimer.dispatch_irq(0), Err(HalError::InvalidParameter));
    assert_eq!(
        utimer.dispatch_irq(config.qec_irq_base + 8),
        Err(HalError::InvalidParameter)
    );
}

#[test]
fn test_poll_services_unmasked_lines_in_order() {
    let mut utimer = utimer(UtimerConfig::new().with_channel(ch(2), two_drivers(BufferDepth::Single)));
    configured(&mut utimer, ch(2), CounterMode::Comparing, CounterDirection::Up);
    let regs = utimer.registers();
    regs.raise(ch(2), IrqLine::Overflow);
    regs.raise(ch(2), IrqLine::CaptureE);
    regs.raise(ch(2), IrqLine::CaptureA);
    // Not routed in this configuration, so masked.
    regs.raise(ch(2), IrqLine::Underflow);

    let handled = utimer.poll(ch(2));
    assert_eq!(handled.len(), 3);
    assert_eq!(
        take_events(),
        [UtimerEvent::CompareA, UtimerEvent::CompareBBuf1, UtimerEvent::Overflow]
    );
    assert!(utimer.poll(ch(2)).is_empty());
}
