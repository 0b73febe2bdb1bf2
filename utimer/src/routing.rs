//! Interrupt routing
//!
//! The set of lines a channel uses is a pure function of its role, its
//! cached mode and direction, and its static configuration. Bringing lines
//! up and tearing them down both start from that set, so the two are exact
//! inverses for the same cached state.

use hal::error::HalResult;
use hal::interrupt::{InterruptController, IrqNumber};

use crate::channel::{Channel, FIRST_QEC_CHANNEL};
use crate::config::{BufferDepth, ChannelConfig, UtimerConfig};
use crate::event::{IrqLine, IrqLines};
use crate::mode::{CounterDirection, CounterMode, Driver};
use crate::regs::{ChannelReg, UtimerRegisters};

/// Lines per channel in the timer bank
pub const LINES_PER_CHANNEL: u32 = 8;
/// Lines per channel in the QEC bank
pub const QEC_LINES_PER_CHANNEL: u32 = 2;
const QEC_CHANNELS: u32 = 4;

/// Lines a channel needs for the given mode and direction.
pub fn active_lines(
    channel: Channel,
    mode: CounterMode,
    direction: CounterDirection,
    config: &ChannelConfig,
) -> IrqLines {
    let mut lines = IrqLines::EMPTY;

    if !channel.is_qec() {
        match direction {
            CounterDirection::Up => lines.insert(IrqLine::Overflow),
            CounterDirection::Down => lines.insert(IrqLine::Underflow),
            CounterDirection::Triangle => {
                lines.insert(IrqLine::Overflow);
                lines.insert(IrqLine::Underflow);
            }
        }
    }

    match mode {
        CounterMode::Capturing => {
            for driver in config.active_drivers() {
                lines.insert(capture_line(driver));
            }
        }
        CounterMode::Comparing if !channel.is_qec() => {
            for driver in config.active_drivers() {
                let (buf1, buf2) = match driver {
                    Driver::A => (IrqLine::CaptureC, IrqLine::CaptureD),
                    Driver::B => (IrqLine::CaptureE, IrqLine::CaptureF),
                };
                lines.insert(capture_line(driver));
                match config.driver(driver).compare_buffer {
                    BufferDepth::None => {}
                    BufferDepth::Single => lines.insert(buf1),
                    BufferDepth::Double => {
                        lines.insert(buf1);
                        lines.insert(buf2);
                    }
                }
            }
        }
        _ => {}
    }

    lines
}

const fn capture_line(driver: Driver) -> IrqLine {
    match driver {
        Driver::A => IrqLine::CaptureA,
        Driver::B => IrqLine::CaptureB,
    }
}

/// Physical IRQ number of a channel line.
///
/// QEC channels only own their two capture lines, in the QEC bank.
pub fn irq_number(config: &UtimerConfig, channel: Channel, line: IrqLine) -> Option<IrqNumber> {
    match channel.qec_index() {
        Some(qec) => match line {
            IrqLine::CaptureA | IrqLine::CaptureB => Some(
                config.qec_irq_base
                    + QEC_LINES_PER_CHANNEL * u32::from(qec)
                    + u32::from(line.index()),
            ),
            _ => None,
        },
        None => Some(
            config.irq_base
                + LINES_PER_CHANNEL * u32::from(channel.index())
                + u32::from(line.index()),
        ),
    }
}

/// Maps a physical IRQ number back to the channel line it belongs to.
pub fn locate(config: &UtimerConfig, irq: IrqNumber) -> Option<(Channel, IrqLine)> {
    let timer_lines = LINES_PER_CHANNEL * u32::from(FIRST_QEC_CHANNEL);
    let qec_lines = QEC_LINES_PER_CHANNEL * QEC_CHANNELS;

    if let Some(offset) = irq.checked_sub(config.irq_base).filter(|o| *o < timer_lines) {
        let channel = Channel::new((offset / LINES_PER_CHANNEL) as u8).ok()?;
        let line = IrqLine::from_index((offset % LINES_PER_CHANNEL) as u8)?;
        return Some((channel, line));
    }

    let offset = irq.checked_sub(config.qec_irq_base).filter(|o| *o < qec_lines)?;
    let channel = Channel::new(FIRST_QEC_CHANNEL + (offset / QEC_LINES_PER_CHANNEL) as u8).ok()?;
    let line = IrqLine::from_index((offset % QEC_LINES_PER_CHANNEL) as u8)?;
    Some((channel, line))
}

/// Unmasks `lines` in the channel and brings them up in the interrupt controller.
pub fn enable<R, I>(
    regs: &R,
    nvic: &mut I,
    config: &UtimerConfig,
    channel: Channel,
    lines: IrqLines,
) -> HalResult<()>
where
    R: UtimerRegisters,
    I: InterruptController,
{
    let priorities = &config.channel(channel).irq_priorities;
    for line in lines.iter() {
        let Some(irq) = irq_number(config, channel, line) else {
            continue;
        };
        regs.clear_bits(channel, ChannelReg::InterruptMask, line.bit());
        nvic.clear_pending(irq)?;
        nvic.set_priority(irq, priorities.get(line))?;
        nvic.enable_interrupt(irq)?;
        trace!("{} line {:?} -> irq {}", channel.index(), line, irq);
    }
    Ok(())
}

/// Masks `lines` in the channel and takes them down in the interrupt controller.
pub fn disable<R, I>(
    regs: &R,
    nvic: &mut I,
    config: &UtimerConfig,
    channel: Channel,
    lines: IrqLines,
) -> HalResult<()>
where
    R: UtimerRegisters,
    I: InterruptController,
{
    for line in lines.iter() {
        let Some(irq) = irq_number(config, channel, line) else {
            continue;
        };
        regs.set_bits(channel, ChannelReg::InterruptMask, line.bit());
        nvic.clear_pending(irq)?;
        nvic.disable_interrupt(irq)?;
    }
    Ok(())
}
