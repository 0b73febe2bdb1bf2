//! Driver tests against the simulated block

mod dispatch_test;
mod lifecycle_test;

use core::cell::RefCell;
use std::vec::Vec;

use crate::channel::Channel;
use crate::config::UtimerConfig;
use crate::driver::{Utimer, UtimerDriver};
use crate::event::UtimerEvent;
use crate::mode::{CounterDirection, CounterMode};
use crate::sim::{SimNvic, SimUtimer};
use hal::PowerState;

type TestUtimer = Utimer<SimUtimer, SimNvic>;

std::thread_local! {
    static EVENTS: RefCell<Vec<UtimerEvent>> = const { RefCell::new(Vec::new()) };
    static OTHER_EVENTS: RefCell<Vec<UtimerEvent>> = const { RefCell::new(Vec::new()) };
}

fn record(event: UtimerEvent) {
    EVENTS.with(|events| events.borrow_mut().push(event));
}

fn record_other(event: UtimerEvent) {
    OTHER_EVENTS.with(|events| events.borrow_mut().push(event));
}

fn take_events() -> Vec<UtimerEvent> {
    EVENTS.with(|events| events.take())
}

fn take_other_events() -> Vec<UtimerEvent> {
    OTHER_EVENTS.with(|events| events.take())
}

fn ch(index: u8) -> Channel {
    Channel::new(index).unwrap()
}

fn utimer(config: UtimerConfig) -> TestUtimer {
    Utimer::new(SimUtimer::new(), SimNvic::new(), config)
}

/// Initializes and powers a channel.
fn powered(utimer: &mut TestUtimer, channel: Channel) {
    utimer.initialize(channel, Some(record)).unwrap();
    utimer.power_control(channel, PowerState::Full).unwrap();
}

/// Initializes, powers and configures a channel.
fn configured(
    utimer: &mut TestUtimer,
    channel: Channel,
    mode: CounterMode,
    direction: CounterDirection,
) {
    powered(utimer, channel);
    utimer.config_counter(channel, mode, direction).unwrap();
}
