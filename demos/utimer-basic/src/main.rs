//! UTIMER Basic Mode Demo
//!
//! Channel 0 counts up to a 500 ms pointer value and toggles its A output
//! at every cycle end. Every device vector lands in one handler that asks
//! the shared driver to dispatch the active IRQ.
//!
//! Build with `cargo build --release` from this directory.

#![no_std]
#![no_main]

use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::peripheral::SCB;
use cortex_m_rt::entry;
use panic_halt as _;

use hal::PowerState;
use hal_cmsis::Nvic;
use utimer::{
    Channel, ChannelConfig, Counter, CounterDirection, CounterMode, DriverConfig, HalResult, Mmio,
    OutputAction, SharedUtimer, Utimer, UtimerConfig, UtimerDriver, UtimerEvent,
};

/// Base address of the UTIMER block
const UTIMER_BASE: usize = 0x4800_1000;
/// Priority bits implemented by the core's NVIC
const NVIC_PRIO_BITS: u8 = 8;
/// Device vectors up to the last QEC line
const IRQ_COUNT: usize = 376;
/// 500 ms at the 400 MHz UTIMER clock
const HALF_SECOND: u32 = 0x0BEB_C200;

const CH0: Channel = match Channel::new(0) {
    Ok(channel) => channel,
    Err(_) => panic!("invalid channel"),
};

const BOARD: UtimerConfig = UtimerConfig::new().with_channel(
    CH0,
    ChannelConfig::new().with_driver_a(
        DriverConfig::enabled().with_cycle_end_action(OutputAction::Toggle),
    ),
);

static UTIMER: SharedUtimer<Mmio, Nvic> = SharedUtimer::new();
static OVERFLOWS: AtomicU32 = AtomicU32::new(0);

#[link_section = ".vector_table.interrupts"]
#[no_mangle]
pub static __INTERRUPTS: [unsafe extern "C" fn(); IRQ_COUNT] =
    [device_irq as unsafe extern "C" fn(); IRQ_COUNT];

unsafe extern "C" fn device_irq() {
    // VECTACTIVE holds the exception number; device IRQs start at 16.
    let vector = (*SCB::PTR).icsr.read() & 0x1FF;
    if let Some(irq) = vector.checked_sub(16) {
        let _ = UTIMER.dispatch_irq(irq);
    }
}

fn on_event(event: UtimerEvent) {
    if event == UtimerEvent::Overflow {
        OVERFLOWS.fetch_add(1, Ordering::Relaxed);
    }
}

fn start_tick<T: UtimerDriver>(utimer: &mut T) -> HalResult<()> {
    utimer.initialize(CH0, Some(on_event))?;
    utimer.power_control(CH0, PowerState::Full)?;
    utimer.config_counter(CH0, CounterMode::Basic, CounterDirection::Up)?;
    utimer.set_count(CH0, Counter::Cntr, 0)?;
    utimer.set_count(CH0, Counter::CntrPtr, HALF_SECOND)?;
    utimer.start(CH0)
}

#[entry]
fn main() -> ! {
    let Some(cp) = cortex_m::Peripherals::take() else {
        loop {}
    };

    // SAFETY: the UTIMER block lives at UTIMER_BASE and is only accessed here.
    let regs = unsafe { Mmio::new(UTIMER_BASE) };
    UTIMER.install(Utimer::new(regs, Nvic::new(cp.NVIC, NVIC_PRIO_BITS), BOARD));

    if !matches!(UTIMER.with(|utimer| start_tick(utimer)), Ok(Ok(()))) {
        loop {}
    }

    loop {
        cortex_m::asm::wfi();
    }
}
