//! Hardware Abstraction Layer (HAL) for embedded systems
//!
//! This crate provides the vendor-agnostic traits the peripheral drivers in
//! this workspace are written against: the common error type, the NVIC-style
//! interrupt controller, CMSIS power states and the GPIO pin used for pin
//! multiplexing.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod error;
pub mod gpio;
pub mod interrupt;
pub mod power;

// Re-export commonly used types
pub use error::{HalError, HalResult};
pub use interrupt::{InterruptController, InterruptPriority, IrqNumber};
pub use power::PowerState;
