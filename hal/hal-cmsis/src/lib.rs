#![no_std]

//! # HAL CMSIS
//!
//! Cortex-M implementations of the `hal` traits. Currently this is the NVIC
//! backed [`InterruptController`](hal::InterruptController) used by the
//! peripheral drivers to route their interrupt lines.

pub mod nvic;

pub use nvic::{NvicIrq, Nvic, MAX_IRQ_LINES};

#[cfg(test)]
extern crate std;
