//! Hardware abstraction traits for the Aquila motor output driver
//!
//! These traits define the narrow interface between the board-agnostic
//! output driver and chip-specific timer/GPIO backends:
//!
//! - Pin identity and pin-to-timer-channel resolution
//! - Timer time base, output compare, and forced rollover
//! - Digital (DShot family) motor backends
//!
//! Chip backends implement these traits in their own target-specific
//! crates. The `mock` feature provides a recording fake backend for
//! host-side tests.

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "mock")]
extern crate std;

pub mod pin;
pub mod timer;

#[cfg(feature = "mock")]
pub mod mock;

pub use pin::PinTag;
pub use timer::{
    CompareCell, DshotBackend, DshotVariant, OcPolarity, OutputBackend, OutputFlags, TimerChannel,
    TimerId,
};
