//! Board-agnostic motor and servo output driver
//!
//! Converts a normalized commanded value per actuator (conventionally
//! 1000-2000, with 1000 meaning minimum/idle) into a correctly timed
//! pulse on a hardware timer output channel, across mutually
//! incompatible ESC signaling protocols:
//!
//! - Standard PWM and brushed duty-cycle output (free-running)
//! - OneShot125 / OneShot42 / Multishot (synced: one pulse per control
//!   cycle, committed by [`OutputDriver::complete_motor_update`])
//! - DShot150/300/600, delegated to a digital backend
//!
//! All hardware access goes through the `aquila-hal` backend traits;
//! this crate contains only the protocol strategy table, the output
//! port registries, and the write/synchronization logic.

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod driver;
pub mod port;
pub mod protocol;

pub use config::{MotorConfig, ServoConfig};
pub use driver::OutputDriver;
pub use port::{OutputPort, MAX_SUPPORTED_MOTORS, MAX_SUPPORTED_SERVOS};
pub use protocol::{MotorProtocol, PulseEncoder, SyncMode};
