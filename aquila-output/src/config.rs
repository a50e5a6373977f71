//! Output configuration types
//!
//! Plain configuration structs filled in by the caller. Loading and
//! persistence are out of scope here; the optional `serde` feature adds
//! derives for callers that serialize their configuration.

use aquila_hal::PinTag;

use crate::port::{MAX_SUPPORTED_MOTORS, MAX_SUPPORTED_SERVOS};
use crate::protocol::MotorProtocol;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Motor output configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorConfig {
    /// Ordered pin bindings; the first `None` entry stops configuration
    pub pins: [Option<PinTag>; MAX_SUPPORTED_MOTORS],
    /// Active ESC protocol for all motors
    pub protocol: MotorProtocol,
    /// Output update rate in Hz for free-running protocols
    pub pwm_rate: u16,
    /// Force free-running updates even for a synced-capable protocol
    pub use_unsynced_pwm: bool,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            pins: [None; MAX_SUPPORTED_MOTORS],
            protocol: MotorProtocol::default(),
            pwm_rate: 480,
            use_unsynced_pwm: false,
        }
    }
}

/// Servo output configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServoConfig {
    /// Ordered pin bindings; the first `None` entry stops configuration
    pub pins: [Option<PinTag>; MAX_SUPPORTED_SERVOS],
    /// Servo refresh rate in Hz
    pub servo_pwm_rate: u16,
    /// Pulse staged at initialization, conventionally mid-travel
    pub servo_center_pulse: u16,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            pins: [None; MAX_SUPPORTED_SERVOS],
            servo_pwm_rate: 50,
            servo_center_pulse: 1500,
        }
    }
}
