//! Protocol strategy table
//!
//! Per-protocol timer clocks and the pure pulse-encoding functions that
//! map a commanded value to a compare-register tick count. The encoder
//! for the active protocol is resolved once at configuration time and
//! stored per port.

use aquila_hal::DshotVariant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timer clock for standard PWM output (MHz)
pub const PWM_TIMER_MHZ: u32 = 1;
/// Timer clock for brushed duty-cycle output (MHz)
pub const BRUSHED_TIMER_MHZ: u32 = 8;
/// Timer clock for OneShot125 (MHz)
pub const ONESHOT125_TIMER_MHZ: u32 = 8;
/// Timer clock for OneShot42 (MHz)
pub const ONESHOT42_TIMER_MHZ: u32 = 24;
/// Timer clock for Multishot (MHz)
pub const MULTISHOT_TIMER_MHZ: u32 = 72;

/// ESC signaling protocol
///
/// Exactly one protocol is active for all motor outputs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MotorProtocol {
    /// Standard 1000-2000 us pulse-coded signaling
    Standard,
    /// Brushed DC output, duty-cycle scaled across the full timer period
    Brushed,
    /// 125-250 us pulses, one per control cycle
    #[default]
    OneShot125,
    /// 42-84 us pulses, one per control cycle
    OneShot42,
    /// 5-25 us pulses, one per control cycle
    Multishot,
    Dshot150,
    Dshot300,
    Dshot600,
}

/// How the driver must drive hardware for a protocol
pub(crate) enum ProtocolFamily {
    /// Generic timer output-compare path at the given counting clock
    Analog { clock_mhz: u32 },
    /// Delegated to the digital backend
    Digital(DshotVariant),
}

impl MotorProtocol {
    pub(crate) fn family(self) -> ProtocolFamily {
        match self {
            Self::Standard => ProtocolFamily::Analog {
                clock_mhz: PWM_TIMER_MHZ,
            },
            Self::Brushed => ProtocolFamily::Analog {
                clock_mhz: BRUSHED_TIMER_MHZ,
            },
            Self::OneShot125 => ProtocolFamily::Analog {
                clock_mhz: ONESHOT125_TIMER_MHZ,
            },
            Self::OneShot42 => ProtocolFamily::Analog {
                clock_mhz: ONESHOT42_TIMER_MHZ,
            },
            Self::Multishot => ProtocolFamily::Analog {
                clock_mhz: MULTISHOT_TIMER_MHZ,
            },
            Self::Dshot150 => ProtocolFamily::Digital(DshotVariant::Dshot150),
            Self::Dshot300 => ProtocolFamily::Digital(DshotVariant::Dshot300),
            Self::Dshot600 => ProtocolFamily::Digital(DshotVariant::Dshot600),
        }
    }

    /// Standard and brushed output repeat at the timer's own rate, so
    /// they are always free-running and idle at zero regardless of the
    /// caller-supplied settings.
    pub fn forces_unsynced(self) -> bool {
        matches!(self, Self::Standard | Self::Brushed)
    }

    /// Whether this protocol is handled by the digital backend
    pub fn is_digital(self) -> bool {
        matches!(self, Self::Dshot150 | Self::Dshot300 | Self::Dshot600)
    }
}

/// End-of-cycle synchronization behavior of the active protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncMode {
    /// Free-running: the timer repeats autonomously at its configured rate
    #[default]
    None,
    /// Oneshot family: the driver forces a rollover once per control cycle
    Oneshot,
    /// DShot family: completion is delegated to the digital backend
    Digital,
}

/// Pulse encoder resolved for one output port
///
/// Maps a commanded value to a compare-register tick count. Tick math is
/// integer with nearest-integer rounding (half away from zero), which
/// matches the reference `lrintf` encoding for the representable range.
/// Subtractive terms clamp at zero for inputs below 1000.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseEncoder {
    /// Compare count is the commanded value itself
    Standard,
    /// Linear duty-cycle scaling across the full timer period
    Brushed { period: u16 },
    /// Pulse length in units of 1/8 us
    OneShot125 { clock_mhz: u32 },
    /// Pulse length in units of 1/24 us
    OneShot42 { clock_mhz: u32 },
    /// 5 us floor plus proportional scaling across a 20 us span
    Multishot { clock_mhz: u32 },
    /// Routed to the digital backend; no tick encoding here
    Digital,
}

impl PulseEncoder {
    /// Resolve the encoder for a protocol
    ///
    /// `period` is only meaningful for brushed output, which scales duty
    /// across the whole timer period.
    pub fn for_protocol(protocol: MotorProtocol, period: u16) -> Self {
        match protocol {
            MotorProtocol::Standard => Self::Standard,
            MotorProtocol::Brushed => Self::Brushed { period },
            MotorProtocol::OneShot125 => Self::OneShot125 {
                clock_mhz: ONESHOT125_TIMER_MHZ,
            },
            MotorProtocol::OneShot42 => Self::OneShot42 {
                clock_mhz: ONESHOT42_TIMER_MHZ,
            },
            MotorProtocol::Multishot => Self::Multishot {
                clock_mhz: MULTISHOT_TIMER_MHZ,
            },
            MotorProtocol::Dshot150 | MotorProtocol::Dshot300 | MotorProtocol::Dshot600 => {
                Self::Digital
            }
        }
    }

    /// Encode a commanded value into compare-register ticks
    pub fn encode(&self, value: u16) -> u16 {
        match *self {
            Self::Standard => value,
            Self::Brushed { period } => {
                // Truncating division, reference semantics: full period
                // duty at value == 2000.
                (u32::from(value.saturating_sub(1000)) * u32::from(period) / 1000) as u16
            }
            Self::OneShot125 { clock_mhz } => div_round(u32::from(value) * clock_mhz, 8) as u16,
            Self::OneShot42 { clock_mhz } => div_round(u32::from(value) * clock_mhz, 24) as u16,
            Self::Multishot { clock_mhz } => {
                let span = u32::from(value.saturating_sub(1000)) * clock_mhz * 20;
                (div_round(span, 1000) + clock_mhz * 5) as u16
            }
            // Digital values are framed by the backend, not tick-encoded
            Self::Digital => value,
        }
    }
}

/// Nearest-integer division for non-negative tick math, half rounds up
fn div_round(n: u32, d: u32) -> u32 {
    (n + d / 2) / d
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn standard_is_identity() {
        let enc = PulseEncoder::Standard;
        assert_eq!(enc.encode(1000), 1000);
        assert_eq!(enc.encode(1500), 1500);
        assert_eq!(enc.encode(2000), 2000);
    }

    #[test]
    fn brushed_scales_duty_across_period() {
        let enc = PulseEncoder::Brushed { period: 32000 };
        assert_eq!(enc.encode(1000), 0);
        assert_eq!(enc.encode(1500), 16000);
        assert_eq!(enc.encode(2000), 32000);
    }

    #[test]
    fn brushed_truncates_like_reference() {
        // 1 * 999 / 1000 truncates to 0
        let enc = PulseEncoder::Brushed { period: 999 };
        assert_eq!(enc.encode(1001), 0);
        assert_eq!(enc.encode(2000), 999);
    }

    #[test]
    fn oneshot125_at_8mhz_passes_value_through() {
        let enc = PulseEncoder::OneShot125 { clock_mhz: 8 };
        assert_eq!(enc.encode(1500), 1500);
        assert_eq!(enc.encode(1000), 1000);
        assert_eq!(enc.encode(2000), 2000);
    }

    #[test]
    fn oneshot125_rounds_to_nearest() {
        // 1001 * 12 / 8 = 1501.5, rounds away from zero
        let enc = PulseEncoder::OneShot125 { clock_mhz: 12 };
        assert_eq!(enc.encode(1001), 1502);
        assert_eq!(enc.encode(1000), 1500);
    }

    #[test]
    fn oneshot42_at_24mhz_passes_value_through() {
        let enc = PulseEncoder::OneShot42 { clock_mhz: 24 };
        assert_eq!(enc.encode(1000), 1000);
        assert_eq!(enc.encode(1777), 1777);
    }

    #[test]
    fn multishot_has_5us_floor() {
        let enc = PulseEncoder::Multishot { clock_mhz: 72 };
        // Zero proportional term at minimum command
        assert_eq!(enc.encode(1000), 72 * 5);
        // Full span: 20 us on top of the floor
        assert_eq!(enc.encode(2000), 72 * 25);
        // 1 count above idle: 1.44 ticks, rounds to 1
        assert_eq!(enc.encode(1001), 72 * 5 + 1);
    }

    #[test]
    fn values_below_idle_clamp_to_floor() {
        assert_eq!(PulseEncoder::Brushed { period: 32000 }.encode(900), 0);
        assert_eq!(PulseEncoder::Multishot { clock_mhz: 72 }.encode(900), 360);
    }

    #[test]
    fn standard_and_brushed_force_unsynced() {
        assert!(MotorProtocol::Standard.forces_unsynced());
        assert!(MotorProtocol::Brushed.forces_unsynced());
        assert!(!MotorProtocol::OneShot125.forces_unsynced());
        assert!(!MotorProtocol::Dshot600.forces_unsynced());
    }

    #[test]
    fn dshot_variants_are_digital() {
        assert!(MotorProtocol::Dshot150.is_digital());
        assert!(MotorProtocol::Dshot300.is_digital());
        assert!(MotorProtocol::Dshot600.is_digital());
        assert!(!MotorProtocol::Multishot.is_digital());
    }

    proptest! {
        #[test]
        fn encoders_are_monotonic(v in 1000u16..2000) {
            let encoders = [
                PulseEncoder::Standard,
                PulseEncoder::Brushed { period: 32000 },
                PulseEncoder::OneShot125 { clock_mhz: ONESHOT125_TIMER_MHZ },
                PulseEncoder::OneShot42 { clock_mhz: ONESHOT42_TIMER_MHZ },
                PulseEncoder::Multishot { clock_mhz: MULTISHOT_TIMER_MHZ },
            ];
            for enc in encoders {
                prop_assert!(enc.encode(v + 1) >= enc.encode(v));
            }
        }
    }
}
