//! Output port registry types

use aquila_hal::{CompareCell, PinTag, TimerId};

use crate::protocol::PulseEncoder;

/// Maximum motor outputs per vehicle
pub const MAX_SUPPORTED_MOTORS: usize = 12;

/// Maximum servo outputs per vehicle
pub const MAX_SUPPORTED_SERVOS: usize = 8;

/// One physical actuator output channel
///
/// Created during initialization from the configured pin list, mutated
/// by writes every control cycle, and only ever torn down by wholesale
/// re-initialization. A staged compare value of zero means no pulse is
/// emitted for the period.
pub struct OutputPort<C: CompareCell> {
    /// Exclusive compare-register cell; `None` for digital-backend ports
    pub(crate) ccr: Option<C>,
    /// Configured timer period in ticks
    pub(crate) period: u16,
    /// Owning timer instance, used for rollover dedup
    pub(crate) timer: TimerId,
    /// Set only after successful configuration
    pub(crate) enabled: bool,
    /// Protocol strategy resolved at configuration time
    pub(crate) encoder: PulseEncoder,
    /// Bound GPIO pin
    pub(crate) pin: Option<PinTag>,
}

impl<C: CompareCell> OutputPort<C> {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn period(&self) -> u16 {
        self.period
    }

    pub fn timer(&self) -> TimerId {
        self.timer
    }

    pub fn encoder(&self) -> PulseEncoder {
        self.encoder
    }

    pub fn pin(&self) -> Option<PinTag> {
        self.pin
    }

    /// Currently staged compare value, if this port owns a compare cell
    pub fn compare(&self) -> Option<u16> {
        self.ccr.as_ref().map(CompareCell::get)
    }

    /// Stage a compare value; no-op for ports without a compare cell
    pub(crate) fn set_compare(&self, ticks: u16) {
        if let Some(ccr) = &self.ccr {
            ccr.set(ticks);
        }
    }
}
