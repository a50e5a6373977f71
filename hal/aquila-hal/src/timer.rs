//! Timer and output-compare backend traits
//!
//! The output driver programs hardware exclusively through these traits.
//! Implementations handle the actual register manipulation for the
//! specific chip.

use crate::pin::PinTag;

/// Identity of a physical timer instance
///
/// Several output channels may belong to the same timer; the driver uses
/// this identity to force at most one rollover per timer per update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerId(pub u8);

/// Hardware capabilities of a timer output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputFlags {
    /// Channel has a main output stage that must be enabled on the timer
    pub enabled: bool,
    /// Output is wired inverted on the board
    pub inverted: bool,
    /// Channel drives the complementary (N) output
    pub complementary: bool,
}

impl Default for OutputFlags {
    fn default() -> Self {
        Self {
            enabled: true,
            inverted: false,
            complementary: false,
        }
    }
}

/// A resolved timer-channel binding for one pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerChannel {
    /// Owning timer instance
    pub timer: TimerId,
    /// Channel number within the timer
    pub channel: u8,
    /// Output stage capabilities
    pub output: OutputFlags,
}

/// Output compare polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OcPolarity {
    High,
    Low,
}

/// Digital protocol variant handled by the DShot backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DshotVariant {
    Dshot150,
    Dshot300,
    Dshot600,
}

/// Writable compare-register cell
///
/// The cell has hardware register semantics: writes take effect on the
/// timer's own schedule, and a value of zero means no pulse is emitted
/// for the period. Each cell is exclusively owned by one output port.
pub trait CompareCell {
    /// Stage a compare value in ticks
    fn set(&self, ticks: u16);

    /// Read back the currently staged compare value
    fn get(&self) -> u16;
}

/// Timer/GPIO backend consumed by the output driver
///
/// Implementations should handle the actual peripheral programming for
/// the specific chip.
pub trait OutputBackend {
    /// Compare-register cell handed out per configured channel
    type Ccr: CompareCell;

    /// Resolve the timer channel bound to a pin, if the pin has an
    /// output-capable timer resource
    fn resolve_channel(&mut self, tag: PinTag) -> Option<TimerChannel>;

    /// Configure the pin as alternate-function push-pull output
    fn configure_af_push_pull(&mut self, tag: PinTag);

    /// Program the timer's period and counting clock
    fn configure_time_base(&mut self, timer: TimerId, period: u16, clock_mhz: u32);

    /// Program one output-compare channel
    fn configure_output_compare(
        &mut self,
        channel: &TimerChannel,
        initial: u16,
        polarity: OcPolarity,
        complementary: bool,
    );

    /// Enable the timer's main output stage
    fn enable_outputs(&mut self, timer: TimerId);

    /// Start the timer counting
    fn start_timer(&mut self, timer: TimerId);

    /// Hand out the writable compare cell for a configured channel
    fn compare_cell(&mut self, channel: &TimerChannel) -> Self::Ccr;

    /// Force an immediate counter rollover, committing the staged compare
    /// value as the just-emitted pulse
    fn force_rollover(&mut self, timer: TimerId);
}

/// Digital (bit-serial) motor protocol backend
///
/// Consumed only when a DShot protocol is selected. Pulse encoding and
/// frame timing are specified elsewhere; the driver only routes writes
/// and end-of-cycle completion here.
pub trait DshotBackend {
    /// Configure the hardware path for one motor output
    fn configure_dshot_motor(&mut self, channel: &TimerChannel, index: usize, variant: DshotVariant);

    /// Stage the commanded value for one motor
    fn write_dshot(&mut self, index: usize, value: u16);

    /// Flush staged values for `count` motors at the end of the control cycle
    fn complete_dshot_update(&mut self, count: usize);
}
