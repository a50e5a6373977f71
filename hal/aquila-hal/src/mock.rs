//! Recording fake backend for host-side tests
//!
//! `MockBackend` resolves pin tags from a programmable binding table,
//! hands out shared in-memory compare cells, and records every backend
//! call so tests can assert on configuration order, rollover counts, and
//! digital writes.

use core::cell::Cell;
use std::rc::Rc;
use std::vec::Vec;

use crate::pin::PinTag;
use crate::timer::{
    CompareCell, DshotBackend, DshotVariant, OcPolarity, OutputBackend, TimerChannel, TimerId,
};

/// One recorded backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEvent {
    AfPushPull(PinTag),
    TimeBase {
        timer: TimerId,
        period: u16,
        clock_mhz: u32,
    },
    OutputCompare {
        timer: TimerId,
        channel: u8,
        initial: u16,
        polarity: OcPolarity,
        complementary: bool,
    },
    EnableOutputs(TimerId),
    StartTimer(TimerId),
    ForceRollover(TimerId),
    DshotConfigure {
        channel: u8,
        index: usize,
        variant: DshotVariant,
    },
    DshotWrite {
        index: usize,
        value: u16,
    },
    DshotComplete {
        count: usize,
    },
}

/// Shared in-memory compare-register cell
#[derive(Debug, Clone, Default)]
pub struct MockCcr(Rc<Cell<u16>>);

impl CompareCell for MockCcr {
    fn set(&self, ticks: u16) {
        self.0.set(ticks);
    }

    fn get(&self) -> u16 {
        self.0.get()
    }
}

/// Recording fake timer/GPIO/DShot backend
#[derive(Debug, Default)]
pub struct MockBackend {
    bindings: Vec<(PinTag, TimerChannel)>,
    cells: Vec<((u8, u8), MockCcr)>,
    /// Every backend call, in order
    pub events: Vec<MockEvent>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pin-to-channel binding to the resolver table
    pub fn with_binding(mut self, tag: PinTag, channel: TimerChannel) -> Self {
        self.bindings.push((tag, channel));
        self
    }

    /// Number of forced rollovers recorded for one timer
    pub fn rollover_count(&self, timer: TimerId) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, MockEvent::ForceRollover(t) if *t == timer))
            .count()
    }

    /// The compare cell for a channel, if one has been handed out
    pub fn cell(&self, timer: TimerId, channel: u8) -> Option<MockCcr> {
        self.cells
            .iter()
            .find(|(key, _)| *key == (timer.0, channel))
            .map(|(_, cell)| cell.clone())
    }
}

impl OutputBackend for MockBackend {
    type Ccr = MockCcr;

    fn resolve_channel(&mut self, tag: PinTag) -> Option<TimerChannel> {
        self.bindings
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, channel)| *channel)
    }

    fn configure_af_push_pull(&mut self, tag: PinTag) {
        self.events.push(MockEvent::AfPushPull(tag));
    }

    fn configure_time_base(&mut self, timer: TimerId, period: u16, clock_mhz: u32) {
        self.events.push(MockEvent::TimeBase {
            timer,
            period,
            clock_mhz,
        });
    }

    fn configure_output_compare(
        &mut self,
        channel: &TimerChannel,
        initial: u16,
        polarity: OcPolarity,
        complementary: bool,
    ) {
        self.events.push(MockEvent::OutputCompare {
            timer: channel.timer,
            channel: channel.channel,
            initial,
            polarity,
            complementary,
        });
    }

    fn enable_outputs(&mut self, timer: TimerId) {
        self.events.push(MockEvent::EnableOutputs(timer));
    }

    fn start_timer(&mut self, timer: TimerId) {
        self.events.push(MockEvent::StartTimer(timer));
    }

    fn compare_cell(&mut self, channel: &TimerChannel) -> Self::Ccr {
        let key = (channel.timer.0, channel.channel);
        if let Some((_, cell)) = self.cells.iter().find(|(k, _)| *k == key) {
            return cell.clone();
        }
        let cell = MockCcr::default();
        self.cells.push((key, cell.clone()));
        cell
    }

    fn force_rollover(&mut self, timer: TimerId) {
        self.events.push(MockEvent::ForceRollover(timer));
    }
}

impl DshotBackend for MockBackend {
    fn configure_dshot_motor(
        &mut self,
        channel: &TimerChannel,
        index: usize,
        variant: DshotVariant,
    ) {
        self.events.push(MockEvent::DshotConfigure {
            channel: channel.channel,
            index,
            variant,
        });
    }

    fn write_dshot(&mut self, index: usize, value: u16) {
        self.events.push(MockEvent::DshotWrite { index, value });
    }

    fn complete_dshot_update(&mut self, count: usize) {
        self.events.push(MockEvent::DshotComplete { count });
    }
}
