use statig::blocking::IntoStateMachineExt as _;

mod hsm;

use hsm::{GestureHsm, GestureInput, State};

pub const DEFAULT_LONG_TAP_DELAY_TICKS: u16 = 15;
pub const DEFAULT_MULTI_TAP_DELAY_TICKS: u16 = 13;

/// Byte offset of the touch state inside the 8-byte input report.
pub const TOUCH_REPORT_STATE_OFFSET: usize = 3;

const MAX_EVENTS_PER_TICK: usize = 4;

/// Touch state decoded from one input report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawTouchSample {
    Clear,
    Touching,
    EndTouch,
    StartTouch,
    Unknown(u8),
}

impl RawTouchSample {
    pub const fn from_byte(raw: u8) -> Self {
        match raw {
            0x00 => Self::Clear,
            0x01 => Self::Touching,
            0x02 => Self::EndTouch,
            0x04 => Self::StartTouch,
            other => Self::Unknown(other),
        }
    }

    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Clear => 0x00,
            Self::Touching => 0x01,
            Self::EndTouch => 0x02,
            Self::StartTouch => 0x04,
            Self::Unknown(raw) => raw,
        }
    }

    /// Returns `None` when the report carries no touch byte (empty read).
    pub fn from_report(report: &[u8]) -> Option<Self> {
        report
            .get(TOUCH_REPORT_STATE_OFFSET)
            .copied()
            .map(Self::from_byte)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Tap,
    MultiTap,
    LongTapStart,
    LongTapEnd,
}

impl GestureKind {
    pub const ALL: [GestureKind; 4] = [
        GestureKind::Tap,
        GestureKind::MultiTap,
        GestureKind::LongTapStart,
        GestureKind::LongTapEnd,
    ];

    pub const fn index(self) -> usize {
        match self {
            Self::Tap => 0,
            Self::MultiTap => 1,
            Self::LongTapStart => 2,
            Self::LongTapEnd => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Tap => "tap",
            Self::MultiTap => "multi_tap",
            Self::LongTapStart => "long_tap_start",
            Self::LongTapEnd => "long_tap_end",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureEvent {
    Tap,
    /// Number of touch-downs seen inside one multi-tap window, always >= 2.
    MultiTap(u8),
    LongTapStart,
    LongTapEnd,
}

impl GestureEvent {
    pub const fn kind(self) -> GestureKind {
        match self {
            Self::Tap => GestureKind::Tap,
            Self::MultiTap(_) => GestureKind::MultiTap,
            Self::LongTapStart => GestureKind::LongTapStart,
            Self::LongTapEnd => GestureKind::LongTapEnd,
        }
    }

    pub const fn count(self) -> u8 {
        match self {
            Self::MultiTap(count) => count,
            _ => 1,
        }
    }

    pub(crate) const fn for_touch_count(count: u8) -> Self {
        if count > 1 {
            Self::MultiTap(count)
        } else {
            Self::Tap
        }
    }
}

/// Gesture thresholds, counted in polling ticks rather than wall-clock time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureDelays {
    pub long_tap_ticks: u16,
    pub multi_tap_ticks: u16,
}

impl Default for GestureDelays {
    fn default() -> Self {
        Self {
            long_tap_ticks: DEFAULT_LONG_TAP_DELAY_TICKS,
            multi_tap_ticks: DEFAULT_MULTI_TAP_DELAY_TICKS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureStateId {
    Idle,
    StartTouch,
    MultiTapWindow,
    LongTap,
}

/// Consumer of decoded gestures.
pub trait EventSink {
    fn notify(&mut self, event: GestureEvent);
}

impl<F: FnMut(GestureEvent)> EventSink for F {
    fn notify(&mut self, event: GestureEvent) {
        self(event)
    }
}

impl EventSink for Vec<GestureEvent> {
    fn notify(&mut self, event: GestureEvent) {
        self.push(event);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GestureOutput {
    pub events: heapless::Vec<GestureEvent, MAX_EVENTS_PER_TICK>,
}

impl GestureOutput {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = GestureEvent> + '_ {
        self.events.iter().copied()
    }
}

#[derive(Default)]
struct DispatchContext {
    events: heapless::Vec<GestureEvent, MAX_EVENTS_PER_TICK>,
}

impl DispatchContext {
    fn emit(&mut self, event: GestureEvent) {
        log::debug!("gesture: {event:?}");
        if self.events.push(event).is_err() {
            log::warn!("gesture: dropped {event:?}, tick buffer full");
        }
    }

    fn finish(self) -> GestureOutput {
        GestureOutput {
            events: self.events,
        }
    }
}

/// Turns the per-tick stream of raw touch samples into gestures.
///
/// Call exactly one of [`on_data`](Self::on_data) or [`on_tick`](Self::on_tick)
/// per polling tick. The engine does no I/O and never fails, so it can be
/// dropped at any tick boundary.
pub struct GestureEngine {
    machine: statig::blocking::StateMachine<GestureHsm>,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new(GestureDelays::default())
    }
}

impl GestureEngine {
    pub fn new(delays: GestureDelays) -> Self {
        Self {
            machine: GestureHsm::new(delays).state_machine(),
        }
    }

    pub fn on_data(&mut self, sink: &mut impl EventSink, sample: RawTouchSample) {
        let output = self.dispatch(GestureInput::Data(sample));
        forward(sink, output);
    }

    pub fn on_tick(&mut self, sink: &mut impl EventSink) {
        let output = self.dispatch(GestureInput::NoData);
        forward(sink, output);
    }

    /// Runs one polling tick; `None` means no report was available.
    pub fn step(&mut self, input: Option<RawTouchSample>) -> GestureOutput {
        match input {
            Some(sample) => self.dispatch(GestureInput::Data(sample)),
            None => self.dispatch(GestureInput::NoData),
        }
    }

    pub fn state(&self) -> GestureStateId {
        match self.machine.state() {
            State::Idle { .. } => GestureStateId::Idle,
            State::StartTouch { .. } => GestureStateId::StartTouch,
            State::MultiTapWindow { .. } => GestureStateId::MultiTapWindow,
            State::LongTap { .. } => GestureStateId::LongTap,
        }
    }

    pub fn delays(&self) -> GestureDelays {
        self.machine.inner().delays
    }

    /// Touch-downs counted toward the gesture currently being decoded.
    pub fn pending_touch_count(&self) -> u8 {
        self.machine.inner().touch_count
    }

    /// Drops the active state and every counter, back to idle.
    pub fn reset(&mut self) {
        let delays = self.delays();
        self.machine = GestureHsm::new(delays).state_machine();
    }

    fn dispatch(&mut self, input: GestureInput) -> GestureOutput {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&input, &mut context);
        context.finish()
    }
}

fn forward(sink: &mut impl EventSink, output: GestureOutput) {
    for event in output.events {
        sink.notify(event);
    }
}

#[cfg(test)]
mod tests;
