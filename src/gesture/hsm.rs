use statig::prelude::*;

use super::{DispatchContext, GestureDelays, GestureEvent, RawTouchSample};

#[derive(Clone, Copy, Debug)]
pub(super) enum GestureInput {
    Data(RawTouchSample),
    NoData,
}

pub(super) struct GestureHsm {
    pub(super) delays: GestureDelays,
    // Lives outside the state-local storage so it survives the
    // start_touch -> multi_tap_window -> start_touch cycle.
    pub(super) touch_count: u8,
}

impl GestureHsm {
    pub(super) fn new(delays: GestureDelays) -> Self {
        Self {
            delays,
            touch_count: 0,
        }
    }

    fn begin_interaction(&mut self) {
        self.touch_count = 1;
    }

    fn end_interaction(&mut self) {
        self.touch_count = 0;
    }

    /// Taps completed earlier in the window belong to their own gesture, so they
    /// are reported before the current touch turns into a long press.
    fn flush_completed_taps(&mut self, context: &mut DispatchContext) {
        let completed = self.touch_count.saturating_sub(1);
        if completed > 0 {
            context.emit(GestureEvent::for_touch_count(completed));
        }
        self.touch_count = 1;
    }
}

#[state_machine(
    initial = "State::idle()",
    state(derive(Debug, Clone, Copy, PartialEq, Eq)),
    visibility = "pub(super)"
)]
impl GestureHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &GestureInput) -> Outcome<State> {
        let _ = context;
        match event {
            GestureInput::Data(RawTouchSample::StartTouch) => {
                self.begin_interaction();
                log::trace!("idle -> start_touch");
                Transition(State::start_touch(0))
            }
            _ => Handled,
        }
    }

    /// Finger is down; counts data ticks to tell a long press from a tap.
    #[state]
    fn start_touch(
        &mut self,
        timer: &mut u16,
        context: &mut DispatchContext,
        event: &GestureInput,
    ) -> Outcome<State> {
        match event {
            GestureInput::Data(RawTouchSample::EndTouch) => {
                log::trace!("start_touch -> multi_tap_window after {timer} ticks");
                Transition(State::multi_tap_window(0))
            }
            GestureInput::Data(RawTouchSample::Unknown(_)) | GestureInput::NoData => Handled,
            GestureInput::Data(_) => {
                if *timer >= self.delays.long_tap_ticks {
                    self.flush_completed_taps(context);
                    context.emit(GestureEvent::LongTapStart);
                    log::trace!("start_touch -> long_tap");
                    Transition(State::long_tap())
                } else {
                    *timer = timer.saturating_add(1);
                    Handled
                }
            }
        }
    }

    /// Finger is up; waits for another touch-down before settling on tap vs multi-tap.
    #[state]
    fn multi_tap_window(
        &mut self,
        timer: &mut u16,
        context: &mut DispatchContext,
        event: &GestureInput,
    ) -> Outcome<State> {
        match event {
            GestureInput::Data(RawTouchSample::StartTouch) => {
                self.touch_count = self.touch_count.saturating_add(1);
                log::trace!(
                    "multi_tap_window -> start_touch, touch_count={}",
                    self.touch_count
                );
                Transition(State::start_touch(0))
            }
            GestureInput::Data(_) => Handled,
            GestureInput::NoData => {
                // The current tick counts toward the window.
                *timer = timer.saturating_add(1);
                if *timer >= self.delays.multi_tap_ticks {
                    context.emit(GestureEvent::for_touch_count(self.touch_count));
                    self.end_interaction();
                    log::trace!("multi_tap_window -> idle");
                    Transition(State::idle())
                } else {
                    Handled
                }
            }
        }
    }

    #[state]
    fn long_tap(&mut self, context: &mut DispatchContext, event: &GestureInput) -> Outcome<State> {
        match event {
            GestureInput::Data(RawTouchSample::EndTouch) => {
                context.emit(GestureEvent::LongTapEnd);
                self.end_interaction();
                log::trace!("long_tap -> idle");
                Transition(State::idle())
            }
            _ => Handled,
        }
    }
}
