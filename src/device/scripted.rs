use std::collections::VecDeque;

use super::{DeviceError, TouchDevice};
use crate::{display::DisplayState, gesture::RawTouchSample};

/// In-memory device replaying a fixed list of per-tick inputs.
///
/// Once the script runs out every read reports no data. Display writes are kept
/// so tests can check what the handlers did to the light.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDevice {
    inputs: VecDeque<Option<RawTouchSample>>,
    display: DisplayState,
    writes: Vec<DisplayState>,
    reads: usize,
    closed: bool,
}

impl ScriptedDevice {
    pub fn new(inputs: impl IntoIterator<Item = Option<RawTouchSample>>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, input: Option<RawTouchSample>) {
        self.inputs.push_back(input);
    }

    pub fn extend_idle(&mut self, ticks: usize) {
        self.inputs.extend(std::iter::repeat(None).take(ticks));
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn writes(&self) -> &[DisplayState] {
        &self.writes
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl TouchDevice for ScriptedDevice {
    fn read_touch(&mut self) -> Result<Option<RawTouchSample>, DeviceError> {
        if self.closed {
            return Err(DeviceError::Closed);
        }
        self.reads += 1;
        Ok(self.inputs.pop_front().flatten())
    }

    fn set_display(&mut self, display: DisplayState) -> Result<(), DeviceError> {
        if self.closed {
            return Err(DeviceError::Closed);
        }
        self.display = display;
        self.writes.push(display);
        Ok(())
    }

    fn display(&self) -> DisplayState {
        self.display
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        if !self.closed {
            self.set_display(DisplayState::OFF)?;
            self.closed = true;
        }
        Ok(())
    }
}
