use core::ops::ControlFlow;
use std::{
    io,
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::{Duration, Instant},
};

use crate::{
    config::ButtonConfig,
    device::{DeviceError, TouchDevice},
    gesture::{EventSink, GestureEngine, GestureEvent, RawTouchSample},
    recorder::EventRecorder,
    subscribers::Subscribers,
};

#[derive(Debug, thiserror::Error)]
pub enum ButtonError {
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error("failed to record gesture: {0}")]
    Record(#[from] io::Error),
}

/// A touch device, its gesture decoder and the handlers reacting to it.
pub struct Button<D> {
    device: D,
    engine: GestureEngine,
    subscribers: Subscribers<D>,
    recorder: Option<EventRecorder>,
    tick_interval: Duration,
    clear_is_idle: bool,
    tick: u64,
}

impl<D: TouchDevice> Button<D> {
    pub fn new(device: D, config: &ButtonConfig) -> Self {
        Self {
            device,
            engine: GestureEngine::new(config.delays()),
            subscribers: Subscribers::new(),
            recorder: None,
            tick_interval: config.tick_interval(),
            clear_is_idle: config.polling.clear_is_idle,
            tick: 0,
        }
    }

    pub fn with_recorder(mut self, recorder: EventRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn on_tap<F>(&mut self, handler: F)
    where
        F: FnMut(&mut D, u8) -> Result<ControlFlow<()>, DeviceError> + 'static,
    {
        self.subscribers.on_tap(handler);
    }

    pub fn on_multi_tap<F>(&mut self, handler: F)
    where
        F: FnMut(&mut D, u8) -> Result<ControlFlow<()>, DeviceError> + 'static,
    {
        self.subscribers.on_multi_tap(handler);
    }

    pub fn on_long_tap_start<F>(&mut self, handler: F)
    where
        F: FnMut(&mut D, u8) -> Result<ControlFlow<()>, DeviceError> + 'static,
    {
        self.subscribers.on_long_tap_start(handler);
    }

    pub fn on_long_tap_end<F>(&mut self, handler: F)
    where
        F: FnMut(&mut D, u8) -> Result<ControlFlow<()>, DeviceError> + 'static,
    {
        self.subscribers.on_long_tap_end(handler);
    }

    pub fn subscribers_mut(&mut self) -> &mut Subscribers<D> {
        &mut self.subscribers
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn engine(&self) -> &GestureEngine {
        &self.engine
    }

    /// Number of completed polling ticks.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Reads one report, advances the decoder by one tick and runs the
    /// handlers for whatever it emitted.
    pub fn poll_once(&mut self) -> Result<ControlFlow<()>, ButtonError> {
        let input = match self.device.read_touch()? {
            Some(RawTouchSample::Clear) if self.clear_is_idle => None,
            other => other,
        };

        let mut dispatcher = Dispatcher {
            device: &mut self.device,
            subscribers: &mut self.subscribers,
            recorder: self.recorder.as_mut(),
            tick: self.tick,
            flow: ControlFlow::Continue(()),
            error: None,
        };
        match input {
            Some(sample) => self.engine.on_data(&mut dispatcher, sample),
            None => self.engine.on_tick(&mut dispatcher),
        }
        self.tick += 1;

        let Dispatcher { flow, error, .. } = dispatcher;
        match error {
            Some(err) => Err(err),
            None => Ok(flow),
        }
    }

    /// Polls on a fixed cadence until a handler breaks, `stop` is raised or
    /// the device fails.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<(), ButtonError> {
        log::info!("polling every {} ms", self.tick_interval.as_millis());
        let mut deadline = Instant::now();
        loop {
            if stop.load(Ordering::Relaxed) {
                log::warn!("stop requested, leaving polling loop");
                return Ok(());
            }

            match self.poll_once() {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => {
                    log::info!("handler asked to stop after tick {}", self.tick);
                    return Ok(());
                }
                Err(err) => {
                    log::error!("polling failed at tick {}: {err}", self.tick);
                    return Err(err);
                }
            }

            deadline += self.tick_interval;
            let now = Instant::now();
            match deadline.checked_duration_since(now) {
                Some(wait) => thread::sleep(wait),
                None => {
                    log::trace!("tick {} overran its slot", self.tick);
                    deadline = now;
                }
            }
        }
    }

    /// Turns the light off and releases the device.
    pub fn close(&mut self) -> Result<(), ButtonError> {
        log::debug!("closing device after {} ticks", self.tick);
        self.device.close()?;
        Ok(())
    }

    pub fn into_device(self) -> D {
        self.device
    }
}

/// Feeds decoded gestures to the recorder and the handlers. After the first
/// failure the remaining events of the tick are dropped.
struct Dispatcher<'a, D> {
    device: &'a mut D,
    subscribers: &'a mut Subscribers<D>,
    recorder: Option<&'a mut EventRecorder>,
    tick: u64,
    flow: ControlFlow<()>,
    error: Option<ButtonError>,
}

impl<D> Dispatcher<'_, D> {
    fn deliver(&mut self, event: GestureEvent) -> Result<(), ButtonError> {
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record(self.tick, event)?;
        }
        if self.subscribers.dispatch(&mut *self.device, event)?.is_break() {
            self.flow = ControlFlow::Break(());
        }
        Ok(())
    }
}

impl<D> EventSink for Dispatcher<'_, D> {
    fn notify(&mut self, event: GestureEvent) {
        if self.error.is_some() {
            log::warn!("dropping {event:?} after earlier failure");
            return;
        }
        if let Err(err) = self.deliver(event) {
            self.error = Some(err);
        }
    }
}
