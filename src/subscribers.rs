use core::ops::ControlFlow;

use crate::{
    device::DeviceError,
    gesture::{GestureEvent, GestureKind},
};

/// Called with the device and the gesture count (1 unless it is a multi-tap).
/// `Break` asks the polling loop to stop after the current tick.
pub type GestureHandler<D> = Box<dyn FnMut(&mut D, u8) -> Result<ControlFlow<()>, DeviceError>>;

/// One handler list per gesture kind.
pub struct Subscribers<D> {
    handlers: [Vec<GestureHandler<D>>; GestureKind::ALL.len()],
}

impl<D> Default for Subscribers<D> {
    fn default() -> Self {
        Self {
            handlers: Default::default(),
        }
    }
}

impl<D> Subscribers<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: GestureKind, handler: F)
    where
        F: FnMut(&mut D, u8) -> Result<ControlFlow<()>, DeviceError> + 'static,
    {
        self.handlers[kind.index()].push(Box::new(handler));
    }

    pub fn on_tap<F>(&mut self, handler: F)
    where
        F: FnMut(&mut D, u8) -> Result<ControlFlow<()>, DeviceError> + 'static,
    {
        self.subscribe(GestureKind::Tap, handler);
    }

    pub fn on_multi_tap<F>(&mut self, handler: F)
    where
        F: FnMut(&mut D, u8) -> Result<ControlFlow<()>, DeviceError> + 'static,
    {
        self.subscribe(GestureKind::MultiTap, handler);
    }

    pub fn on_long_tap_start<F>(&mut self, handler: F)
    where
        F: FnMut(&mut D, u8) -> Result<ControlFlow<()>, DeviceError> + 'static,
    {
        self.subscribe(GestureKind::LongTapStart, handler);
    }

    pub fn on_long_tap_end<F>(&mut self, handler: F)
    where
        F: FnMut(&mut D, u8) -> Result<ControlFlow<()>, DeviceError> + 'static,
    {
        self.subscribe(GestureKind::LongTapEnd, handler);
    }

    pub fn count(&self, kind: GestureKind) -> usize {
        self.handlers[kind.index()].len()
    }

    /// Runs every handler registered for the event's kind, in registration order.
    ///
    /// All handlers run even if one asks to stop; the first error aborts the rest.
    pub fn dispatch(
        &mut self,
        device: &mut D,
        event: GestureEvent,
    ) -> Result<ControlFlow<()>, DeviceError> {
        let kind = event.kind();
        let handlers = &mut self.handlers[kind.index()];
        if handlers.is_empty() {
            log::trace!("notify: no handlers for {}", kind.label());
            return Ok(ControlFlow::Continue(()));
        }

        let mut flow = ControlFlow::Continue(());
        for handler in handlers.iter_mut() {
            log::debug!("notify: {} (count={})", kind.label(), event.count());
            if handler(device, event.count())?.is_break() {
                flow = ControlFlow::Break(());
            }
        }
        Ok(flow)
    }
}
