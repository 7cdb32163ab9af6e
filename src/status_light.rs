//! Stock gesture bindings used by `muteme run`.
//!
//! Tap and long-tap start/end flip the light between green and red, a
//! multi-tap toggles the fast pulse, and a quadruple tap stops the loop.

use core::ops::ControlFlow;

use crate::{
    button::Button,
    device::{DeviceError, TouchDevice},
    display::{Color, Effect},
};

pub const EXIT_TAP_COUNT: u8 = 4;

/// Sets the initial colour and registers the handlers.
pub fn install<D: TouchDevice + 'static>(
    button: &mut Button<D>,
    initial: Color,
) -> Result<(), DeviceError> {
    let device = button.device_mut();
    let display = device.display().with_color(initial);
    device.set_display(display)?;

    button.on_tap(toggle_color::<D>);
    button.on_long_tap_start(toggle_color::<D>);
    button.on_long_tap_end(toggle_color::<D>);
    button.on_multi_tap(toggle_pulse::<D>);
    Ok(())
}

fn toggle_color<D: TouchDevice>(device: &mut D, _count: u8) -> Result<ControlFlow<()>, DeviceError> {
    let current = device.display();
    let color = if current.color == Color::Green {
        Color::Red
    } else {
        Color::Green
    };
    device.set_display(current.with_color(color))?;
    Ok(ControlFlow::Continue(()))
}

fn toggle_pulse<D: TouchDevice>(device: &mut D, count: u8) -> Result<ControlFlow<()>, DeviceError> {
    let current = device.display();
    let effect = if current.effect == Effect::FastPulse {
        Effect::None
    } else {
        Effect::FastPulse
    };
    device.set_display(current.with_effect(effect))?;
    log::debug!("multi-tap count: {count}");

    if count == EXIT_TAP_COUNT {
        return Ok(ControlFlow::Break(()));
    }
    Ok(ControlFlow::Continue(()))
}
