//! Host-side driver for the MuteMe capacitive touch button.
//!
//! [`gesture`] turns the per-tick touch reports into taps, multi-taps and long
//! taps. [`button`] polls a [`device::TouchDevice`] on a fixed cadence and
//! hands each decoded gesture to the registered handlers.

pub mod button;
pub mod config;
pub mod device;
pub mod display;
pub mod gesture;
pub mod recorder;
pub mod status_light;
pub mod subscribers;

pub use button::{Button, ButtonError};
pub use config::{load_config, ButtonConfig, ConfigError};
pub use device::{DeviceError, ScriptedDevice, TouchDevice};
pub use display::{Color, DisplayState, Effect};
pub use gesture::{
    EventSink, GestureDelays, GestureEngine, GestureEvent, GestureKind, GestureStateId,
    RawTouchSample,
};
