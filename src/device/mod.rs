use crate::{display::DisplayState, gesture::RawTouchSample};

#[cfg(feature = "hid")]
mod hid;
mod scripted;

#[cfg(feature = "hid")]
pub use hid::{list_connected, ConnectedDevice, HidTouchDevice};
pub use scripted::ScriptedDevice;

pub const INPUT_REPORT_LEN: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SupportedDevice {
    pub vendor_id: u16,
    pub product_id: u16,
    pub name: &'static str,
}

pub const SUPPORTED_DEVICES: &[SupportedDevice] = &[
    SupportedDevice {
        vendor_id: 0x16C0,
        product_id: 0x27DB,
        name: "MuteMe Original (prototype)",
    },
    SupportedDevice {
        vendor_id: 0x20A0,
        product_id: 0x42DA,
        name: "MuteMe Original",
    },
    SupportedDevice {
        vendor_id: 0x20A0,
        product_id: 0x42DB,
        name: "MuteMe Mini",
    },
];

pub fn find_supported(vendor_id: u16, product_id: u16) -> Option<&'static SupportedDevice> {
    SUPPORTED_DEVICES
        .iter()
        .find(|d| d.vendor_id == vendor_id && d.product_id == product_id)
}

/// Output report that sets the LED: report id 0 followed by the display byte.
pub fn display_report(display: DisplayState) -> [u8; 2] {
    [0x00, display.to_byte()]
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("no supported MuteMe device found")]
    NotFound,
    #[error("device is closed")]
    Closed,
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
    #[cfg(feature = "hid")]
    #[error("hid: {0}")]
    Hid(#[from] hidapi::HidError),
}

/// Transport for one button: touch reports in, LED state out.
pub trait TouchDevice {
    /// Non-blocking; `Ok(None)` when no report is waiting this tick.
    fn read_touch(&mut self) -> Result<Option<RawTouchSample>, DeviceError>;

    fn set_display(&mut self, display: DisplayState) -> Result<(), DeviceError>;

    /// Last display state written to the device.
    fn display(&self) -> DisplayState;

    fn close(&mut self) -> Result<(), DeviceError>;
}

impl<D: TouchDevice + ?Sized> TouchDevice for Box<D> {
    fn read_touch(&mut self) -> Result<Option<RawTouchSample>, DeviceError> {
        (**self).read_touch()
    }

    fn set_display(&mut self, display: DisplayState) -> Result<(), DeviceError> {
        (**self).set_display(display)
    }

    fn display(&self) -> DisplayState {
        (**self).display()
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        (**self).close()
    }
}
