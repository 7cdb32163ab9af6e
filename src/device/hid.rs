use std::{ffi::CStr, thread, time::Duration};

use hidapi::{HidApi, HidDevice};

use super::{
    display_report, find_supported, DeviceError, SupportedDevice, TouchDevice, INPUT_REPORT_LEN,
    SUPPORTED_DEVICES,
};
use crate::{display::DisplayState, gesture::RawTouchSample};

// The button answers the first reads after open with stale or empty reports.
const PRIME_MAX_EMPTY_READS: u8 = 5;
const PRIME_READ_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectedDevice {
    pub model: &'static SupportedDevice,
    pub path: String,
    pub serial_number: Option<String>,
}

pub fn list_connected(api: &HidApi) -> Vec<ConnectedDevice> {
    let mut out: Vec<ConnectedDevice> = Vec::new();
    for info in api.device_list() {
        let Some(model) = find_supported(info.vendor_id(), info.product_id()) else {
            continue;
        };
        let path = info.path().to_string_lossy().into_owned();
        if out.iter().any(|existing| existing.path == path) {
            continue;
        }
        out.push(ConnectedDevice {
            model,
            path,
            serial_number: info.serial_number().map(str::to_string),
        });
    }
    out
}

pub struct HidTouchDevice {
    device: Option<HidDevice>,
    display: DisplayState,
}

impl HidTouchDevice {
    /// Opens the first attached device from `candidates`, in order.
    pub fn open(api: &HidApi, candidates: &[SupportedDevice]) -> Result<Self, DeviceError> {
        log::debug!("opening device");
        let mut opened = None;
        for candidate in candidates {
            log::debug!(
                "attempting to open ({:#06x},{:#06x})",
                candidate.vendor_id,
                candidate.product_id
            );
            match api.open(candidate.vendor_id, candidate.product_id) {
                Ok(device) => {
                    opened = Some(device);
                    break;
                }
                Err(err) => log::debug!("{}: not found ({err})", candidate.name),
            }
        }

        let device = opened.ok_or(DeviceError::NotFound)?;
        Self::from_device(device)
    }

    pub fn open_default(api: &HidApi) -> Result<Self, DeviceError> {
        Self::open(api, SUPPORTED_DEVICES)
    }

    pub fn open_path(api: &HidApi, path: &CStr) -> Result<Self, DeviceError> {
        let device = api.open_path(path)?;
        let info = device.get_device_info()?;
        if find_supported(info.vendor_id(), info.product_id()).is_none() {
            log::error!(
                "{} is not a MuteMe ({:#06x},{:#06x})",
                path.to_string_lossy(),
                info.vendor_id(),
                info.product_id()
            );
            return Err(DeviceError::NotFound);
        }
        Self::from_device(device)
    }

    fn from_device(device: HidDevice) -> Result<Self, DeviceError> {
        device.set_blocking_mode(false)?;

        let manufacturer = device.get_manufacturer_string()?.unwrap_or_default();
        let product = device.get_product_string()?.unwrap_or_default();
        let serial = device.get_serial_number_string()?.unwrap_or_default();
        log::info!(
            "found device: manufacturer: {manufacturer}, product: {product}, serial number: {serial}"
        );

        let mut this = Self {
            device: Some(device),
            display: DisplayState::OFF,
        };
        this.prime_input_buffer()?;
        this.set_display(DisplayState::OFF)?;
        Ok(this)
    }

    /// Releases the handle and leaves the light as it is.
    pub fn detach(mut self) {
        self.device = None;
    }

    fn device(&self) -> Result<&HidDevice, DeviceError> {
        self.device.as_ref().ok_or(DeviceError::Closed)
    }

    /// Drains queued reports so the first gesture isn't decoded from stale input.
    fn prime_input_buffer(&mut self) -> Result<(), DeviceError> {
        let device = self.device()?;
        let mut report = [0u8; INPUT_REPORT_LEN];
        let mut empty_reads = 0u8;
        while empty_reads < PRIME_MAX_EMPTY_READS {
            let len = device.read(&mut report)?;
            log::debug!("clearing buffer: {:?}", &report[..len]);
            if len == INPUT_REPORT_LEN && report.iter().all(|b| *b == 0) {
                break;
            }
            if len == 0 {
                empty_reads += 1;
            }
            thread::sleep(PRIME_READ_INTERVAL);
        }
        Ok(())
    }
}

impl TouchDevice for HidTouchDevice {
    fn read_touch(&mut self) -> Result<Option<RawTouchSample>, DeviceError> {
        let mut report = [0u8; INPUT_REPORT_LEN];
        let len = self.device()?.read(&mut report)?;
        let sample = RawTouchSample::from_report(&report[..len]);
        if let Some(sample) = sample {
            log::debug!("read data: {sample:?}");
        }
        Ok(sample)
    }

    fn set_display(&mut self, display: DisplayState) -> Result<(), DeviceError> {
        log::debug!(
            "setting light to {} / {}",
            display.color,
            display.effect
        );
        let report = display_report(display);
        let written = self.device()?.write(&report)?;
        if written < report.len() {
            return Err(DeviceError::ShortWrite {
                written,
                expected: report.len(),
            });
        }
        self.display = display;
        Ok(())
    }

    fn display(&self) -> DisplayState {
        self.display
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        if self.device.is_none() {
            return Ok(());
        }
        let result = self.set_display(DisplayState::OFF);
        self.device = None;
        result
    }
}

impl Drop for HidTouchDevice {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("failed to turn light off on drop: {err}");
        }
    }
}
