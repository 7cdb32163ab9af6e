use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::{
    device::{SupportedDevice, SUPPORTED_DEVICES},
    gesture::{GestureDelays, DEFAULT_LONG_TAP_DELAY_TICKS, DEFAULT_MULTI_TAP_DELAY_TICKS},
};

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10;
pub const MAX_TICK_INTERVAL_MS: u64 = 1_000;
pub const MAX_DELAY_TICKS: u16 = 6_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    pub long_tap_delay_ticks: u16,
    pub multi_tap_delay_ticks: u16,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_tap_delay_ticks: DEFAULT_LONG_TAP_DELAY_TICKS,
            multi_tap_delay_ticks: DEFAULT_MULTI_TAP_DELAY_TICKS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollingConfig {
    pub tick_interval_ms: u64,
    /// Deliver all-zero reports to the gesture engine as idle ticks.
    pub clear_is_idle: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            clear_is_idle: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ButtonConfig {
    pub gesture: GestureConfig,
    pub polling: PollingConfig,
    pub device: DeviceConfig,
}

impl ButtonConfig {
    pub fn delays(&self) -> GestureDelays {
        GestureDelays {
            long_tap_ticks: self.gesture.long_tap_delay_ticks,
            multi_tap_ticks: self.gesture.multi_tap_delay_ticks,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.polling.tick_interval_ms)
    }

    /// Devices to try when opening, in order.
    pub fn device_candidates(&self) -> Vec<SupportedDevice> {
        match (self.device.vendor_id, self.device.product_id) {
            (Some(vendor_id), Some(product_id)) => vec![SupportedDevice {
                vendor_id,
                product_id,
                name: "configured device",
            }],
            _ => SUPPORTED_DEVICES.to_vec(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("polling.tick_interval_ms must be in 1..={MAX_TICK_INTERVAL_MS}, got {0}")]
    TickInterval(u64),
    #[error("gesture.{field} must be at most {MAX_DELAY_TICKS} ticks, got {value}")]
    DelayTooLong { field: &'static str, value: u16 },
    #[error("device.vendor_id and device.product_id must be set together")]
    PartialDeviceId,
}

pub fn parse_config(raw: &str, origin: &Path) -> Result<ButtonConfig, ConfigError> {
    toml::from_str(raw).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })
}

pub fn validate_config(config: &ButtonConfig) -> Result<(), ConfigError> {
    let tick_ms = config.polling.tick_interval_ms;
    if tick_ms == 0 || tick_ms > MAX_TICK_INTERVAL_MS {
        return Err(ConfigError::TickInterval(tick_ms));
    }

    for (field, value) in [
        ("long_tap_delay_ticks", config.gesture.long_tap_delay_ticks),
        ("multi_tap_delay_ticks", config.gesture.multi_tap_delay_ticks),
    ] {
        if value > MAX_DELAY_TICKS {
            return Err(ConfigError::DelayTooLong { field, value });
        }
    }

    if config.device.vendor_id.is_some() != config.device.product_id.is_some() {
        return Err(ConfigError::PartialDeviceId);
    }

    Ok(())
}

pub fn load_config(path: &Path) -> Result<ButtonConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&raw, path)?;
    validate_config(&config)?;
    log::debug!("loaded config from {}: {config:?}", path.display());
    Ok(config)
}
