use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::DeviceError;
use super::format::FormatRequest;

/// Smallest usable ring store: one byte of data plus the reserved byte.
pub const MIN_BUFFER_SIZE: usize = 2;

/// Configuration for registering a virtual microphone endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfiguration {
    /// Name the endpoint is advertised under (default: `VirtualMicrophone`).
    pub device_name: String,

    /// Ring store capacity in bytes (default: 8192). One byte is always reserved.
    pub buffer_size: usize,

    /// Format applied when the device becomes active (default: 48 kHz, stereo, 16-bit).
    pub default_format: FormatRequest,

    /// Whether the device starts muted (default: false).
    pub start_muted: bool,
}

impl DeviceConfiguration {
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.device_name.is_empty() {
            return Err(DeviceError::ConfigurationFailed("device name must not be empty".into()));
        }
        if self.buffer_size < MIN_BUFFER_SIZE {
            return Err(DeviceError::ConfigurationFailed(format!(
                "buffer size {} is below the minimum of {}",
                self.buffer_size, MIN_BUFFER_SIZE
            )));
        }
        self.default_format
            .validate()
            .map_err(|e| DeviceError::ConfigurationFailed(format!("default format: {}", e)))?;
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, DeviceError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            DeviceError::ConfigurationFailed(format!("failed to parse configuration: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, DeviceError> {
        let json = fs::read_to_string(path).map_err(|e| {
            DeviceError::ConfigurationFailed(format!("failed to read configuration: {}", e))
        })?;
        Self::from_json_str(&json)
    }

    /// Kernel-namespace path of the device object.
    pub fn device_path(&self) -> String {
        format!("\\Device\\{}", self.device_name)
    }

    /// User-visible symbolic link for the device object.
    pub fn symbolic_link(&self) -> String {
        format!("\\DosDevices\\{}", self.device_name)
    }
}

impl Default for DeviceConfiguration {
    fn default() -> Self {
        Self {
            device_name: "VirtualMicrophone".into(),
            buffer_size: 8192,
            default_format: FormatRequest::default(),
            start_muted: false,
        }
    }
}
