//! Audio Device Directory
//!
//! Enumerates the devices the host reports and resolves a device by name
//! for opening a line. Every call re-enumerates: the directory keeps no
//! cache, so the results always reflect current hardware state and callers
//! must assume the list can change between calls (hot-plug).

use cpal::traits::{DeviceTrait, HostTrait};
use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, PipelineError};

/// Direction of an audio device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    Input,
    Output,
}

/// Describes an audio endpoint as reported by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioDevice {
    /// Human-readable device name; also the key [`resolve`] matches against
    pub name: String,

    /// Whether this is an input or output device
    pub device_type: DeviceType,

    /// Whether this is the system default device for its direction
    pub is_default: bool,

    /// Supported sample rates (may be empty if querying failed)
    pub sample_rates: Vec<u32>,

    /// Maximum supported channels
    pub max_channels: u16,
}

impl AudioDevice {
    /// Enumerate all available audio devices
    pub fn enumerate_all() -> CoreResult<Vec<AudioDevice>> {
        let host = cpal::default_host();

        let mut devices = Vec::new();

        let default_input_name = host.default_input_device().and_then(|d| d.name().ok());
        let default_output_name = host.default_output_device().and_then(|d| d.name().ok());

        if let Ok(input_devices) = host.input_devices() {
            for device in input_devices {
                if let Ok(audio_device) = Self::from_cpal_device(
                    &device,
                    DeviceType::Input,
                    default_input_name.as_deref(),
                ) {
                    devices.push(audio_device);
                }
            }
        }

        if let Ok(output_devices) = host.output_devices() {
            for device in output_devices {
                if let Ok(audio_device) = Self::from_cpal_device(
                    &device,
                    DeviceType::Output,
                    default_output_name.as_deref(),
                ) {
                    devices.push(audio_device);
                }
            }
        }

        if devices.is_empty() {
            return Err(PipelineError::NoDevicesFound);
        }

        Ok(devices)
    }

    /// Get only input devices
    pub fn enumerate_inputs() -> CoreResult<Vec<AudioDevice>> {
        Ok(Self::enumerate_all()?
            .into_iter()
            .filter(|d| d.device_type == DeviceType::Input)
            .collect())
    }

    /// Get only output devices
    pub fn enumerate_outputs() -> CoreResult<Vec<AudioDevice>> {
        Ok(Self::enumerate_all()?
            .into_iter()
            .filter(|d| d.device_type == DeviceType::Output)
            .collect())
    }

    /// Get the default input device
    pub fn default_input() -> CoreResult<AudioDevice> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(PipelineError::NoDevicesFound)?;

        Self::from_cpal_device(&device, DeviceType::Input, None).map(|mut d| {
            d.is_default = true;
            d
        })
    }

    /// Get the default output device
    pub fn default_output() -> CoreResult<AudioDevice> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(PipelineError::NoDevicesFound)?;

        Self::from_cpal_device(&device, DeviceType::Output, None).map(|mut d| {
            d.is_default = true;
            d
        })
    }

    /// Create AudioDevice from a CPAL device
    fn from_cpal_device(
        device: &cpal::Device,
        device_type: DeviceType,
        default_name: Option<&str>,
    ) -> CoreResult<Self> {
        let name = device
            .name()
            .map_err(|e| PipelineError::DeviceNotFound(e.to_string()))?;

        let is_default = default_name.map(|d| d == name).unwrap_or(false);

        let (sample_rates, max_channels) = match device_type {
            DeviceType::Input => Self::query_input_config(device),
            DeviceType::Output => Self::query_output_config(device),
        };

        Ok(AudioDevice {
            name,
            device_type,
            is_default,
            sample_rates,
            max_channels,
        })
    }

    fn query_input_config(device: &cpal::Device) -> (Vec<u32>, u16) {
        if let Ok(configs) = device.supported_input_configs() {
            Self::extract_config_info(configs)
        } else {
            (vec![], 2)
        }
    }

    fn query_output_config(device: &cpal::Device) -> (Vec<u32>, u16) {
        if let Ok(configs) = device.supported_output_configs() {
            Self::extract_config_info(configs)
        } else {
            (vec![], 2)
        }
    }

    fn extract_config_info(
        configs: impl Iterator<Item = cpal::SupportedStreamConfigRange>,
    ) -> (Vec<u32>, u16) {
        let mut sample_rates = Vec::new();
        let mut max_channels = 0u16;

        // Common sample rates to check
        const COMMON_RATES: [u32; 6] = [44100, 48000, 88200, 96000, 176400, 192000];

        for config in configs {
            max_channels = max_channels.max(config.channels());

            let min = config.min_sample_rate().0;
            let max = config.max_sample_rate().0;

            for &rate in &COMMON_RATES {
                if rate >= min && rate <= max && !sample_rates.contains(&rate) {
                    sample_rates.push(rate);
                }
            }
        }

        sample_rates.sort_unstable();
        (sample_rates, max_channels)
    }
}

/// Names of the available devices in the given direction, in the order the
/// host reports them (feeds the device selection UI).
pub fn device_names(device_type: DeviceType) -> CoreResult<Vec<String>> {
    let devices = match device_type {
        DeviceType::Input => AudioDevice::enumerate_inputs()?,
        DeviceType::Output => AudioDevice::enumerate_outputs()?,
    };
    Ok(devices.into_iter().map(|d| d.name).collect())
}

/// Resolve a device by name for opening a line.
///
/// The match is a case-insensitive exact comparison against the names the
/// host currently reports.
pub fn resolve(name: &str, device_type: DeviceType) -> CoreResult<cpal::Device> {
    let host = cpal::default_host();

    let devices = match device_type {
        DeviceType::Input => host.input_devices(),
        DeviceType::Output => host.output_devices(),
    }
    .map_err(|e| PipelineError::DeviceUnavailable(e.to_string()))?;

    for device in devices {
        if let Ok(device_name) = device.name() {
            if device_name.eq_ignore_ascii_case(name) {
                return Ok(device);
            }
        }
    }

    Err(PipelineError::DeviceNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_type_serialization() {
        let input = DeviceType::Input;
        let json = serde_json::to_string(&input).unwrap();
        let deserialized: DeviceType = serde_json::from_str(&json).unwrap();
        assert_eq!(input, deserialized);
    }

    #[test]
    fn test_audio_device_serialization() {
        let device = AudioDevice {
            name: "Test Device".to_string(),
            device_type: DeviceType::Output,
            is_default: true,
            sample_rates: vec![44100, 48000],
            max_channels: 2,
        };

        let json = serde_json::to_string(&device).unwrap();
        let deserialized: AudioDevice = serde_json::from_str(&json).unwrap();

        assert_eq!(device.name, deserialized.name);
        assert_eq!(device.device_type, deserialized.device_type);
        assert_eq!(device.sample_rates, deserialized.sample_rates);
    }

    // Note: Hardware-dependent tests are marked with #[ignore]
    // Run them with: cargo test -- --ignored

    #[test]
    #[ignore = "requires audio hardware"]
    fn test_enumerate_all_devices() {
        let devices = AudioDevice::enumerate_all();
        assert!(devices.is_ok());
    }

    #[test]
    #[ignore = "requires audio hardware"]
    fn test_resolve_is_case_insensitive() {
        if let Ok(devices) = AudioDevice::enumerate_inputs() {
            if let Some(first) = devices.first() {
                let upper = first.name.to_uppercase();
                assert!(resolve(&upper, DeviceType::Input).is_ok());
            }
        }
    }

    #[test]
    #[ignore = "requires audio hardware"]
    fn test_resolve_unknown_name_fails() {
        let result = resolve("no such device anywhere", DeviceType::Output);
        assert!(matches!(result, Err(PipelineError::DeviceNotFound(_))));
    }
}
