//! Output device discovery and selection via cpal.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};

use crate::{Error, Result};

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Information about one audio output device.
#[derive(Debug, Clone)]
pub struct OutputDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub channels: u16,
}

/// List all available audio output devices.
pub fn list_output_devices() -> Result<Vec<OutputDevice>> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            if let Ok(name) = device_name(&device) {
                let (sample_rate, channels) = device
                    .default_output_config()
                    .map(|c| (c.sample_rate(), c.channels()))
                    .unwrap_or((48000, 2));

                devices.push(OutputDevice {
                    name,
                    default_sample_rate: sample_rate,
                    channels,
                });
            }
        }
    }

    Ok(devices)
}

/// Get the system default output device, if any.
pub fn default_output_device() -> Result<Option<OutputDevice>> {
    let host = cpal::default_host();

    Ok(host.default_output_device().and_then(|d| {
        device_name(&d).ok().map(|name| {
            let (sample_rate, channels) = d
                .default_output_config()
                .map(|c| (c.sample_rate(), c.channels()))
                .unwrap_or((48000, 2));
            OutputDevice {
                name,
                default_sample_rate: sample_rate,
                channels,
            }
        })
    }))
}

/// Find an output device by index, exact name or partial name.
///
/// `selector` may be:
/// - `None`: the system default output device
/// - A numeric index into the output device list (e.g. "0", "1")
/// - An exact device name
/// - A partial device name (case-insensitive substring match)
pub(crate) fn find_output_device(host: &Host, selector: Option<&str>) -> Result<Device> {
    let Some(selector) = selector else {
        return host.default_output_device().ok_or(Error::NoDevice);
    };

    let devices: Vec<Device> = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();

    if let Ok(index) = selector.parse::<usize>() {
        return devices.get(index).cloned().ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "output device index {} (only {} devices available)",
                index,
                devices.len()
            ))
        });
    }

    for device in &devices {
        if device_name(device).is_ok_and(|n| n == selector) {
            return Ok(device.clone());
        }
    }

    let search_lower = selector.to_lowercase();
    let mut matches: Vec<(Device, String)> = devices
        .iter()
        .filter_map(|d| {
            device_name(d).ok().and_then(|name| {
                name.to_lowercase()
                    .contains(&search_lower)
                    .then(|| (d.clone(), name))
            })
        })
        .collect();

    match matches.len() {
        0 => Err(Error::DeviceNotFound(format!(
            "no output device matching '{selector}'"
        ))),
        1 => Ok(matches.remove(0).0),
        _ => {
            let names: Vec<&str> = matches.iter().map(|(_, n)| n.as_str()).collect();
            tracing::warn!(
                selector,
                candidates = ?names,
                "multiple output devices match, using the first"
            );
            Ok(matches.remove(0).0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_output_devices_does_not_panic() {
        // Device availability depends on the system; just exercise the path.
        let result = list_output_devices();
        assert!(result.is_ok());
    }

    #[test]
    fn default_output_device_does_not_panic() {
        let result = default_output_device();
        assert!(result.is_ok());
    }
}
