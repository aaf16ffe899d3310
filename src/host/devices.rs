use std::fmt;

use cpal::traits::{DeviceTrait, HostTrait};

use crate::error::{AudioError, AudioResult};

/// One row of the device table.
#[derive(Debug, Clone)]
pub struct DeviceSummary {
    pub index: usize,
    pub name: String,
    pub host_name: &'static str,
    pub max_output_channels: u16,
    pub max_input_channels: u16,
}

impl fmt::Display for DeviceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--------------------------------------------")?;
        writeln!(
            f,
            "ID: {}, Name: {}, API name: {}",
            self.index, self.name, self.host_name
        )?;
        write!(
            f,
            "Max output channels: {}\tMax input channels: {}",
            self.max_output_channels, self.max_input_channels
        )
    }
}

/// Every device of the default host, in the order used for index selection.
pub fn list_devices() -> AudioResult<Vec<DeviceSummary>> {
    let host = cpal::default_host();
    let host_name = host.id().name();
    let devices = host
        .devices()
        .map_err(|e| AudioError::Device(format!("failed to enumerate devices: {}", e)))?;

    Ok(devices
        .enumerate()
        .map(|(index, device)| {
            let max_output_channels = device
                .supported_output_configs()
                .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
                .unwrap_or(0);
            let max_input_channels = device
                .supported_input_configs()
                .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
                .unwrap_or(0);

            DeviceSummary {
                index,
                name: device.name().unwrap_or_else(|_| "Unknown device".to_string()),
                host_name,
                max_output_channels,
                max_input_channels,
            }
        })
        .collect())
}

pub fn print_devices(devices: &[DeviceSummary]) {
    for device in devices {
        println!("{}\n", device);
    }
}

/// Look a device up by its position in the host's device list.
pub fn device_by_index(host: &cpal::Host, index: usize) -> AudioResult<cpal::Device> {
    host.devices()
        .map_err(|e| AudioError::Device(format!("failed to enumerate devices: {}", e)))?
        .nth(index)
        .ok_or_else(|| AudioError::Device(format!("no audio device with index {}", index)))
}
