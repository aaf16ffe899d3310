//! Native audio I/O through cpal.

mod cpal_host;
mod devices;
mod duplex;

pub use cpal_host::{AudioHost, AudioHostConfig, StreamOptions};
pub use devices::{device_by_index, list_devices, print_devices, DeviceSummary};
pub use duplex::{push_input, InputBridge};
