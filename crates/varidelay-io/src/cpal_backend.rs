//! cpal implementation of [`AudioBackend`].
//!
//! Device selection is deliberately simple: an exact name match, otherwise
//! the host's default device with a warning.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host};

use crate::backend::{
    AudioBackend, AudioDevice, BackendStreamConfig, ErrorCallback, InputCallback, OutputCallback,
    StreamHandle,
};
use crate::{Error, Result};

/// Extract device name via `description()` (cpal 0.17+).
fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// cpal-based audio backend (ALSA, CoreAudio, WASAPI).
pub struct CpalBackend {
    host: Host,
}

impl CpalBackend {
    /// Use the platform's default audio host.
    pub fn new() -> Self {
        let host = cpal::default_host();
        tracing::info!(host = host.id().name(), "cpal backend initialized");
        Self { host }
    }

    fn select_output_device(&self, name: Option<&str>) -> Result<Device> {
        if let Some(wanted) = name {
            let devices = self
                .host
                .output_devices()
                .map_err(|e| Error::Stream(e.to_string()))?;
            if let Some(device) = find_exact(devices, wanted) {
                return Ok(device);
            }
            tracing::warn!(device = wanted, "output device not found, using default");
        }
        self.host.default_output_device().ok_or(Error::NoDevice)
    }

    fn select_input_device(&self, name: Option<&str>) -> Result<Device> {
        if let Some(wanted) = name {
            let devices = self
                .host
                .input_devices()
                .map_err(|e| Error::Stream(e.to_string()))?;
            if let Some(device) = find_exact(devices, wanted) {
                return Ok(device);
            }
            tracing::warn!(device = wanted, "input device not found, using default");
        }
        self.host.default_input_device().ok_or(Error::NoDevice)
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn find_exact(mut devices: impl Iterator<Item = Device>, wanted: &str) -> Option<Device> {
    devices.find(|d| device_name(d).is_ok_and(|n| n == wanted))
}

fn stream_config(config: &BackendStreamConfig) -> cpal::StreamConfig {
    cpal::StreamConfig {
        channels: config.channels,
        sample_rate: config.sample_rate,
        buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        let mut devices: Vec<AudioDevice> = Vec::new();

        if let Ok(inputs) = self.host.input_devices() {
            for device in inputs {
                if let Ok(name) = device_name(&device) {
                    devices.push(AudioDevice {
                        name,
                        is_input: true,
                        is_output: device.default_output_config().is_ok(),
                        default_sample_rate: device
                            .default_input_config()
                            .map(|c| c.sample_rate())
                            .unwrap_or(48000),
                    });
                }
            }
        }

        if let Ok(outputs) = self.host.output_devices() {
            for device in outputs {
                let Ok(name) = device_name(&device) else {
                    continue;
                };
                if devices.iter().any(|d| d.name == name) {
                    continue;
                }
                devices.push(AudioDevice {
                    name,
                    is_input: false,
                    is_output: true,
                    default_sample_rate: device
                        .default_output_config()
                        .map(|c| c.sample_rate())
                        .unwrap_or(48000),
                });
            }
        }

        Ok(devices)
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        mut callback: OutputCallback,
        mut error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let device = self.select_output_device(config.device_name.as_deref())?;
        let name = device_name(&device).unwrap_or_else(|_| "unknown".into());

        let stream = device
            .build_output_stream(
                &stream_config(config),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| callback(data),
                move |err| error_callback(&err.to_string()),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            device = %name,
            channels = config.channels,
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            "output stream started"
        );

        Ok(StreamHandle::new(stream))
    }

    fn build_input_stream(
        &self,
        config: &BackendStreamConfig,
        mut callback: InputCallback,
        mut error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let device = self.select_input_device(config.device_name.as_deref())?;
        let name = device_name(&device).unwrap_or_else(|_| "unknown".into());

        let stream = device
            .build_input_stream(
                &stream_config(config),
                move |data: &[f32], _: &cpal::InputCallbackInfo| callback(data),
                move |err| error_callback(&err.to_string()),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            device = %name,
            channels = config.channels,
            sample_rate = config.sample_rate,
            "input stream started"
        );

        Ok(StreamHandle::new(stream))
    }
}
