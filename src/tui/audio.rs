//! Audio device handling and stream processing

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use log::{error, info, warn};
use spectrum_path::constants::audio;

use super::error::{AppError, AppResult};
use super::state::{lock_ring, SharedRing};

/// Audio configuration and device information
pub struct AudioConfig {
    pub device_name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioConfig {
    pub fn stream_config(&self) -> cpal::StreamConfig {
        cpal::StreamConfig {
            channels: self.channels,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: audio::BUFFER_SIZE,
        }
    }
}

/// Names of all input devices on the default host
pub fn list_input_devices() -> AppResult<Vec<String>> {
    let host = cpal::default_host();
    Ok(host.input_devices()?.filter_map(|d| d.name().ok()).collect())
}

/// Find and configure an audio input device
pub fn setup_audio_device(device_name: Option<&str>) -> AppResult<(cpal::Device, AudioConfig)> {
    let host = cpal::default_host();

    let device = if let Some(name) = device_name {
        host.input_devices()?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| AppError::AudioDevice(format!("Device '{}' not found", name)))?
    } else {
        host.default_input_device()
            .ok_or_else(|| AppError::AudioDevice("No default input device available".to_string()))?
    };

    let device_name = device.name()?;

    // The stream is built for f32 samples, so only float ranges qualify
    let ranges: Vec<_> = device
        .supported_input_configs()?
        .filter(|range| range.sample_format() == SampleFormat::F32)
        .collect();
    let config_range = ranges
        .iter()
        .find(|range| range.channels() >= audio::DEFAULT_CHANNELS)
        .or_else(|| ranges.first())
        .ok_or_else(|| AppError::AudioDevice(format!("No f32 input configs found for '{}'", device_name)))?;

    let preferred = audio::PREFERRED_SAMPLE_RATE;
    let sample_rate = if config_range.min_sample_rate().0 <= preferred && config_range.max_sample_rate().0 >= preferred {
        preferred
    } else {
        warn!(
            "Device '{}' does not support {} Hz, using {} Hz",
            device_name,
            preferred,
            config_range.min_sample_rate().0
        );
        config_range.min_sample_rate().0
    };

    let channels = config_range.channels().min(audio::DEFAULT_CHANNELS);

    info!("Using input device '{}' at {} Hz, {} channel(s)", device_name, sample_rate, channels);

    let audio_config = AudioConfig {
        device_name,
        sample_rate,
        channels,
    };

    Ok((device, audio_config))
}

/// Build an audio input stream with the given callback
pub fn build_audio_stream<F>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    data_callback: F,
) -> AppResult<cpal::Stream>
where
    F: FnMut(&[f32], &cpal::InputCallbackInfo) + Send + 'static,
{
    let stream = device.build_input_stream(
        config,
        data_callback,
        |err| error!("Audio stream error: {}", err),
        None,
    )?;

    Ok(stream)
}

/// Audio processing callback that feeds the shared stereo ring
pub fn create_audio_callback(
    ring: SharedRing,
    channels: usize,
) -> impl FnMut(&[f32], &cpal::InputCallbackInfo) + Send + 'static {
    move |data: &[f32], _: &cpal::InputCallbackInfo| {
        lock_ring(&ring).push_interleaved(data, channels);
    }
}

/// Open the device, start streaming into `ring` and return the running stream.
///
/// Dropping the stream stops capture.
pub fn start_capture(device_name: Option<&str>, ring: SharedRing) -> AppResult<(cpal::Stream, AudioConfig)> {
    let (device, audio_config) = setup_audio_device(device_name)?;
    let callback = create_audio_callback(ring, audio_config.channels as usize);
    let stream = build_audio_stream(&device, &audio_config.stream_config(), callback)?;
    stream.play()?;
    Ok((stream, audio_config))
}
