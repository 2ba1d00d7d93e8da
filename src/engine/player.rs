//! Real-time audio playback using cpal
//!
//! Output is negotiated first ([`OutputConfig::negotiate`]) so the engine can
//! be built at the rate the device will actually run at, then streamed by a
//! [`Player`].

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleFormat, SampleRate, Stream, StreamConfig, SupportedBufferSize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{error, info, warn};

use super::Engine;

/// Failures starting audio output
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no output device available")]
    NoOutputDevice,

    #[error("output device '{0}' not found")]
    DeviceNotFound(String),

    #[error("unsupported sample format {0:?}")]
    UnsupportedFormat(SampleFormat),

    #[error("failed to query output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to query supported configs: {0}")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("failed to enumerate devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("failed to build output stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}

/// A resolved output device and the stream config it will be opened with
pub struct OutputConfig {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
}

impl OutputConfig {
    /// Resolve `device` (None = default) and pick a stream config
    ///
    /// The requested sample rate is used when the device supports it in a
    /// playable format; otherwise the device default is taken. The requested
    /// buffer size is applied when it falls inside the device's range.
    pub fn negotiate(device: Option<&str>, sample_rate: u32, buffer_size: u32) -> Result<Self, AudioError> {
        let device = find_device(device)?;

        let matching = device
            .supported_output_configs()?
            .filter(|range| playable(range.sample_format()))
            .filter(|range| (range.min_sample_rate().0..=range.max_sample_rate().0).contains(&sample_rate))
            .max_by_key(|range| range.sample_format() == SampleFormat::F32);

        let supported = match matching {
            Some(range) => range.with_sample_rate(SampleRate(sample_rate)),
            None => {
                let fallback = device.default_output_config()?;
                warn!(
                    requested = sample_rate,
                    using = fallback.sample_rate().0,
                    "requested sample rate not supported, using device default"
                );
                fallback
            }
        };

        let sample_format = supported.sample_format();
        let buffer = pick_buffer_size(supported.buffer_size(), buffer_size);
        let mut config = supported.config();
        config.buffer_size = buffer;

        Ok(Self {
            device,
            config,
            sample_format,
        })
    }

    /// Rate the stream will run at; build the engine with this
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Output channel count; the mono engine is copied to each
    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Device name, or "unknown" when the backend cannot tell
    pub fn device_name(&self) -> String {
        self.device.name().unwrap_or_else(|_| "unknown".to_string())
    }
}

/// Real-time audio player
pub struct Player {
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
}

impl Player {
    /// Create an idle player
    pub fn new() -> Self {
        Self {
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start pulling samples from the engine through a negotiated output
    ///
    /// The engine should run at `output.sample_rate()`. Each frame copies
    /// the mono engine sample into every channel.
    pub fn start(&mut self, engine: Arc<Mutex<Engine>>, output: OutputConfig) -> Result<(), AudioError> {
        let OutputConfig {
            device,
            config,
            sample_format,
        } = output;

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, engine, running),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, engine, running),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, engine, running),
            other => Err(AudioError::UnsupportedFormat(other)),
        }
        .and_then(|stream| {
            stream.play()?;
            Ok(stream)
        });

        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            buffer = ?config.buffer_size,
            "audio output started"
        );
        self.stream = Some(stream);

        Ok(())
    }

    /// Stop playback and release the stream
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.stream = None;
    }

    /// Whether a stream is currently running
    pub fn is_playing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

fn playable(format: SampleFormat) -> bool {
    matches!(format, SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16)
}

/// Fixed buffer when the device range allows it, otherwise the backend default
fn pick_buffer_size(supported: &SupportedBufferSize, wanted: u32) -> BufferSize {
    match supported {
        SupportedBufferSize::Range { min, max } if (*min..=*max).contains(&wanted) => BufferSize::Fixed(wanted),
        _ => BufferSize::Default,
    }
}

fn find_device(name: Option<&str>) -> Result<Device, AudioError> {
    let host = cpal::default_host();
    match name {
        None => host.default_output_device().ok_or(AudioError::NoOutputDevice),
        Some(wanted) => host
            .output_devices()?
            .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
            .ok_or_else(|| AudioError::DeviceNotFound(wanted.to_string())),
    }
}

fn build_stream<T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>>(
    device: &Device,
    config: &StreamConfig,
    engine: Arc<Mutex<Engine>>,
    running: Arc<AtomicBool>,
) -> Result<Stream, AudioError> {
    let channels = config.channels as usize;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let silence = T::from_sample(0.0f32);
            if !running.load(Ordering::SeqCst) {
                data.fill(silence);
                return;
            }

            // Never block the audio thread on a parameter update
            match engine.try_lock() {
                Ok(mut eng) => {
                    for frame in data.chunks_mut(channels) {
                        let sample = T::from_sample(eng.process() as f32);
                        frame.fill(sample);
                    }
                }
                Err(_) => data.fill(silence),
            }
        },
        |err| error!(error = %err, "audio stream error"),
        None,
    )?;

    Ok(stream)
}

/// Get the default output device name
pub fn default_device_name() -> Option<String> {
    cpal::default_host().default_output_device().and_then(|d| d.name().ok())
}

/// List all available output devices with their default configs
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(output_devices) = host.output_devices() {
        for device in output_devices {
            if let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) {
                devices.push((name, config.into()));
            }
        }
    }

    devices
}
