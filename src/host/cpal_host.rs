//! CPAL-based driver adapter
//!
//! Opens the device streams, owns the [`RenderEngine`] for the lifetime of
//! the output stream and calls it once per driver period.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Sample, SampleFormat, SizedSample, StreamConfig};
use dasp_sample::FromSample;
use log::{error, info, warn};

use crate::audio_engine::{RenderEngine, RenderStatus, StopSignal};
use crate::error::{AudioError, AudioResult};

use super::devices::device_by_index;
use super::duplex::{push_input, InputBridge};

/// Ring capacity for captured input, in driver blocks.
const INPUT_RING_BLOCKS: usize = 8;

/// Which devices to open, by index into the host's device list.
#[derive(Debug, Clone, Copy)]
pub struct StreamOptions {
    pub output_device: usize,
    /// Set for full-duplex pass-through.
    pub input_device: Option<usize>,
}

/// What was actually negotiated with the driver.
#[derive(Debug, Clone)]
pub struct AudioHostConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub frames_per_buffer: usize,
    pub sample_format: SampleFormat,
    pub host_name: String,
    pub output_device: String,
    pub input_device: Option<String>,
}

/// Audio host that manages the CPAL streams
pub struct AudioHost {
    output: cpal::Stream,
    input: Option<cpal::Stream>,
    config: AudioHostConfig,
    stop: StopSignal,
    dropped_input: Arc<AtomicUsize>,
}

impl AudioHost {
    /// Open (but do not start) the streams for `engine`.
    pub fn open(engine: RenderEngine, options: StreamOptions, stop: StopSignal) -> AudioResult<Self> {
        let context = *engine.context();
        let host = cpal::default_host();
        let host_name = host.id().name().to_string();

        let stream_config = StreamConfig {
            channels: context.channels as u16,
            sample_rate: cpal::SampleRate(context.sample_rate),
            buffer_size: BufferSize::Fixed(context.frames_per_buffer as u32),
        };

        let dropped_input = Arc::new(AtomicUsize::new(0));
        let output_device = device_by_index(&host, options.output_device)?;
        let output_name = output_device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        let sample_format = choose_output_format(&output_device, &stream_config);

        let (input, bridge, input_name) = match options.input_device {
            Some(index) => {
                let device = device_by_index(&host, index)?;
                let name = device.name().unwrap_or_else(|_| "Unknown device".to_string());
                let (producer, bridge) =
                    InputBridge::new(context.block_len(), context.block_len() * INPUT_RING_BLOCKS);
                let stream =
                    build_input_stream(&device, &stream_config, producer, dropped_input.clone())?;
                (Some(stream), Some(bridge), Some(name))
            }
            None => (None, None, None),
        };

        let output = match sample_format {
            SampleFormat::F32 => {
                build_output_stream::<f32>(&output_device, &stream_config, engine, bridge, stop.clone())?
            }
            SampleFormat::I16 => {
                build_output_stream::<i16>(&output_device, &stream_config, engine, bridge, stop.clone())?
            }
            SampleFormat::U16 => {
                build_output_stream::<u16>(&output_device, &stream_config, engine, bridge, stop.clone())?
            }
            other => {
                return Err(AudioError::Device(format!(
                    "unsupported sample format: {:?}",
                    other
                )))
            }
        };

        let config = AudioHostConfig {
            sample_rate: context.sample_rate,
            channels: stream_config.channels,
            frames_per_buffer: context.frames_per_buffer,
            sample_format,
            host_name,
            output_device: output_name,
            input_device: input_name,
        };

        info!(
            "Host '{}', output '{}'{}",
            config.host_name,
            config.output_device,
            config
                .input_device
                .as_ref()
                .map(|name| format!(", input '{}'", name))
                .unwrap_or_default()
        );
        info!(
            "Sample rate: {} Hz, channels: {}, buffer: {} frames, format: {:?}",
            config.sample_rate, config.channels, config.frames_per_buffer, config.sample_format
        );

        Ok(Self {
            output,
            input,
            config,
            stop,
            dropped_input,
        })
    }

    pub fn start(&self) -> AudioResult<()> {
        if let Some(input) = &self.input {
            input
                .play()
                .map_err(|e| AudioError::Device(format!("failed to start input stream: {}", e)))?;
        }
        self.output
            .play()
            .map_err(|e| AudioError::Device(format!("failed to start output stream: {}", e)))?;
        info!("Stream started");
        Ok(())
    }

    pub fn stop(&self) -> AudioResult<()> {
        self.output
            .pause()
            .map_err(|e| AudioError::Device(format!("failed to stop output stream: {}", e)))?;
        if let Some(input) = &self.input {
            input
                .pause()
                .map_err(|e| AudioError::Device(format!("failed to stop input stream: {}", e)))?;
        }
        let dropped = self.dropped_input.swap(0, Ordering::Relaxed);
        if dropped > 0 {
            warn!("Dropped {} input samples (input ring full)", dropped);
        }
        info!("Stream stopped");
        Ok(())
    }

    /// Block until the stop signal is raised, then stop the streams.
    pub fn run_until_stopped(&self, poll: Duration) -> AudioResult<()> {
        self.stop.wait(poll);
        self.stop()
    }

    pub fn config(&self) -> &AudioHostConfig {
        &self.config
    }
}

/// Prefer 32-bit float; otherwise take whatever the device offers for the
/// requested channel count and rate.
fn choose_output_format(device: &cpal::Device, config: &StreamConfig) -> SampleFormat {
    let candidates: Vec<SampleFormat> = match device.supported_output_configs() {
        Ok(configs) => configs
            .filter(|c| {
                c.channels() == config.channels
                    && c.min_sample_rate() <= config.sample_rate
                    && c.max_sample_rate() >= config.sample_rate
            })
            .map(|c| c.sample_format())
            .collect(),
        Err(err) => {
            warn!("Failed to query output configs: {}", err);
            Vec::new()
        }
    };

    if candidates.contains(&SampleFormat::F32) {
        SampleFormat::F32
    } else if let Some(format) = candidates
        .iter()
        .copied()
        .find(|f| matches!(f, SampleFormat::I16 | SampleFormat::U16))
    {
        format
    } else {
        warn!(
            "Device reports no matching config for {} channel(s) at {} Hz, trying f32",
            config.channels, config.sample_rate.0
        );
        SampleFormat::F32
    }
}

fn build_input_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    mut producer: rtrb::Producer<f32>,
    dropped: Arc<AtomicUsize>,
) -> AudioResult<cpal::Stream> {
    device
        .build_input_stream(
            config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let lost = push_input(&mut producer, data);
                if lost > 0 {
                    dropped.fetch_add(lost, Ordering::Relaxed);
                }
            },
            |err| error!("Input stream error: {}", err),
            None,
        )
        .map_err(|e| AudioError::Device(format!("failed to build input stream: {}", e)))
}

fn build_output_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut engine: RenderEngine,
    mut bridge: Option<InputBridge>,
    stop: StopSignal,
) -> AudioResult<cpal::Stream>
where
    T: Sample + SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut scratch = vec![0.0f32; engine.context().block_len()];

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                render_block(data, channels, &mut scratch, &mut engine, bridge.as_mut(), &stop);
            },
            |err| error!("Stream error: {}", err),
            None,
        )
        .map_err(|e| AudioError::Device(format!("failed to build output stream: {}", e)))
}

/// Fill one driver buffer, converting to the device's sample type.
///
/// Buffers larger than `scratch` are rendered as consecutive blocks. Once
/// the stop signal is raised the buffer is filled with silence.
pub(crate) fn render_block<T>(
    data: &mut [T],
    channels: usize,
    scratch: &mut [f32],
    engine: &mut RenderEngine,
    mut bridge: Option<&mut InputBridge>,
    stop: &StopSignal,
) where
    T: Sample + FromSample<f32>,
{
    let chunk_len = if channels == 0 {
        0
    } else {
        scratch.len() - scratch.len() % channels
    };

    if stop.is_requested() || chunk_len == 0 {
        data.fill(T::EQUILIBRIUM);
        return;
    }

    for chunk in data.chunks_mut(chunk_len) {
        let frames = chunk.len() / channels;
        let block = &mut scratch[..chunk.len()];
        block[frames * channels..].fill(0.0);

        let input = bridge.as_deref_mut().map(|b| b.pull(chunk.len()));
        let status = engine.render(input, block, frames, channels);

        for (out, &sample) in chunk.iter_mut().zip(block.iter()) {
            *out = T::from_sample(sample);
        }

        if status == RenderStatus::Abort {
            stop.request();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SampleBuffer;
    use crate::audio_engine::RenderContext;
    use crate::nodes::LoopingPlaybackSource;

    fn engine(samples: &[f32], channels: usize, frames_per_buffer: usize) -> RenderEngine {
        let source =
            LoopingPlaybackSource::new(SampleBuffer::from_samples(samples.to_vec(), 44_100));
        RenderEngine::new(
            Box::new(source),
            RenderContext {
                sample_rate: 44_100,
                channels,
                frames_per_buffer,
            },
        )
    }

    #[test]
    fn oversized_driver_buffers_render_in_blocks() {
        let mut engine = engine(&[1.0, 2.0, 3.0, 4.0], 1, 3);
        let mut scratch = vec![0.0; 3];
        let mut data = [0.0f32; 6];

        render_block(&mut data, 1, &mut scratch, &mut engine, None, &StopSignal::new());
        assert_eq!(data, [1.0, 2.0, 3.0, 4.0, 0.0, 0.0]);
    }

    #[test]
    fn converts_to_integer_formats() {
        let mut engine = engine(&[0.5, -0.5], 2, 2);
        let mut scratch = vec![0.0; 4];
        let mut data = [7i16; 4];

        render_block(&mut data, 2, &mut scratch, &mut engine, None, &StopSignal::new());
        let high = i16::from_sample(0.5f32);
        let low = i16::from_sample(-0.5f32);
        assert!(high > 16_000 && low < -16_000);
        assert_eq!(data, [high, high, low, low]);
    }

    #[test]
    fn stop_signal_silences_output() {
        let mut engine = engine(&[1.0, 1.0], 1, 2);
        let mut scratch = vec![0.0; 2];
        let mut data = [5.0f32; 2];
        let stop = StopSignal::new();
        stop.request();

        render_block(&mut data, 1, &mut scratch, &mut engine, None, &stop);
        assert_eq!(data, [0.0, 0.0]);
    }

    #[test]
    fn bridged_input_reaches_the_engine() {
        let mut osc = crate::nodes::WavetableOscillator::with_delta(
            crate::nodes::Wavetable::new(vec![0.0]).unwrap(),
            0.0,
        )
        .unwrap();
        osc.set_enabled(false);
        let mut engine = RenderEngine::new(
            Box::new(osc),
            RenderContext {
                sample_rate: 44_100,
                channels: 2,
                frames_per_buffer: 2,
            },
        );
        let (mut producer, mut bridge) = InputBridge::new(4, 16);
        push_input(&mut producer, &[0.1, 0.2, 0.3, 0.4]);

        let mut scratch = vec![0.0; 4];
        let mut data = [0.0f32; 4];
        render_block(
            &mut data,
            2,
            &mut scratch,
            &mut engine,
            Some(&mut bridge),
            &StopSignal::new(),
        );
        assert_eq!(data, [0.1, 0.2, 0.3, 0.4]);
    }
}
