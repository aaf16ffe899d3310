use log::info;

use crate::audio::SampleBuffer;
use crate::config::{EngineConfig, TableSource};
use crate::error::AudioResult;
use crate::nodes::{LoopingPlaybackSource, Wavetable, WavetableOscillator};

use super::engine::{RenderContext, RenderEngine};

/// Engine that loops `buffer` at its own sample rate.
pub fn playback_engine(buffer: SampleBuffer, config: &EngineConfig) -> AudioResult<RenderEngine> {
    config.validate()?;

    let context = RenderContext {
        sample_rate: buffer.sample_rate(),
        channels: config.playback_channels as usize,
        frames_per_buffer: config.frames_per_buffer,
    };
    info!(
        "Playback engine: {} frames at {} Hz, {} output channel(s)",
        buffer.frame_count(),
        context.sample_rate,
        context.channels
    );

    let source = LoopingPlaybackSource::new(buffer);
    Ok(RenderEngine::new(Box::new(source), context))
}

/// Build the oscillator's table as configured.
pub fn build_wavetable(config: &EngineConfig) -> AudioResult<Wavetable> {
    let size = config.synth.table_size;
    match &config.synth.table {
        TableSource::Synthesized { shape, harmonics } => {
            Wavetable::synthesize(*shape, size, *harmonics)
        }
        TableSource::File { path, fit } => {
            let buffer = SampleBuffer::load(path)?;
            Wavetable::from_buffer(&buffer, size, *fit)
        }
    }
}

/// Engine driving a wavetable oscillator at the configured frequency.
pub fn synthesis_engine(config: &EngineConfig) -> AudioResult<RenderEngine> {
    config.validate()?;

    let synth = &config.synth;
    let table = build_wavetable(config)?;
    let mut oscillator = WavetableOscillator::new(table, synth.frequency, synth.sample_rate as f32)?;
    oscillator.set_amplitude(synth.amplitude);
    oscillator.set_enabled(synth.enabled);

    let context = RenderContext {
        sample_rate: synth.sample_rate,
        channels: synth.channels as usize,
        frames_per_buffer: config.frames_per_buffer,
    };
    info!(
        "Synthesis engine: {} Hz tone, table of {}, delta {:.5}, {} channel(s) at {} Hz",
        synth.frequency,
        synth.table_size,
        oscillator.delta(),
        context.channels,
        context.sample_rate
    );

    Ok(RenderEngine::new(Box::new(oscillator), context))
}
