//! Offline rendering
//!
//! Drives a [`RenderEngine`] at its fixed block cadence without an audio
//! device and writes the result as a 32-bit float WAV.

use std::io::{Seek, Write};

use log::info;

use crate::error::{AudioError, AudioResult};

use super::engine::{RenderEngine, RenderStatus};

/// Render `total_frames` frames into `writer`. Returns the frames written.
pub fn bounce<W: Write + Seek>(
    engine: &mut RenderEngine,
    total_frames: usize,
    writer: W,
) -> AudioResult<usize> {
    let context = *engine.context();
    if context.channels == 0 || context.frames_per_buffer == 0 {
        return Err(AudioError::Parameter(
            "cannot bounce with zero channels or zero block size".into(),
        ));
    }

    let spec = hound::WavSpec {
        channels: context.channels as u16,
        sample_rate: context.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut wav = hound::WavWriter::new(writer, spec).map_err(|e| AudioError::open("<bounce>", e))?;

    let mut block = vec![0.0f32; context.block_len()];
    let mut written = 0;

    while written < total_frames {
        let frames = (total_frames - written).min(context.frames_per_buffer);
        let samples = &mut block[..frames * context.channels];

        let status = engine.render(None, samples, frames, context.channels);
        for &s in samples.iter() {
            wav.write_sample(s).map_err(|e| AudioError::open("<bounce>", e))?;
        }
        written += frames;

        if status == RenderStatus::Abort {
            break;
        }
    }

    wav.finalize().map_err(|e| AudioError::open("<bounce>", e))?;
    info!(
        "Bounced {} frames ({} channel(s), {} Hz) from {}",
        written,
        context.channels,
        context.sample_rate,
        engine.source_name()
    );
    Ok(written)
}
