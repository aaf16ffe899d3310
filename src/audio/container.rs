//! Decoding for non-WAV containers (AIFF and friends) through symphonia.

use std::io::{Cursor, ErrorKind};

use log::debug;
use symphonia::core::audio::SampleBuffer as DecodedBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use crate::error::{AudioError, AudioResult};

/// Decode the first audio track of `bytes` into f32 samples and its rate.
///
/// The track must be mono. An unreadable or unrecognised container is an
/// `Open` error; a recognised container with a codec we cannot decode is a
/// `Format` error.
pub(crate) fn decode_mono(
    bytes: Vec<u8>,
    name: &str,
    extension: Option<&str>,
) -> AudioResult<(Vec<f32>, u32)> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AudioError::open(name, e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Format(format!("{} has no audio track", name)))?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let channels = params
        .channels
        .map(|c| c.count())
        .ok_or_else(|| AudioError::Format(format!("{} does not declare a channel count", name)))?;
    if channels != 1 {
        return Err(AudioError::Channel {
            channels: channels as u16,
        });
    }
    let sample_rate = params
        .sample_rate
        .ok_or_else(|| AudioError::Format(format!("{} does not declare a sample rate", name)))?;

    let mut decoder = get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|e| match e {
            SymphoniaError::Unsupported(what) => AudioError::Format(what.to_string()),
            other => AudioError::open(name, other),
        })?;

    let mut samples = Vec::new();
    let mut scratch: Option<DecodedBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(AudioError::open(name, e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| AudioError::open(name, e))?;
        let frames = decoded.capacity();
        if scratch.as_ref().map_or(true, |buf| buf.capacity() < frames) {
            scratch = Some(DecodedBuffer::new(frames as u64, *decoded.spec()));
        }
        if let Some(buf) = scratch.as_mut() {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    debug!("Decoded {} frames from {} via symphonia", samples.len(), name);
    Ok((samples, sample_rate))
}
