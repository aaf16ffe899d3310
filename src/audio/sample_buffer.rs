use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::error::{AudioError, AudioResult};

use super::container;

/// Fully decoded mono audio, loaded once before the stream starts.
///
/// The sample data is shared and never mutated, so cloning a buffer is cheap
/// and every clone sees the same frames.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    /// Decode the whole file at `path` into memory.
    pub fn load(path: impl AsRef<Path>) -> AudioResult<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| AudioError::open(&name, e))?;
        let extension = path.extension().and_then(|ext| ext.to_str());
        let buffer = Self::decode(BufReader::new(file), &name, extension)?;

        info!("Sample rate for {} is {} Hz", name, buffer.sample_rate);
        info!("Number of frames: {}", buffer.frame_count());
        info!("Duration is {:.3} s", buffer.duration_secs());

        Ok(buffer)
    }

    /// Decode audio data from any reader, e.g. an in-memory `Cursor`.
    ///
    /// RIFF/WAVE goes through hound; AIFF and the other containers symphonia
    /// knows are probed from their contents.
    pub fn from_reader<R: Read>(reader: R) -> AudioResult<Self> {
        Self::decode(reader, "<reader>", None)
    }

    fn decode<R: Read>(mut reader: R, name: &str, extension: Option<&str>) -> AudioResult<Self> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| AudioError::open(name, e))?;

        if is_riff_wave(&bytes) {
            Self::decode_wav(Cursor::new(bytes), name)
        } else {
            let (samples, sample_rate) = container::decode_mono(bytes, name, extension)?;
            Ok(Self::from_samples(samples, sample_rate))
        }
    }

    fn decode_wav<R: Read>(reader: R, name: &str) -> AudioResult<Self> {
        let mut wav_reader = hound::WavReader::new(reader).map_err(|e| AudioError::open(name, e))?;
        let spec = wav_reader.spec();

        if spec.channels != 1 {
            return Err(AudioError::Channel {
                channels: spec.channels,
            });
        }

        let samples: Result<Vec<f32>, hound::Error> =
            match (spec.bits_per_sample, spec.sample_format) {
                (32, hound::SampleFormat::Float) => wav_reader.samples::<f32>().collect(),
                (8, hound::SampleFormat::Int) => wav_reader
                    .samples::<i8>()
                    .map(|s| s.map(|s| s as f32 / i8::MAX as f32))
                    .collect(),
                (16, hound::SampleFormat::Int) => wav_reader
                    .samples::<i16>()
                    .map(|s| s.map(|s| s as f32 / i16::MAX as f32))
                    .collect(),
                (24, hound::SampleFormat::Int) => wav_reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / 8_388_607.0))
                    .collect(),
                (32, hound::SampleFormat::Int) => wav_reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / i32::MAX as f32))
                    .collect(),
                (bits, format) => {
                    return Err(AudioError::Format(format!(
                        "bits_per_sample={} sample_format={:?}",
                        bits, format
                    )))
                }
            };

        let samples = samples.map_err(|e| AudioError::open(name, e))?;
        Ok(Self::from_samples(samples, spec.sample_rate))
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length of the source in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frame_count() as f64 / self.sample_rate as f64
        }
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

fn is_riff_wave(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn wav_bytes(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    /// 80-bit IEEE extended encoding of an integral sample rate.
    fn extended_rate(rate: u32) -> [u8; 10] {
        let exponent = 31 - rate.leading_zeros();
        let mantissa = (rate as u64) << (63 - exponent);
        let mut out = [0u8; 10];
        out[..2].copy_from_slice(&(16_383 + exponent as u16).to_be_bytes());
        out[2..].copy_from_slice(&mantissa.to_be_bytes());
        out
    }

    /// Uncompressed 16-bit AIFF.
    fn aiff_bytes(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let frames = (samples.len() / channels as usize) as u32;
        let data_len = (samples.len() * 2) as u32;

        let mut out = Vec::new();
        out.extend_from_slice(b"FORM");
        out.extend_from_slice(&(4 + 26 + 16 + data_len).to_be_bytes());
        out.extend_from_slice(b"AIFF");

        out.extend_from_slice(b"COMM");
        out.extend_from_slice(&18u32.to_be_bytes());
        out.extend_from_slice(&channels.to_be_bytes());
        out.extend_from_slice(&frames.to_be_bytes());
        out.extend_from_slice(&16u16.to_be_bytes());
        out.extend_from_slice(&extended_rate(sample_rate));

        out.extend_from_slice(b"SSND");
        out.extend_from_slice(&(8 + data_len).to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());
        for s in samples {
            out.extend_from_slice(&s.to_be_bytes());
        }
        out
    }

    #[test]
    fn extended_rate_matches_known_encoding() {
        assert_eq!(
            extended_rate(44_100),
            [0x40, 0x0E, 0xAC, 0x44, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn decodes_mono_aiff() {
        let bytes = aiff_bytes(1, 44_100, &[0, 16_384, -16_384, 0, 8_192]);
        let buffer = SampleBuffer::from_reader(Cursor::new(bytes)).unwrap();

        assert_eq!(buffer.sample_rate(), 44_100);
        assert_eq!(buffer.frame_count(), 5);
        let expected = [0.0, 0.5, -0.5, 0.0, 0.25];
        for (got, want) in buffer.samples().iter().zip(expected) {
            assert!((got - want).abs() < 1e-3, "{} vs {}", got, want);
        }
    }

    #[test]
    fn rejects_stereo_aiff() {
        let bytes = aiff_bytes(2, 22_050, &[1, 2, 3, 4]);
        let err = SampleBuffer::from_reader(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, AudioError::Channel { channels: 2 }));
    }

    #[test]
    fn loads_aiff_from_disk() {
        let path = std::env::temp_dir().join(format!("loop_synth_{}_sine.aif", std::process::id()));
        std::fs::write(&path, aiff_bytes(1, 8_000, &[0, 16_384, 0, -16_384])).unwrap();

        let loaded = SampleBuffer::load(&path);
        let _ = std::fs::remove_file(&path);
        let buffer = loaded.unwrap();
        assert_eq!(buffer.sample_rate(), 8_000);
        assert_eq!(buffer.frame_count(), 4);
    }

    #[test]
    fn unsupported_bit_depth_is_format_error() {
        // 40-bit integer PCM: a well-formed header hound accepts.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(4 + 24 + 8 + 5u32).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // channels
        bytes.extend_from_slice(&8_000u32.to_le_bytes());
        bytes.extend_from_slice(&40_000u32.to_le_bytes()); // byte rate
        bytes.extend_from_slice(&5u16.to_le_bytes()); // block align
        bytes.extend_from_slice(&40u16.to_le_bytes()); // bits per sample
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&5u32.to_le_bytes());
        bytes.extend_from_slice(&[0, 0, 0, 0, 0]);

        let err = SampleBuffer::from_reader(Cursor::new(bytes)).unwrap_err();
        match err {
            AudioError::Format(msg) => assert!(msg.contains("bits_per_sample=40")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decodes_mono_pcm16() {
        let bytes = wav_bytes(1, 22_050, &[0, i16::MAX, -i16::MAX, 0]);
        let buffer = SampleBuffer::from_reader(Cursor::new(bytes)).unwrap();

        assert_eq!(buffer.frame_count(), 4);
        assert_eq!(buffer.sample_rate(), 22_050);
        assert_eq!(buffer.samples(), &[0.0, 1.0, -1.0, 0.0]);
    }

    #[test]
    fn decodes_float_wav() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for s in [0.25f32, -0.5, 0.75] {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.set_position(0);

        let buffer = SampleBuffer::from_reader(cursor).unwrap();
        assert_eq!(buffer.samples(), &[0.25, -0.5, 0.75]);
    }

    #[test]
    fn rejects_stereo_input() {
        let bytes = wav_bytes(2, 44_100, &[1, 2, 3, 4]);
        let err = SampleBuffer::from_reader(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, AudioError::Channel { channels: 2 }));
    }

    #[test]
    fn rejects_garbage_as_open_error() {
        let err = SampleBuffer::from_reader(Cursor::new(b"not a wav file".to_vec())).unwrap_err();
        assert!(matches!(err, AudioError::Open { .. }));
    }

    #[test]
    fn missing_file_is_open_error() {
        let err = SampleBuffer::load("/definitely/not/here.wav").unwrap_err();
        match err {
            AudioError::Open { name, .. } => assert!(name.ends_with("here.wav")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duration_follows_sample_rate() {
        let buffer = SampleBuffer::from_samples(vec![0.0; 22_050], 44_100);
        assert!((buffer.duration_secs() - 0.5).abs() < 1e-12);
    }
}
