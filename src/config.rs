use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::audio::TableFit;
use crate::error::{AudioError, AudioResult};
use crate::nodes::WaveShape;

/// Top-level settings for both playback and synthesis modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub frames_per_buffer: usize,
    pub output_device: usize,
    pub input_device: usize,
    /// Output channels in playback mode; the mono source is copied to each.
    pub playback_channels: u16,
    pub synth: SynthConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frames_per_buffer: 512,
            output_device: 1,
            input_device: 0,
            playback_channels: 1,
            synth: SynthConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SynthConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub frequency: f32,
    pub table_size: usize,
    pub amplitude: f32,
    pub enabled: bool,
    /// Open the input device as well and copy it to the output before
    /// the oscillator runs.
    pub pass_through: bool,
    pub table: TableSource,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 2,
            frequency: 440.0,
            table_size: 128,
            amplitude: 1.0,
            enabled: true,
            pass_through: true,
            table: TableSource::default(),
        }
    }
}

/// Where the oscillator's table comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TableSource {
    Synthesized {
        shape: WaveShape,
        harmonics: usize,
    },
    File {
        path: PathBuf,
        #[serde(default)]
        fit: TableFit,
    },
}

impl Default for TableSource {
    fn default() -> Self {
        TableSource::Synthesized {
            shape: WaveShape::Square,
            harmonics: 15,
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> AudioResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json(&text).map_err(|e| match e {
            AudioError::Config { source, .. } => AudioError::Config {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> AudioResult<Self> {
        let config: Self = serde_json::from_str(text).map_err(|source| AudioError::Config {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AudioResult<()> {
        if self.frames_per_buffer == 0 {
            return Err(AudioError::Parameter("framesPerBuffer must be non-zero".into()));
        }
        if self.playback_channels == 0 || self.synth.channels == 0 {
            return Err(AudioError::Parameter("channel count must be non-zero".into()));
        }
        if self.synth.sample_rate == 0 {
            return Err(AudioError::Parameter("sample rate must be non-zero".into()));
        }
        if self.synth.table_size == 0 {
            return Err(AudioError::Parameter("tableSize must be non-zero".into()));
        }
        if !self.synth.amplitude.is_finite() || self.synth.amplitude < 0.0 {
            return Err(AudioError::Parameter(format!(
                "amplitude must be a non-negative number, got {}",
                self.synth.amplitude
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_setup() {
        let config = EngineConfig::default();
        assert_eq!(config.frames_per_buffer, 512);
        assert_eq!(config.output_device, 1);
        assert_eq!(config.input_device, 0);
        assert_eq!(config.synth.sample_rate, 44_100);
        assert_eq!(config.synth.channels, 2);
        assert_eq!(config.synth.table_size, 128);
        assert_eq!(
            config.synth.table,
            TableSource::Synthesized {
                shape: WaveShape::Square,
                harmonics: 15
            }
        );
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = EngineConfig::from_json(
            r#"{
                "framesPerBuffer": 256,
                "synth": {
                    "frequency": 220.0,
                    "table": { "kind": "file", "path": "Sine.wav", "fit": "resample" }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.frames_per_buffer, 256);
        assert_eq!(config.output_device, 1);
        assert_eq!(config.synth.frequency, 220.0);
        assert_eq!(config.synth.table_size, 128);
        assert_eq!(
            config.synth.table,
            TableSource::File {
                path: PathBuf::from("Sine.wav"),
                fit: TableFit::Resample
            }
        );
    }

    #[test]
    fn file_table_fit_defaults_to_truncate() {
        let config =
            EngineConfig::from_json(r#"{ "synth": { "table": { "kind": "file", "path": "t.wav" } } }"#)
                .unwrap();
        assert!(matches!(
            config.synth.table,
            TableSource::File {
                fit: TableFit::Truncate,
                ..
            }
        ));
    }

    #[test]
    fn round_trips_through_json() {
        let config = EngineConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn rejects_zero_buffer() {
        let err = EngineConfig::from_json(r#"{ "framesPerBuffer": 0 }"#).unwrap_err();
        assert!(matches!(err, AudioError::Parameter(_)));
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = EngineConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, AudioError::Config { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EngineConfig::load("/no/such/config.json").unwrap_err();
        assert!(matches!(err, AudioError::Io(_)));
    }
}
