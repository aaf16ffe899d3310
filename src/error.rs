use std::path::PathBuf;

use thiserror::Error;

pub type AudioResult<T> = Result<T, AudioError>;

/// Decoder errors come from hound, symphonia or the filesystem.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can go wrong while setting up or tearing down playback.
///
/// The render path itself never produces one of these.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("could not open audio file {name}: {source}")]
    Open {
        name: String,
        #[source]
        source: BoxedError,
    },

    #[error("input file is not mono ({channels} channels)")]
    Channel { channels: u16 },

    #[error("invalid encoding: {0}")]
    Format(String),

    #[error("audio device error: {0}")]
    Device(String),

    #[error("invalid parameter: {0}")]
    Parameter(String),

    #[error("could not parse config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AudioError {
    pub(crate) fn open(name: impl Into<String>, source: impl Into<BoxedError>) -> Self {
        Self::Open {
            name: name.into(),
            source: source.into(),
        }
    }
}
