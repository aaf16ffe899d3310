pub mod audio;
pub mod audio_engine;
pub mod config;
pub mod error;
#[cfg(feature = "native-host")]
pub mod host;
pub mod nodes;
pub mod traits;

pub use audio::{SampleBuffer, TableFit};
pub use audio_engine::{
    bounce, playback_engine, synthesis_engine, RenderContext, RenderEngine, RenderStatus,
    StopSignal,
};
pub use config::{EngineConfig, SynthConfig, TableSource};
pub use error::{AudioError, AudioResult};
pub use nodes::{LoopingPlaybackSource, WaveShape, Wavetable, WavetableOscillator};
pub use traits::RenderSource;
