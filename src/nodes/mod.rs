mod looping_playback;
mod wavetable;
mod wavetable_oscillator;

pub use looping_playback::LoopingPlaybackSource;
pub use wavetable::{WaveShape, Wavetable};
pub use wavetable_oscillator::WavetableOscillator;
