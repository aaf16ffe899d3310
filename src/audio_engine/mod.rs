mod bounce;
mod engine;
mod setup;
mod stop;

pub use bounce::bounce;
pub use engine::{RenderContext, RenderEngine, RenderStatus};
pub use setup::{build_wavetable, playback_engine, synthesis_engine};
pub use stop::StopSignal;
