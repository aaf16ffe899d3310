// src/traits/mod.rs

/// A signal generator the render engine can drive from the audio thread.
///
/// `fill` is called once per driver period with an interleaved block of
/// `frame_count * channel_count` samples. Implementations must finish in time
/// proportional to the block size: no blocking, no allocation, no I/O.
pub trait RenderSource: Send + 'static {
    /// Write one block of interleaved samples into `output`.
    fn fill(&mut self, output: &mut [f32], frame_count: usize, channel_count: usize);

    /// Return to the initial playback position / phase.
    fn reset(&mut self);

    fn name(&self) -> &'static str;
}
