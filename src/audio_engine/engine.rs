use crate::traits::RenderSource;

/// Stream parameters negotiated with the driver at setup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub sample_rate: u32,
    pub channels: usize,
    pub frames_per_buffer: usize,
}

impl RenderContext {
    /// Interleaved samples in one full block.
    pub fn block_len(&self) -> usize {
        self.frames_per_buffer * self.channels
    }
}

/// What the driver should do after a render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    Continue,
    Abort,
}

/// Per-period orchestration between the driver and a [`RenderSource`].
///
/// Owned by the driver adapter once the stream is open; nothing else touches
/// it until the stream has been stopped.
pub struct RenderEngine {
    source: Box<dyn RenderSource>,
    context: RenderContext,
}

impl RenderEngine {
    pub fn new(source: Box<dyn RenderSource>, context: RenderContext) -> Self {
        Self { source, context }
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn reset(&mut self) {
        self.source.reset();
    }

    /// Render one interleaved block of `frame_count * channel_count` samples.
    ///
    /// A live `input` block is copied index-for-index first (its uncovered
    /// tail, or the whole block when there is no input, starts as silence).
    /// The source then writes its stage on top; an enabled oscillator
    /// replaces the copied input rather than mixing with it.
    pub fn render(
        &mut self,
        input: Option<&[f32]>,
        output: &mut [f32],
        frame_count: usize,
        channel_count: usize,
    ) -> RenderStatus {
        let len = (frame_count * channel_count).min(output.len());
        let output = &mut output[..len];
        let frame_count = if channel_count == 0 {
            0
        } else {
            len / channel_count
        };

        match input {
            Some(input) => {
                let copied = input.len().min(len);
                output[..copied].copy_from_slice(&input[..copied]);
                output[copied..].fill(0.0);
            }
            None => output.fill(0.0),
        }

        self.source.fill(output, frame_count, channel_count);

        RenderStatus::Continue
    }
}
