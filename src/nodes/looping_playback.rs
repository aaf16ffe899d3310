use crate::audio::SampleBuffer;
use crate::traits::RenderSource;

/// Plays a [`SampleBuffer`] over and over, one driver block at a time.
///
/// Each block starts as silence. Frames are copied from the cursor onward;
/// if the source runs out part way through a block, the rest of that block
/// stays silent and the cursor goes back to 0 for the next call. The cursor
/// also goes back to 0 when a block ends exactly on the last frame.
pub struct LoopingPlaybackSource {
    buffer: SampleBuffer,
    cursor: usize,
}

impl LoopingPlaybackSource {
    pub fn new(buffer: SampleBuffer) -> Self {
        Self { buffer, cursor: 0 }
    }

    /// Current read offset, always within `[0, frame_count]`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }
}

impl RenderSource for LoopingPlaybackSource {
    fn fill(&mut self, output: &mut [f32], frame_count: usize, channel_count: usize) {
        let len = (frame_count * channel_count).min(output.len());
        let output = &mut output[..len];
        output.fill(0.0);

        if channel_count == 0 {
            return;
        }

        let frame_count = len / channel_count;
        let source = self.buffer.samples();
        let remaining = &source[self.cursor.min(source.len())..];
        let copied = remaining.len().min(frame_count);

        for (frame, &sample) in output
            .chunks_exact_mut(channel_count)
            .zip(&remaining[..copied])
        {
            frame.fill(sample);
        }

        self.cursor += copied;
        if copied < frame_count || self.cursor >= source.len() {
            self.cursor = 0;
        }
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }

    fn name(&self) -> &'static str {
        "looping_playback"
    }
}
