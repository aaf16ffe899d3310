// wavetable_oscillator.rs

use crate::error::{AudioError, AudioResult};
use crate::traits::RenderSource;

use super::wavetable::Wavetable;

/// Table-lookup oscillator with a phase accumulator and linear interpolation.
///
/// `cur_index` is a fractional position in `[0, table_size)`. Every call to
/// [`next`](Self::next) blends the two neighbouring cells and advances the
/// phase by `delta`. The table is circular: the last cell blends back toward
/// the first.
pub struct WavetableOscillator {
    table: Wavetable,
    cur_index: f32,
    delta: f32,
    amplitude: f32,
    enabled: bool,
}

impl WavetableOscillator {
    /// Create an oscillator playing `frequency` Hz at `sample_rate`.
    pub fn new(table: Wavetable, frequency: f32, sample_rate: f32) -> AudioResult<Self> {
        let delta = Self::phase_increment(frequency, table.len(), sample_rate)?;
        Self::with_delta(table, delta)
    }

    /// Create an oscillator with an explicit per-frame phase increment.
    pub fn with_delta(table: Wavetable, delta: f32) -> AudioResult<Self> {
        Self::check_delta(delta, table.len())?;
        Ok(Self {
            table,
            cur_index: 0.0,
            delta,
            amplitude: 1.0,
            enabled: true,
        })
    }

    /// `delta = frequency * table_size / sample_rate`
    pub fn phase_increment(frequency: f32, table_size: usize, sample_rate: f32) -> AudioResult<f32> {
        if !(sample_rate > 0.0) {
            return Err(AudioError::Parameter(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        let delta = frequency * table_size as f32 / sample_rate;
        Self::check_delta(delta, table_size)?;
        Ok(delta)
    }

    fn check_delta(delta: f32, table_size: usize) -> AudioResult<()> {
        if !delta.is_finite() || delta < 0.0 || delta >= table_size as f32 {
            return Err(AudioError::Parameter(format!(
                "phase increment {} is outside [0, {})",
                delta, table_size
            )));
        }
        Ok(())
    }

    /// Re-derive `delta` for a new frequency. The phase is kept.
    pub fn set_frequency(&mut self, frequency: f32, sample_rate: f32) -> AudioResult<()> {
        self.delta = Self::phase_increment(frequency, self.table.len(), sample_rate)?;
        Ok(())
    }

    /// Move the phase; values outside the table are wrapped into range and
    /// a non-finite phase restarts the cycle at 0.
    pub fn set_phase(&mut self, cur_index: f32) {
        if !cur_index.is_finite() {
            self.cur_index = 0.0;
            return;
        }
        let size = self.table.len() as f32;
        let wrapped = cur_index.rem_euclid(size);
        // rem_euclid can round up to `size` for tiny negative inputs.
        self.cur_index = if wrapped >= size { 0.0 } else { wrapped };
    }

    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = amplitude;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn cur_index(&self) -> f32 {
        self.cur_index
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn table(&self) -> &Wavetable {
        &self.table
    }

    /// Produce one interpolated sample and advance the phase.
    #[inline]
    pub fn next(&mut self) -> f32 {
        let table = self.table.samples();
        let size = table.len();

        let index0 = (self.cur_index as usize).min(size - 1);
        let index1 = (index0 + 1) % size;
        let fraction = self.cur_index - index0 as f32;

        let value0 = table[index0];
        let value1 = table[index1];
        let sample = value0 + fraction * (value1 - value0);

        self.cur_index += self.delta;
        if self.cur_index >= size as f32 {
            self.cur_index -= size as f32;
        }

        sample
    }
}

impl RenderSource for WavetableOscillator {
    /// Overwrites every frame with `amplitude * next()`, copied to all
    /// channels. A disabled oscillator leaves `output` untouched.
    fn fill(&mut self, output: &mut [f32], frame_count: usize, channel_count: usize) {
        if !self.enabled || channel_count == 0 {
            return;
        }

        for frame in output.chunks_exact_mut(channel_count).take(frame_count) {
            let sample = self.amplitude * self.next();
            frame.fill(sample);
        }
    }

    fn reset(&mut self) {
        self.cur_index = 0.0;
    }

    fn name(&self) -> &'static str {
        "wavetable_oscillator"
    }
}
