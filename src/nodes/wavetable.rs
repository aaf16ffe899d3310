// wavetable.rs

use std::sync::Arc;

use log::info;
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::audio::{fit_samples, SampleBuffer, TableFit};
use crate::error::{AudioError, AudioResult};

/// Waveforms that can be built by harmonic summation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WaveShape {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl WaveShape {
    /// Sine-series coefficient of harmonic `n` (n >= 1).
    fn harmonic_amplitude(self, n: usize) -> f32 {
        let nf = n as f32;
        match self {
            WaveShape::Sine => {
                if n == 1 {
                    1.0
                } else {
                    0.0
                }
            }
            WaveShape::Square => {
                if n % 2 == 1 {
                    1.0 / nf
                } else {
                    0.0
                }
            }
            WaveShape::Sawtooth => {
                let sign = if n % 2 == 1 { 1.0 } else { -1.0 };
                sign / nf
            }
            WaveShape::Triangle => {
                if n % 2 == 0 {
                    return 0.0;
                }
                let sign = if (n / 2) % 2 == 0 { 1.0 } else { -1.0 };
                sign / (nf * nf)
            }
        }
    }
}

/// One cycle of a waveform, fixed in size and never modified after
/// construction.
#[derive(Debug, Clone)]
pub struct Wavetable {
    samples: Arc<[f32]>,
}

impl Wavetable {
    pub fn new(samples: Vec<f32>) -> AudioResult<Self> {
        if samples.is_empty() {
            return Err(AudioError::Parameter(
                "wavetable must hold at least one sample".into(),
            ));
        }
        Ok(Self {
            samples: samples.into(),
        })
    }

    /// Additive synthesis of `shape` using harmonics `1..=harmonics`.
    ///
    /// The spectrum is built directly and turned into one time-domain cycle
    /// with an inverse FFT. Harmonics at or above Nyquist for the table size
    /// are dropped, and the result is normalised to a peak of 1.0.
    pub fn synthesize(shape: WaveShape, size: usize, harmonics: usize) -> AudioResult<Self> {
        if size == 0 {
            return Err(AudioError::Parameter("table size must be non-zero".into()));
        }

        let max_h = harmonics.min(size.saturating_sub(1) / 2);
        let mut spectrum = vec![Complex { re: 0.0f32, im: 0.0 }; size];

        // x[n] = sum b_k sin(2*pi*k*n/N)  <=>  X[k] = -i*b_k/2, X[N-k] = i*b_k/2
        for k in 1..=max_h {
            let b = shape.harmonic_amplitude(k);
            spectrum[k].im = -0.5 * b;
            spectrum[size - k].im = 0.5 * b;
        }

        let mut planner = FftPlanner::new();
        let ifft = planner.plan_fft_inverse(size);
        ifft.process(&mut spectrum);

        let mut samples: Vec<f32> = spectrum.iter().map(|c| c.re).collect();

        let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        if peak > 1e-12 {
            for s in &mut samples {
                *s /= peak;
            }
        }

        info!(
            "Synthesized {:?} table: size={}, harmonics={}",
            shape, size, max_h
        );
        Self::new(samples)
    }

    /// Build a table of exactly `size` cells from a decoded mono file.
    pub fn from_buffer(buffer: &SampleBuffer, size: usize, fit: TableFit) -> AudioResult<Self> {
        if size == 0 {
            return Err(AudioError::Parameter("table size must be non-zero".into()));
        }
        Self::new(fit_samples(buffer.samples(), size, fit)?)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}
