use log::{info, warn};
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::error::AudioResult;

/// How a decoded file is squeezed into a fixed number of table cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TableFit {
    /// Copy the first `size` samples; a short file is zero-padded.
    #[default]
    Truncate,
    /// Resample the whole file, taken as one cycle, to exactly `size` samples.
    Resample,
}

/// Produce exactly `size` samples from `samples` using the given strategy.
pub fn fit_samples(samples: &[f32], size: usize, fit: TableFit) -> AudioResult<Vec<f32>> {
    if samples.len() == size {
        return Ok(samples.to_vec());
    }

    match fit {
        TableFit::Truncate => Ok(truncate(samples, size)),
        TableFit::Resample if samples.is_empty() => {
            warn!("Table source is empty, using {} cells of silence", size);
            Ok(vec![0.0; size])
        }
        TableFit::Resample => Ok(resample(samples, size)),
    }
}

fn truncate(samples: &[f32], size: usize) -> Vec<f32> {
    if samples.len() > size {
        warn!(
            "{} extra samples will be ignored (table holds {})",
            samples.len() - size,
            size
        );
    } else {
        warn!(
            "Table source has {} samples, zero-padding to {}",
            samples.len(),
            size
        );
    }

    let mut table = vec![0.0; size];
    let n = samples.len().min(size);
    table[..n].copy_from_slice(&samples[..n]);
    table
}

/// Band-limited periodic resampling: the source is treated as one cycle and
/// its spectrum is cropped or zero-extended to `size` bins, so cell 0 of the
/// table lines up with sample 0 of the source and the last cell wraps back
/// into the first.
fn resample(samples: &[f32], size: usize) -> Vec<f32> {
    let len = samples.len();
    info!(
        "Resampling table source: {} -> {} samples (ratio {:.5})",
        len,
        size,
        size as f64 / len as f64
    );
    if size == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f64>::new();
    let mut spectrum: Vec<Complex<f64>> = samples
        .iter()
        .map(|&s| Complex { re: s as f64, im: 0.0 })
        .collect();
    planner.plan_fft_forward(len).process(&mut spectrum);

    let mut resized = vec![Complex { re: 0.0, im: 0.0 }; size];
    let kept = len.min(size);
    let below_nyquist = (kept - 1) / 2;

    resized[0] = spectrum[0];
    for k in 1..=below_nyquist {
        resized[k] = spectrum[k];
        resized[size - k] = spectrum[len - k];
    }

    if kept % 2 == 0 {
        let nyquist = kept / 2;
        if size < len {
            // Both source bins at +/- nyquist fold onto the table's Nyquist bin.
            resized[nyquist] = spectrum[nyquist] + spectrum[len - nyquist];
        } else {
            resized[nyquist] = spectrum[nyquist] * 0.5;
            resized[size - nyquist] = spectrum[nyquist] * 0.5;
        }
    }

    planner.plan_fft_inverse(size).process(&mut resized);

    let scale = 1.0 / len as f64;
    resized.iter().map(|c| (c.re * scale) as f32).collect()
}
