mod container;
mod sample_buffer;
mod table_fit;

pub use sample_buffer::SampleBuffer;
pub use table_fit::{fit_samples, TableFit};

#[cfg(test)]
pub(crate) use sample_buffer::tests::wav_bytes;
