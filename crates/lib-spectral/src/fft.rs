//! Real-input FFT using realfft.
//!
//! Light curves are real-valued, so only the non-negative half of the
//! spectrum is computed. Segment lengths come from the data and are never
//! padded; realfft plans any length, including odd ones.

use crate::error::{SpectralError, SpectralResult};
use lib_types::units::{Hertz, Seconds};
use num_complex::Complex64;
use realfft::RealFftPlanner;

/// FFT engine with a cached real-input planner.
pub struct FftEngine {
    real_planner: RealFftPlanner<f64>,
}

impl FftEngine {
    /// Create a new FFT engine.
    pub fn new() -> Self {
        Self {
            real_planner: RealFftPlanner::new(),
        }
    }

    /// Perform forward real-to-complex FFT.
    ///
    /// Input: N real samples
    /// Output: N/2 + 1 complex samples (Hermitian symmetry exploited)
    pub fn rfft(&mut self, data: &[f64]) -> SpectralResult<Vec<Complex64>> {
        let len = data.len();
        if len == 0 {
            return Err(SpectralError::InsufficientData { needed: 1, got: 0 });
        }

        let r2c = self.real_planner.plan_fft_forward(len);
        let mut input = data.to_vec();
        let mut output = r2c.make_output_vec();

        r2c.process(&mut input, &mut output)
            .map_err(|e| SpectralError::NumericalInstability(e.to_string()))?;

        Ok(output)
    }
}

impl Default for FftEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of strictly positive frequencies below Nyquist for `n` samples.
///
/// Zero frequency is excluded, and so is the Nyquist bin of an even-length
/// transform: `(n - 1) / 2` bins in both cases.
#[inline]
pub fn positive_bin_count(n: usize) -> usize {
    n.saturating_sub(1) / 2
}

/// Frequency resolution of an `n`-sample transform.
#[inline]
pub fn frequency_resolution(n: usize, dt: Seconds) -> Hertz {
    Hertz(1.0 / (n as f64 * dt.0))
}

/// Positive Fourier frequencies `k / (n * dt)` for `k = 1 ..= (n - 1) / 2`.
pub fn positive_frequencies(n: usize, dt: Seconds) -> Vec<f64> {
    let df = frequency_resolution(n, dt).0;
    (1..=positive_bin_count(n)).map(|k| k as f64 * df).collect()
}
