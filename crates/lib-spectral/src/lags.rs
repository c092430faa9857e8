//! Phase and time lags between the two series of a cross spectrum.
//!
//! The phase of `fft1 * conj(fft2)` is positive when the first series leads
//! the second at that frequency.

use num_complex::Complex64;
use serde::Serialize;
use std::f64::consts::PI;

/// Time lag with its one-sigma uncertainty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeLag {
    /// Lag in seconds per frequency bin.
    pub lag: Vec<f64>,

    /// One-sigma uncertainty in seconds per frequency bin.
    pub error: Vec<f64>,
}

/// Phase of each cross-spectral bin, in radians within `(-pi, pi]`.
pub fn phase_lag(cs: &[Complex64]) -> Vec<f64> {
    cs.iter().map(|c| c.arg()).collect()
}

/// Time lag `phase / (2 pi f)` for each bin.
pub fn time_lag(freq: &[f64], cs: &[Complex64]) -> Vec<f64> {
    freq.iter()
        .zip(cs)
        .map(|(&f, c)| c.arg() / (2.0 * PI * f))
        .collect()
}

/// Time lag uncertainty from the raw coherence of an `m`-segment average
/// (Nowak et al. 1999):
///
/// ```text
/// sigma_t = sqrt((1 - raw) / (2 * raw * m)) / (2 pi f)
/// ```
///
/// Bins with zero or undefined coherence are NaN.
pub fn time_lag_error(freq: &[f64], raw_coherence: &[f64], m: usize) -> Vec<f64> {
    let m = m as f64;
    freq.iter()
        .zip(raw_coherence)
        .map(|(&f, &g)| {
            if !(g > 0.0) {
                return f64::NAN;
            }
            let phase_err = ((1.0 - g).max(0.0) / (2.0 * g * m)).sqrt();
            phase_err / (2.0 * PI * f)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quarter_cycle_lag() {
        let freq = [0.5, 2.0];
        let cs = [Complex64::new(0.0, 3.0), Complex64::new(0.0, -1.0)];

        let phase = phase_lag(&cs);
        assert_relative_eq!(phase[0], PI / 2.0);
        assert_relative_eq!(phase[1], -PI / 2.0);

        let lag = time_lag(&freq, &cs);
        assert_relative_eq!(lag[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(lag[1], -0.125, epsilon = 1e-12);
    }

    #[test]
    fn test_lag_error() {
        let err = time_lag_error(&[1.0, 1.0, 1.0], &[1.0, 0.5, 0.0], 4);
        assert_relative_eq!(err[0], 0.0);
        assert_relative_eq!(err[1], (0.5f64 / 4.0).sqrt() / (2.0 * PI), epsilon = 1e-12);
        assert!(err[2].is_nan());
    }
}
