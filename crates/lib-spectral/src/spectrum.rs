//! Built cross spectra and the per-segment engine behind them.
//!
//! A [`Spectrum`] is the populated form shared by single-segment and
//! averaged cross spectra. Besides the normalized complex cross spectrum it
//! keeps the unnormalized cross product and both auto powers, averaged the
//! same way, so coherence and lags can be derived later without the input
//! light curves.

use crate::error::{SpectralError, SpectralResult};
use crate::fft::{frequency_resolution, positive_bin_count, positive_frequencies, FftEngine};
use crate::norm::Norm;
use crate::rebin;
use lib_types::units::{Hertz, Seconds};
use num_complex::Complex64;

/// A populated cross spectrum.
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrum {
    freq: Vec<f64>,
    cs: Vec<Complex64>,
    cs_err: Vec<f64>,
    df: Hertz,
    dt: Seconds,
    n: usize,
    m: usize,
    nphots1: f64,
    nphots2: f64,
    norm: Norm,
    unnorm_cross: Vec<Complex64>,
    unnorm_power1: Vec<f64>,
    unnorm_power2: Vec<f64>,
}

impl Spectrum {
    /// Positive Fourier frequencies (bin centres).
    pub fn freq(&self) -> &[f64] {
        &self.freq
    }

    /// Normalized complex cross spectrum.
    pub fn cs(&self) -> &[Complex64] {
        &self.cs
    }

    /// Real part of the cross spectrum (the co-spectrum).
    pub fn power(&self) -> Vec<f64> {
        self.cs.iter().map(|c| c.re).collect()
    }

    /// One-sigma uncertainty on `cs`, `|cs| / sqrt(m)` before rebinning.
    pub fn cs_err(&self) -> &[f64] {
        &self.cs_err
    }

    /// Frequency resolution.
    pub fn df(&self) -> Hertz {
        self.df
    }

    /// Sampling interval of the input light curves.
    pub fn dt(&self) -> Seconds {
        self.dt
    }

    /// Number of samples per transform.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of averaged segments.
    pub fn m(&self) -> usize {
        self.m
    }

    /// Photon count of the first series (per-segment mean when averaged).
    pub fn nphots1(&self) -> f64 {
        self.nphots1
    }

    /// Photon count of the second series (per-segment mean when averaged).
    pub fn nphots2(&self) -> f64 {
        self.nphots2
    }

    /// Applied normalization.
    pub fn norm(&self) -> Norm {
        self.norm
    }

    /// Number of frequency bins.
    pub fn len(&self) -> usize {
        self.freq.len()
    }

    /// Check if the spectrum has no bins.
    pub fn is_empty(&self) -> bool {
        self.freq.is_empty()
    }

    /// Unnormalized cross product `<fft1 * conj(fft2)>`.
    pub fn unnorm_cross(&self) -> &[Complex64] {
        &self.unnorm_cross
    }

    /// Unnormalized auto powers `<|fft1|^2>` and `<|fft2|^2>`.
    pub fn unnorm_powers(&self) -> (&[f64], &[f64]) {
        (&self.unnorm_power1, &self.unnorm_power2)
    }

    /// Coherence `|<C>|^2 / (<P1> <P2>)` without bias correction.
    ///
    /// Bins with zero auto power are undefined and come back as NaN. Values
    /// are not clamped to `[0, 1]`.
    pub fn raw_coherence(&self) -> Vec<f64> {
        self.unnorm_cross
            .iter()
            .zip(self.unnorm_power1.iter().zip(&self.unnorm_power2))
            .map(|(cross, (p1, p2))| {
                let denom = p1 * p2;
                if denom > 0.0 {
                    cross.norm_sqr() / denom
                } else {
                    f64::NAN
                }
            })
            .collect()
    }

    /// Coarsen to frequency resolution `df` by overlap-weighted bin means.
    ///
    /// `df` must not be finer than the current resolution. Rebinning to the
    /// current resolution returns an identical spectrum. `m` is unchanged.
    pub fn rebin(&self, df: Hertz) -> SpectralResult<Self> {
        let step = rebin::step_size(self.df, df)?;
        let bins = rebin::output_len(self.len(), step);
        if bins == 0 {
            return Err(SpectralError::InsufficientData { needed: 1, got: 0 });
        }

        let cs = rebin::rebin_mean(&self.cs, step, bins);
        let freq = rebin::bin_centres(self.freq[0] - self.df.0 / 2.0, df, bins);

        tracing::debug!(
            "Rebinned {} bins at {:.6} Hz to {} bins at {:.6} Hz",
            self.len(),
            self.df.0,
            cs.len(),
            df.0
        );

        Ok(Self {
            freq,
            cs,
            cs_err: rebin::rebin_quadrature(&self.cs_err, step, bins),
            df,
            dt: self.dt,
            n: self.n,
            m: self.m,
            nphots1: self.nphots1,
            nphots2: self.nphots2,
            norm: self.norm,
            unnorm_cross: rebin::rebin_mean(&self.unnorm_cross, step, bins),
            unnorm_power1: rebin::rebin_mean(&self.unnorm_power1, step, bins),
            unnorm_power2: rebin::rebin_mean(&self.unnorm_power2, step, bins),
        })
    }
}

/// Unnormalized transform of one segment pair.
pub(crate) struct SegmentSpectrum {
    unnorm_cross: Vec<Complex64>,
    power1: Vec<f64>,
    power2: Vec<f64>,
    nphots1: f64,
    nphots2: f64,
}

/// Compute the raw cross product of two equal-length counts slices.
pub(crate) fn segment_spectrum(
    engine: &mut FftEngine,
    counts1: &[f64],
    counts2: &[f64],
) -> SpectralResult<SegmentSpectrum> {
    let bins = 1..=positive_bin_count(counts1.len());

    let fft1 = engine.rfft(counts1)?;
    let fft2 = engine.rfft(counts2)?;

    Ok(SegmentSpectrum {
        unnorm_cross: fft1[bins.clone()]
            .iter()
            .zip(&fft2[bins.clone()])
            .map(|(a, b)| *a * b.conj())
            .collect(),
        power1: fft1[bins.clone()].iter().map(|c| c.norm_sqr()).collect(),
        power2: fft2[bins].iter().map(|c| c.norm_sqr()).collect(),
        nphots1: counts1.iter().sum(),
        nphots2: counts2.iter().sum(),
    })
}

/// Running sums over segments.
///
/// Segments are folded in as they are produced so only one segment's
/// buffers are alive per worker.
pub(crate) struct SpectrumAccumulator {
    unnorm_cross: Vec<Complex64>,
    power1: Vec<f64>,
    power2: Vec<f64>,
    nphots1: f64,
    nphots2: f64,
    segments: usize,
}

impl SpectrumAccumulator {
    pub(crate) fn new(bins: usize) -> Self {
        Self {
            unnorm_cross: vec![Complex64::new(0.0, 0.0); bins],
            power1: vec![0.0; bins],
            power2: vec![0.0; bins],
            nphots1: 0.0,
            nphots2: 0.0,
            segments: 0,
        }
    }

    pub(crate) fn segments(&self) -> usize {
        self.segments
    }

    pub(crate) fn add(&mut self, segment: SegmentSpectrum) {
        add_into(&mut self.unnorm_cross, &segment.unnorm_cross);
        add_into(&mut self.power1, &segment.power1);
        add_into(&mut self.power2, &segment.power2);
        self.nphots1 += segment.nphots1;
        self.nphots2 += segment.nphots2;
        self.segments += 1;
    }

    pub(crate) fn merge(mut self, other: Self) -> Self {
        add_into(&mut self.unnorm_cross, &other.unnorm_cross);
        add_into(&mut self.power1, &other.power1);
        add_into(&mut self.power2, &other.power2);
        self.nphots1 += other.nphots1;
        self.nphots2 += other.nphots2;
        self.segments += other.segments;
        self
    }

    /// Divide the sums by the segment count and normalize.
    ///
    /// `n` is the number of samples per segment. The normalization factor
    /// uses the mean photon counts per segment, so segments without photons
    /// still contribute to the average.
    pub(crate) fn finish(self, n: usize, dt: Seconds, norm: Norm) -> SpectralResult<Spectrum> {
        let m = self.segments;
        if m == 0 {
            return Err(SpectralError::InsufficientData { needed: 1, got: 0 });
        }
        let scale = 1.0 / m as f64;
        let nphots1 = self.nphots1 * scale;
        let nphots2 = self.nphots2 * scale;
        let factor = norm.factor(n, dt, nphots1, nphots2)?;

        let unnorm_cross: Vec<Complex64> = self.unnorm_cross.into_iter().map(|c| c * scale).collect();
        let cs: Vec<Complex64> = unnorm_cross.iter().map(|&c| c * factor).collect();
        let sqrt_m = (m as f64).sqrt();
        let cs_err = cs.iter().map(|c| c.norm() / sqrt_m).collect();

        Ok(Spectrum {
            freq: positive_frequencies(n, dt),
            cs,
            cs_err,
            df: frequency_resolution(n, dt),
            dt,
            n,
            m,
            nphots1,
            nphots2,
            norm,
            unnorm_cross,
            unnorm_power1: self.power1.into_iter().map(|p| p * scale).collect(),
            unnorm_power2: self.power2.into_iter().map(|p| p * scale).collect(),
        })
    }
}

fn add_into<T: Copy + std::ops::AddAssign>(acc: &mut [T], values: &[T]) {
    for (a, &v) in acc.iter_mut().zip(values) {
        *a += v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn build(counts1: &[f64], counts2: &[f64], dt: f64, norm: Norm) -> Spectrum {
        let mut engine = FftEngine::new();
        let segment = segment_spectrum(&mut engine, counts1, counts2).unwrap();
        let mut acc = SpectrumAccumulator::new(positive_bin_count(counts1.len()));
        acc.add(segment);
        acc.finish(counts1.len(), Seconds(dt), norm).unwrap()
    }

    #[test]
    fn test_layout() {
        let spec = build(&[2.0, 3.0, 2.0, 4.0, 1.0], &[4.0, 8.0, 1.0, 9.0, 11.0], 1.0, Norm::None);
        assert_eq!(spec.len(), 2);
        assert_eq!(spec.cs().len(), 2);
        assert_eq!(spec.m(), 1);
        assert_eq!(spec.n(), 5);
        assert_relative_eq!(spec.df().0, 0.2);
        assert_relative_eq!(spec.freq()[0], 0.2);
        assert_relative_eq!(spec.freq()[1], 0.4);
        assert_relative_eq!(spec.nphots1(), 12.0);
        assert_relative_eq!(spec.nphots2(), 33.0);
    }

    #[test]
    fn test_auto_spectrum_is_real() {
        let counts = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let spec = build(&counts, &counts, 1.0, Norm::None);
        for (c, p) in spec.cs().iter().zip(spec.unnorm_powers().0) {
            assert_relative_eq!(c.im, 0.0, epsilon = 1e-9);
            assert_relative_eq!(c.re, *p, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_normalization_scales_raw_product() {
        let counts1 = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let counts2 = [2.0, 7.0, 1.0, 8.0, 2.0, 8.0, 1.0, 8.0];
        let raw = build(&counts1, &counts2, 0.5, Norm::None);
        let leahy = build(&counts1, &counts2, 0.5, Norm::Leahy);

        let factor = 2.0 / (31.0f64 * 37.0).sqrt();
        for (l, r) in leahy.cs().iter().zip(raw.cs()) {
            assert_relative_eq!(l.re, r.re * factor, epsilon = 1e-12);
            assert_relative_eq!(l.im, r.im * factor, epsilon = 1e-12);
        }
        assert_eq!(leahy.unnorm_cross(), raw.unnorm_cross());
    }

    #[test]
    fn test_single_segment_coherence_is_unity() {
        let spec = build(&[2.0, 3.0, 2.0, 4.0, 1.0], &[4.0, 8.0, 1.0, 9.0, 11.0], 1.0, Norm::None);
        for c in spec.raw_coherence() {
            assert_relative_eq!(c, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_power_bin_is_nan() {
        let spec = build(&[0.0; 6], &[1.0, 2.0, 1.0, 2.0, 1.0, 2.0], 1.0, Norm::None);
        assert!(spec.raw_coherence().iter().all(|c| c.is_nan()));
    }

    #[test]
    fn test_accumulator_mean() {
        let mut engine = FftEngine::new();
        let dt = Seconds(1.0);
        let a = segment_spectrum(&mut engine, &[1.0, 0.0, 2.0, 0.0], &[0.0, 1.0, 0.0, 1.0]).unwrap();
        let b = segment_spectrum(&mut engine, &[3.0, 0.0, 0.0, 1.0], &[1.0, 1.0, 0.0, 2.0]).unwrap();
        let (ca, cb) = (a.unnorm_cross[0], b.unnorm_cross[0]);

        let mut left = SpectrumAccumulator::new(1);
        left.add(a);
        let mut right = SpectrumAccumulator::new(1);
        right.add(b);
        let spec = left.merge(right).finish(4, dt, Norm::None).unwrap();

        assert_eq!(spec.m(), 2);
        assert_relative_eq!(spec.cs()[0].re, (ca.re + cb.re) / 2.0, epsilon = 1e-12);
        assert_relative_eq!(spec.cs()[0].im, (ca.im + cb.im) / 2.0, epsilon = 1e-12);
        assert_relative_eq!(spec.nphots1(), 3.5);
        assert_relative_eq!(spec.cs_err()[0], spec.cs()[0].norm() / 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_empty_segment_normalized_with_mean_photons() {
        let mut engine = FftEngine::new();
        let dt = Seconds(1.0);
        let a = segment_spectrum(&mut engine, &[0.0; 4], &[1.0, 2.0, 1.0, 2.0]).unwrap();
        let b = segment_spectrum(&mut engine, &[3.0, 1.0, 2.0, 2.0], &[1.0, 1.0, 0.0, 2.0]).unwrap();
        let (ca, cb) = (a.unnorm_cross[0], b.unnorm_cross[0]);

        let mut acc = SpectrumAccumulator::new(1);
        acc.add(a);
        acc.add(b);
        let spec = acc.finish(4, dt, Norm::Leahy).unwrap();

        assert_relative_eq!(spec.nphots1(), 4.0);
        assert_relative_eq!(spec.nphots2(), 5.0);
        let factor = 2.0 / (4.0f64 * 5.0).sqrt();
        assert_relative_eq!(spec.cs()[0].re, (ca.re + cb.re) / 2.0 * factor, epsilon = 1e-12);
        assert_relative_eq!(spec.cs()[0].im, (ca.im + cb.im) / 2.0 * factor, epsilon = 1e-12);
    }

    #[test]
    fn test_no_photons_at_all_fails_to_normalize() {
        let mut engine = FftEngine::new();
        let mut acc = SpectrumAccumulator::new(1);
        acc.add(segment_spectrum(&mut engine, &[0.0; 4], &[1.0, 2.0, 1.0, 2.0]).unwrap());
        assert_eq!(
            acc.finish(4, Seconds(1.0), Norm::Frac).unwrap_err(),
            SpectralError::NonPositiveMean {
                nphots1: 0.0,
                nphots2: 6.0
            }
        );
    }
}
