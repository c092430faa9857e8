//! Single-segment cross spectrum of two light curves.

use crate::error::{SpectralError, SpectralResult};
use crate::fft::{positive_bin_count, FftEngine};
use crate::lags;
use crate::norm::Norm;
use crate::spectrum::{segment_spectrum, Spectrum, SpectrumAccumulator};
use crate::validate;
use lib_types::lightcurve::EvenlySampled;
use lib_types::units::Hertz;
use num_complex::Complex64;

/// Cross spectrum `fft1 * conj(fft2)` of one pair of light curves.
///
/// `Unbuilt` is the placeholder made without inputs; every spectral
/// accessor returns `None` for it and `m()` is 1.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CrossSpectrum {
    #[default]
    Unbuilt,
    Built(Spectrum),
}

impl CrossSpectrum {
    /// Create an empty placeholder.
    pub fn new() -> Self {
        Self::Unbuilt
    }

    /// Cross spectrum of two light curves over their full length.
    ///
    /// # Example
    ///
    /// ```
    /// use lib_spectral::{CrossSpectrum, Norm};
    /// use lib_types::Lightcurve;
    ///
    /// let lc1 = Lightcurve::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![2.0, 3.0, 2.0, 4.0, 1.0]).unwrap();
    /// let lc2 = Lightcurve::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![4.0, 8.0, 1.0, 9.0, 11.0]).unwrap();
    /// let cs = CrossSpectrum::from_lightcurves(&lc1, &lc2, Norm::Leahy).unwrap();
    /// assert_eq!(cs.freq().map(|f| f.len()), Some(2));
    /// ```
    pub fn from_lightcurves<L: EvenlySampled>(lc1: &L, lc2: &L, norm: Norm) -> SpectralResult<Self> {
        validate::check_pair(lc1, lc2)?;
        let n = lc1.n_samples();
        validate::check_transform_length(n)?;

        let dt = lc1.dt();
        let mut engine = FftEngine::new();
        let segment = segment_spectrum(&mut engine, lc1.counts(), lc2.counts())?;

        let mut acc = SpectrumAccumulator::new(positive_bin_count(n));
        acc.add(segment);
        let spectrum = acc.finish(n, dt, norm)?;

        tracing::debug!(
            "Cross spectrum: n={}, df={:.6} Hz, {} bins, norm={}",
            n,
            spectrum.df().0,
            spectrum.len(),
            norm
        );

        Ok(Self::Built(spectrum))
    }

    /// Build from zero or two light curves.
    ///
    /// Both absent gives [`CrossSpectrum::Unbuilt`]; exactly one present is
    /// an [`SpectralError::ArityMismatch`].
    pub fn from_optional<L: EvenlySampled>(
        lc1: Option<&L>,
        lc2: Option<&L>,
        norm: Norm,
    ) -> SpectralResult<Self> {
        match validate::resolve_pair(lc1, lc2)? {
            Some((a, b)) => Self::from_lightcurves(a, b, norm),
            None => Ok(Self::Unbuilt),
        }
    }

    /// Like [`CrossSpectrum::from_lightcurves`], parsing the normalization
    /// name once the pair itself has been checked.
    pub fn with_norm_name<L: EvenlySampled>(lc1: &L, lc2: &L, norm: &str) -> SpectralResult<Self> {
        validate::check_pair(lc1, lc2)?;
        let norm = norm.parse()?;
        Self::from_lightcurves(lc1, lc2, norm)
    }

    /// The populated spectrum, if any.
    pub fn spectrum(&self) -> Option<&Spectrum> {
        match self {
            Self::Unbuilt => None,
            Self::Built(spectrum) => Some(spectrum),
        }
    }

    fn built(&self) -> SpectralResult<&Spectrum> {
        self.spectrum().ok_or(SpectralError::EmptySpectrum)
    }

    pub fn freq(&self) -> Option<&[f64]> {
        self.spectrum().map(Spectrum::freq)
    }

    pub fn cs(&self) -> Option<&[Complex64]> {
        self.spectrum().map(Spectrum::cs)
    }

    pub fn df(&self) -> Option<Hertz> {
        self.spectrum().map(Spectrum::df)
    }

    pub fn n(&self) -> Option<usize> {
        self.spectrum().map(Spectrum::n)
    }

    pub fn nphots1(&self) -> Option<f64> {
        self.spectrum().map(Spectrum::nphots1)
    }

    pub fn nphots2(&self) -> Option<f64> {
        self.spectrum().map(Spectrum::nphots2)
    }

    pub fn norm(&self) -> Option<Norm> {
        self.spectrum().map(Spectrum::norm)
    }

    /// Number of averaged spectra; 1 for an unbuilt placeholder.
    pub fn m(&self) -> usize {
        self.spectrum().map_or(1, Spectrum::m)
    }

    /// Rebin to a coarser frequency resolution, returning a new spectrum.
    pub fn rebin(&self, df: Hertz) -> SpectralResult<Self> {
        Ok(Self::Built(self.built()?.rebin(df)?))
    }

    /// Coherence `|C|^2 / (P1 P2)` per frequency bin.
    ///
    /// With a single segment this is 1 up to round-off in every bin where
    /// both powers are non-zero; it becomes informative after rebinning,
    /// which averages neighbouring bins. No clamping is applied.
    pub fn coherence(&self) -> SpectralResult<Vec<f64>> {
        Ok(self.built()?.raw_coherence())
    }

    /// Phase lag per frequency bin, in radians.
    pub fn phase_lag(&self) -> SpectralResult<Vec<f64>> {
        Ok(lags::phase_lag(self.built()?.cs()))
    }

    /// Time lag per frequency bin, in seconds.
    pub fn time_lag(&self) -> SpectralResult<Vec<f64>> {
        let spectrum = self.built()?;
        Ok(lags::time_lag(spectrum.freq(), spectrum.cs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lib_types::{Lightcurve, Seconds};

    fn pair() -> (Lightcurve, Lightcurve) {
        let time = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        (
            Lightcurve::new(time.clone(), vec![2.0, 3.0, 2.0, 4.0, 1.0]).unwrap(),
            Lightcurve::new(time, vec![4.0, 8.0, 1.0, 9.0, 11.0]).unwrap(),
        )
    }

    #[test]
    fn test_make_empty_crossspectrum() {
        let cs = CrossSpectrum::new();
        assert!(cs.freq().is_none());
        assert!(cs.cs().is_none());
        assert!(cs.df().is_none());
        assert!(cs.nphots1().is_none());
        assert!(cs.nphots2().is_none());
        assert!(cs.n().is_none());
        assert!(cs.norm().is_none());
        assert_eq!(cs.m(), 1);
        assert_eq!(cs, CrossSpectrum::default());
    }

    #[test]
    fn test_from_optional() {
        let (lc1, lc2) = pair();
        assert_eq!(
            CrossSpectrum::from_optional::<Lightcurve>(None, None, Norm::None).unwrap(),
            CrossSpectrum::Unbuilt
        );
        assert_eq!(
            CrossSpectrum::from_optional(Some(&lc1), None, Norm::None).unwrap_err(),
            SpectralError::ArityMismatch(1)
        );
        assert!(CrossSpectrum::from_optional(Some(&lc1), Some(&lc2), Norm::None)
            .unwrap()
            .spectrum()
            .is_some());
    }

    #[test]
    fn test_coherence_short_series() {
        let (lc1, lc2) = pair();
        let cs = CrossSpectrum::from_lightcurves(&lc1, &lc2, Norm::None).unwrap();
        let coh = cs.coherence().unwrap();
        assert_eq!(coh.len(), 2);
        // Without averaging |C|^2 == P1 * P2 in every bin, so the coherence
        // is 1 up to round-off (here [1.0, 1.0000000000000002]). A strict
        // `mean < 1` bound cannot hold for a single segment; the bound below
        // is the exact value plus float tolerance.
        let mean = coh.iter().sum::<f64>() / coh.len() as f64;
        assert_relative_eq!(mean, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_norm_name_parsing() {
        let (lc1, lc2) = pair();
        let cs = CrossSpectrum::with_norm_name(&lc1, &lc2, "LEAHY").unwrap();
        assert_eq!(cs.norm(), Some(Norm::Leahy));
        assert_eq!(
            CrossSpectrum::with_norm_name(&lc1, &lc2, "frabs").unwrap_err(),
            SpectralError::InvalidNorm("frabs".to_string())
        );
    }

    #[test]
    fn test_pair_checked_before_norm_name() {
        let (lc1, _) = pair();
        let longer = Lightcurve::from_counts(vec![1.0; 6], Seconds(1.0), Seconds(1.0)).unwrap();
        assert_eq!(
            CrossSpectrum::with_norm_name(&lc1, &longer, "frabs").unwrap_err(),
            SpectralError::CountsShapeMismatch { left: 5, right: 6 }
        );
    }

    #[test]
    fn test_too_short() {
        let lc = Lightcurve::from_counts(vec![1.0, 2.0], Seconds(1.0), Seconds::ZERO).unwrap();
        assert_eq!(
            CrossSpectrum::from_lightcurves(&lc, &lc, Norm::None).unwrap_err(),
            SpectralError::InsufficientData { needed: 3, got: 2 }
        );
    }

    #[test]
    fn test_unbuilt_operations_fail() {
        let cs = CrossSpectrum::new();
        assert_eq!(cs.rebin(Hertz(1.0)).unwrap_err(), SpectralError::EmptySpectrum);
        assert_eq!(cs.coherence().unwrap_err(), SpectralError::EmptySpectrum);
        assert_eq!(cs.time_lag().unwrap_err(), SpectralError::EmptySpectrum);
    }

    #[test]
    fn test_delayed_copy_lag() {
        // A sinusoid and the same sinusoid delayed by 2 samples.
        let n = 64;
        let dt = Seconds(0.25);
        let period_bins = 16.0;
        let wave = |shift: f64| -> Vec<f64> {
            (0..n)
                .map(|i| {
                    10.0 + (2.0 * std::f64::consts::PI * (i as f64 - shift) / period_bins).sin()
                })
                .collect()
        };
        let lead = Lightcurve::from_counts(wave(0.0), dt, Seconds::ZERO).unwrap();
        let lag = Lightcurve::from_counts(wave(2.0), dt, Seconds::ZERO).unwrap();

        let cs = CrossSpectrum::from_lightcurves(&lead, &lag, Norm::None).unwrap();
        let k = (n as f64 / period_bins) as usize - 1;
        let time_lag = cs.time_lag().unwrap();
        assert_relative_eq!(time_lag[k], 2.0 * dt.0, epsilon = 1e-9);
        assert_relative_eq!(cs.phase_lag().unwrap()[k], std::f64::consts::PI / 4.0, epsilon = 1e-9);
    }
}
