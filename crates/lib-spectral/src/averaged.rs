//! Segment-averaged cross spectra.
//!
//! Each light curve pair is cut into consecutive, non-overlapping segments
//! of `segment_size` seconds starting at the first sample; a trailing
//! partial segment is dropped. The raw cross products and auto powers of
//! all segments are averaged bin by bin and the normalization is applied
//! once, with the mean photon counts per segment; a segment without photons
//! therefore still enters the average. With several pairs the segments of
//! all pairs enter the same average.
//!
//! Segments are independent, so they are processed on the rayon pool. Each
//! worker folds its segments into one running sum and the sums are merged
//! at the end, which keeps memory at one accumulator per worker regardless
//! of the segment count.

use crate::coherence::{self, AveragedCoherence};
use crate::error::{SpectralError, SpectralResult};
use crate::fft::{positive_bin_count, FftEngine};
use crate::lags::{self, TimeLag};
use crate::norm::Norm;
use crate::spectrum::{segment_spectrum, Spectrum, SpectrumAccumulator};
use crate::validate;
use lib_types::lightcurve::EvenlySampled;
use lib_types::units::{Hertz, Seconds};
use num_complex::Complex64;
use rayon::prelude::*;

/// Slack, in samples, on `segment_size / dt` so a whole number of bins is
/// not lost to round-down.
const SEGMENT_BINS_SLACK: f64 = 1e-6;

/// Averaged spectrum together with the segment length that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct AveragedSpectrum {
    pub spectrum: Spectrum,
    pub segment_size: Seconds,
}

/// Cross spectrum averaged over fixed-length segments.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum AveragedCrossSpectrum {
    #[default]
    Unbuilt,
    Built(AveragedSpectrum),
}

impl AveragedCrossSpectrum {
    /// Create an empty placeholder.
    pub fn new() -> Self {
        Self::Unbuilt
    }

    /// Average the cross spectrum of one pair over segments of
    /// `segment_size`.
    pub fn from_lightcurves<L>(
        lc1: &L,
        lc2: &L,
        segment_size: Seconds,
        norm: Norm,
    ) -> SpectralResult<Self>
    where
        L: EvenlySampled + Sync,
    {
        Self::from_lightcurve_pairs(
            std::slice::from_ref(lc1),
            std::slice::from_ref(lc2),
            segment_size,
            norm,
        )
    }

    /// Build from zero or two light curves.
    pub fn from_optional<L>(
        lc1: Option<&L>,
        lc2: Option<&L>,
        segment_size: Seconds,
        norm: Norm,
    ) -> SpectralResult<Self>
    where
        L: EvenlySampled + Sync,
    {
        match validate::resolve_pair(lc1, lc2)? {
            Some((a, b)) => Self::from_lightcurves(a, b, segment_size, norm),
            None => Ok(Self::Unbuilt),
        }
    }

    /// Average over the segments of several pairs, pairing `lcs1[i]` with
    /// `lcs2[i]`.
    ///
    /// All pairs must share one sampling interval. `m` of the result is the
    /// total number of segments.
    pub fn from_lightcurve_pairs<L>(
        lcs1: &[L],
        lcs2: &[L],
        segment_size: Seconds,
        norm: Norm,
    ) -> SpectralResult<Self>
    where
        L: EvenlySampled + Sync,
    {
        if lcs1.len() != lcs2.len() {
            return Err(SpectralError::PairCountMismatch {
                left: lcs1.len(),
                right: lcs2.len(),
            });
        }
        let Some(first) = lcs1.first() else {
            return Err(SpectralError::InsufficientData { needed: 1, got: 0 });
        };

        let dt = first.dt();
        for (lc1, lc2) in lcs1.iter().zip(lcs2) {
            validate::check_pair(lc1, lc2)?;
            validate::check_sampling(dt, lc1.dt())?;
        }
        validate::check_segment_size(segment_size)?;

        let n = samples_per_segment(segment_size, dt);
        validate::check_transform_length(n)?;

        let work: Vec<(usize, usize)> = lcs1
            .iter()
            .enumerate()
            .flat_map(|(pair, lc)| {
                (0..lc.n_samples() / n).map(move |segment| (pair, segment * n))
            })
            .collect();

        if work.is_empty() {
            let duration = lcs1
                .iter()
                .map(|lc| lc.n_samples() as f64 * dt.0)
                .fold(0.0, f64::max);
            return Err(SpectralError::NoSegments {
                segment_size: segment_size.0,
                duration,
            });
        }

        let bins = positive_bin_count(n);
        let acc = work
            .into_par_iter()
            .map_init(FftEngine::new, |engine, (pair, start)| {
                let range = start..start + n;
                segment_spectrum(
                    engine,
                    &lcs1[pair].counts()[range.clone()],
                    &lcs2[pair].counts()[range],
                )
            })
            .try_fold(
                || SpectrumAccumulator::new(bins),
                |mut acc, segment| {
                    acc.add(segment?);
                    Ok::<_, SpectralError>(acc)
                },
            )
            .try_reduce(|| SpectrumAccumulator::new(bins), |a, b| Ok(a.merge(b)))?;

        tracing::debug!(
            "Averaged cross spectrum: {} pair(s), {} segment(s) of {} samples, norm={}",
            lcs1.len(),
            acc.segments(),
            n,
            norm
        );

        let spectrum = acc.finish(n, dt, norm)?;
        Ok(Self::Built(AveragedSpectrum {
            spectrum,
            segment_size,
        }))
    }

    /// Like [`AveragedCrossSpectrum::from_lightcurves`], parsing the
    /// normalization name once the pair itself has been checked.
    pub fn with_norm_name<L>(
        lc1: &L,
        lc2: &L,
        segment_size: Seconds,
        norm: &str,
    ) -> SpectralResult<Self>
    where
        L: EvenlySampled + Sync,
    {
        validate::check_pair(lc1, lc2)?;
        let norm = norm.parse()?;
        Self::from_lightcurves(lc1, lc2, segment_size, norm)
    }

    pub fn averaged(&self) -> Option<&AveragedSpectrum> {
        match self {
            Self::Unbuilt => None,
            Self::Built(averaged) => Some(averaged),
        }
    }

    /// The populated spectrum, if any.
    pub fn spectrum(&self) -> Option<&Spectrum> {
        self.averaged().map(|a| &a.spectrum)
    }

    fn built(&self) -> SpectralResult<&AveragedSpectrum> {
        self.averaged().ok_or(SpectralError::EmptySpectrum)
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

    pub fn segment_size(&self) -> Option<Seconds> {
        self.averaged().map(|a| a.segment_size)
    }

    /// Number of averaged segments; 1 for an unbuilt placeholder.
    pub fn m(&self) -> usize {
        self.spectrum().map_or(1, Spectrum::m)
    }

    /// Rebin to a coarser frequency resolution, returning a new spectrum.
    pub fn rebin(&self, df: Hertz) -> SpectralResult<Self> {
        let averaged = self.built()?;
        Ok(Self::Built(AveragedSpectrum {
            spectrum: averaged.spectrum.rebin(df)?,
            segment_size: averaged.segment_size,
        }))
    }

    /// Bias-corrected coherence with uncertainties.
    ///
    /// The result always carries exactly one notice describing the
    /// correction, which is also logged once at warn level.
    pub fn coherence(&self) -> SpectralResult<AveragedCoherence> {
        let spectrum = &self.built()?.spectrum;
        Ok(coherence::bias_corrected(&spectrum.raw_coherence(), spectrum.m()))
    }

    /// Phase lag per frequency bin, in radians.
    pub fn phase_lag(&self) -> SpectralResult<Vec<f64>> {
        Ok(lags::phase_lag(self.built()?.spectrum.cs()))
    }

    /// Time lag per frequency bin with its uncertainty.
    pub fn time_lag(&self) -> SpectralResult<TimeLag> {
        let spectrum = &self.built()?.spectrum;
        Ok(TimeLag {
            lag: lags::time_lag(spectrum.freq(), spectrum.cs()),
            error: lags::time_lag_error(spectrum.freq(), &spectrum.raw_coherence(), spectrum.m()),
        })
    }
}

/// Whole samples in one segment.
fn samples_per_segment(segment_size: Seconds, dt: Seconds) -> usize {
    (segment_size / dt + SEGMENT_BINS_SLACK).floor() as usize
}
