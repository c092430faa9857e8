//! Evenly sampled light curves.
//!
//! A light curve is a sequence of photon counts (or fluxes) recorded at
//! uniformly spaced time stamps. For a light curve with `N` samples:
//!
//! ```text
//! time[i] = time[0] + i * dt,  for i = 0, 1, ..., N-1
//! ```
//!
//! Each `counts[i]` is the number of events in the bin that starts at
//! `time[i]`, so `duration()` is `N * dt`, one bin past the last time stamp.

use crate::units::{approx_eq_rel, Seconds};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

/// Relative tolerance on consecutive time spacings.
pub const SPACING_TOLERANCE: f64 = 1e-6;

/// Errors raised while building a light curve.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LightcurveError {
    /// Time and counts arrays differ in length.
    #[error("time has {time} samples but counts has {counts}")]
    LengthMismatch { time: usize, counts: usize },

    /// Not enough samples to define a sampling interval.
    #[error("a light curve needs at least 2 samples, got {0}")]
    TooShort(usize),

    /// Time stamps do not increase strictly.
    #[error("time is not strictly increasing at index {index}")]
    NotIncreasing { index: usize },

    /// Time stamps are not uniformly spaced.
    #[error("time spacing at index {index} is {spacing}, expected {dt}")]
    UnevenSampling { index: usize, spacing: f64, dt: f64 },

    /// A counts value is negative or not finite.
    #[error("invalid counts value {value} at index {index}")]
    InvalidCounts { index: usize, value: f64 },

    /// Sampling interval is zero, negative or not finite.
    #[error("sampling interval must be finite and positive, got {0}")]
    InvalidDt(f64),
}

/// Capability required by the spectral engines: uniform time sampling,
/// a counts array and the sampling interval.
pub trait EvenlySampled {
    /// Bin start times.
    fn time(&self) -> &[f64];

    /// Counts per bin.
    fn counts(&self) -> &[f64];

    /// Sampling interval.
    fn dt(&self) -> Seconds;

    /// Number of samples.
    fn n_samples(&self) -> usize {
        self.counts().len()
    }
}

/// A uniformly sampled light curve.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Lightcurve {
    time: Vec<f64>,
    counts: Vec<f64>,
    dt: Seconds,
}

impl Lightcurve {
    /// Build a light curve from explicit time stamps and counts.
    ///
    /// The sampling interval is taken from the first spacing; every other
    /// spacing must agree with it within [`SPACING_TOLERANCE`].
    pub fn new(time: Vec<f64>, counts: Vec<f64>) -> Result<Self, LightcurveError> {
        if time.len() != counts.len() {
            return Err(LightcurveError::LengthMismatch {
                time: time.len(),
                counts: counts.len(),
            });
        }
        if time.len() < 2 {
            return Err(LightcurveError::TooShort(time.len()));
        }

        let dt = time[1] - time[0];
        if !(dt.is_finite() && dt > 0.0) {
            return Err(LightcurveError::NotIncreasing { index: 1 });
        }

        for (index, pair) in time.windows(2).enumerate().skip(1) {
            let spacing = pair[1] - pair[0];
            if spacing <= 0.0 {
                return Err(LightcurveError::NotIncreasing { index: index + 1 });
            }
            if !approx_eq_rel(spacing, dt, SPACING_TOLERANCE) {
                return Err(LightcurveError::UnevenSampling {
                    index: index + 1,
                    spacing,
                    dt,
                });
            }
        }

        validate_counts(&counts)?;

        Ok(Self {
            time,
            counts,
            dt: Seconds(dt),
        })
    }

    /// Build a light curve from counts, generating the time axis from
    /// `t_start` and `dt`.
    pub fn from_counts(
        counts: Vec<f64>,
        dt: Seconds,
        t_start: Seconds,
    ) -> Result<Self, LightcurveError> {
        if !dt.is_positive_finite() {
            return Err(LightcurveError::InvalidDt(dt.0));
        }
        if counts.len() < 2 {
            return Err(LightcurveError::TooShort(counts.len()));
        }
        validate_counts(&counts)?;

        let time = (0..counts.len())
            .map(|i| t_start.0 + i as f64 * dt.0)
            .collect();

        Ok(Self { time, counts, dt })
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if the light curve is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Bin start times.
    #[inline]
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Counts per bin.
    #[inline]
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Sampling interval.
    #[inline]
    pub fn dt(&self) -> Seconds {
        self.dt
    }

    /// Time of the first bin.
    #[inline]
    pub fn tstart(&self) -> Seconds {
        Seconds(self.time[0])
    }

    /// Total covered time, `N * dt`.
    #[inline]
    pub fn duration(&self) -> Seconds {
        Seconds(self.counts.len() as f64 * self.dt.0)
    }

    /// Total number of photons (sum of counts).
    pub fn n_photons(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Mean counts per bin.
    pub fn mean_counts(&self) -> f64 {
        self.n_photons() / self.counts.len() as f64
    }

    /// Mean count rate in counts per second.
    pub fn mean_rate(&self) -> f64 {
        self.mean_counts() / self.dt.0
    }

    /// Copy out a contiguous range of samples.
    ///
    /// Returns `None` when the range is out of bounds or shorter than two
    /// samples.
    pub fn slice(&self, range: Range<usize>) -> Option<Self> {
        if range.end > self.counts.len() || range.end < range.start + 2 {
            return None;
        }
        Some(Self {
            time: self.time[range.clone()].to_vec(),
            counts: self.counts[range].to_vec(),
            dt: self.dt,
        })
    }
}

impl EvenlySampled for Lightcurve {
    fn time(&self) -> &[f64] {
        &self.time
    }

    fn counts(&self) -> &[f64] {
        &self.counts
    }

    fn dt(&self) -> Seconds {
        self.dt
    }
}

/// Wire shape for deserialization; routed through [`Lightcurve::new`] so
/// every loaded light curve is validated.
#[derive(Deserialize)]
struct RawLightcurve {
    time: Vec<f64>,
    counts: Vec<f64>,
}

impl<'de> Deserialize<'de> for Lightcurve {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawLightcurve::deserialize(deserializer)?;
        Lightcurve::new(raw.time, raw.counts).map_err(serde::de::Error::custom)
    }
}

fn validate_counts(counts: &[f64]) -> Result<(), LightcurveError> {
    match counts
        .iter()
        .position(|&c| !c.is_finite() || c < 0.0)
    {
        Some(index) => Err(LightcurveError::InvalidCounts {
            index,
            value: counts[index],
        }),
        None => Ok(()),
    }
}
