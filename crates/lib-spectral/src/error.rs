//! Error types for spectral operations.

use lib_types::LightcurveError;
use thiserror::Error;

/// Errors that can occur while building or transforming spectra.
///
/// Every variant is a usage error detected before any result is built.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpectralError {
    /// Exactly zero or two light curves are required.
    #[error("a cross spectrum needs zero or two light curves, got {0}")]
    ArityMismatch(usize),

    /// The two counts arrays differ in length.
    #[error("light curves have different lengths: {left} vs {right}")]
    CountsShapeMismatch { left: usize, right: usize },

    /// The two light curves have different sampling intervals.
    #[error("light curves have different time resolution: {left} s vs {right} s")]
    SamplingMismatch { left: f64, right: f64 },

    /// Unknown normalization name.
    #[error("unknown normalization '{0}', expected one of leahy, frac, abs, none")]
    InvalidNorm(String),

    /// Segment size is zero, negative or not finite.
    #[error("segment size must be finite and positive, got {0}")]
    InvalidSegmentSize(f64),

    /// The segment size does not fit into the data even once.
    #[error("segment size {segment_size} s yields no segments from {duration} s of data")]
    NoSegments { segment_size: f64, duration: f64 },

    /// Averaging over several pairs needs as many first as second light curves.
    #[error("got {left} first light curves but {right} second light curves")]
    PairCountMismatch { left: usize, right: usize },

    /// Rebinning can only coarsen the frequency resolution.
    #[error("new frequency resolution {requested} Hz is finer than current {current} Hz")]
    RebinToFinerResolution { requested: f64, current: f64 },

    /// The operation needs a built spectrum.
    #[error("cross spectrum is empty")]
    EmptySpectrum,

    /// Insufficient data for operation.
    #[error("Insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Leahy-type normalizations divide by the photon counts.
    #[error("mean count rate is not positive ({nphots1} and {nphots2} photons)")]
    NonPositiveMean { nphots1: f64, nphots2: f64 },

    /// Invalid light curve input.
    #[error(transparent)]
    Lightcurve(#[from] LightcurveError),

    /// Numerical instability detected.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

/// Result type for spectral operations.
pub type SpectralResult<T> = Result<T, SpectralError>;
