//! # lib-spectral
//!
//! Cross-spectral timing engine for evenly sampled light curves.
//!
//! This crate provides the Fourier-domain core of the workspace:
//!
//! - **Cross spectra**: `fft1 * conj(fft2)` of two light curves, kept complex
//! - **Normalization**: none, Leahy, fractional rms and absolute rms
//! - **Segment averaging**: fixed-length segments over one or many pairs, in parallel with Rayon
//! - **Rebinning**: overlap-weighted linear rebinning with error propagation
//! - **Coherence**: raw and bias-corrected estimates with uncertainties
//! - **Lags**: phase and time lags between the two series

pub mod error;
pub mod fft;
pub mod norm;
pub mod validate;
pub mod spectrum;
pub mod rebin;
pub mod crossspectrum;
pub mod averaged;
pub mod coherence;
pub mod lags;

pub use error::{SpectralError, SpectralResult};
pub use fft::FftEngine;
pub use norm::Norm;
pub use spectrum::Spectrum;
pub use crossspectrum::CrossSpectrum;
pub use averaged::{AveragedCrossSpectrum, AveragedSpectrum};
pub use coherence::{AveragedCoherence, CoherenceNotice};
pub use lags::TimeLag;
