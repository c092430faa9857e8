//! Coherence estimation for averaged cross spectra.
//!
//! The raw estimator `|<C>|^2 / (<P1> <P2>)` over `m` segments is biased
//! upwards: for two incoherent series its expectation is `1/m` rather than
//! 0. For `m >= 2` the returned values use the standard first-order
//! correction
//!
//! ```text
//! gamma2 = (m * raw - 1) / (m - 1)
//! ```
//!
//! which is unbiased for zero intrinsic coherence and leaves a perfectly
//! coherent bin at 1. Negative corrected values are clipped to 0. With a
//! single segment the correction is undefined and the raw values are kept.
//!
//! The uncertainty follows Bendat & Piersol for an `m`-segment average,
//! evaluated on the raw estimate:
//!
//! ```text
//! sigma = sqrt(2 / m) * |1 - raw| * sqrt(raw)
//! ```
//!
//! Every call reports exactly one [`CoherenceNotice`], no matter how many
//! bins were corrected or clipped.

use serde::Serialize;
use std::fmt;

/// Below this many segments the coherence distribution is far from its
/// asymptotic form.
pub const MIN_RELIABLE_SEGMENTS: usize = 50;

/// Diagnostic attached to an averaged coherence estimate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoherenceNotice {
    /// One segment only: no bias correction possible, raw values returned.
    Uncorrected { segments: usize },

    /// Bias correction applied.
    BiasCorrected {
        segments: usize,
        /// Bins whose corrected value was negative and was set to 0.
        clipped_bins: usize,
        /// Fewer than [`MIN_RELIABLE_SEGMENTS`] segments were averaged.
        low_segment_count: bool,
    },
}

impl fmt::Display for CoherenceNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoherenceNotice::Uncorrected { segments } => write!(
                f,
                "coherence from {} segment(s) cannot be bias corrected; \
                 intrinsic coherence is not reliably estimated",
                segments
            ),
            CoherenceNotice::BiasCorrected {
                segments,
                clipped_bins,
                low_segment_count,
            } => {
                write!(f, "coherence bias corrected for {} segments", segments)?;
                if *clipped_bins > 0 {
                    write!(f, ", {} bin(s) clipped to zero", clipped_bins)?;
                }
                if *low_segment_count {
                    write!(
                        f,
                        "; fewer than {} segments, uncertainties may not follow \
                         the expected statistical distribution",
                        MIN_RELIABLE_SEGMENTS
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// Coherence of an averaged cross spectrum.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AveragedCoherence {
    /// Bias-corrected coherence per frequency bin.
    pub coherence: Vec<f64>,

    /// One-sigma uncertainty per frequency bin.
    pub uncertainty: Vec<f64>,

    /// Diagnostics; holds exactly one entry.
    pub notices: Vec<CoherenceNotice>,
}

/// Bias-correct raw coherence values from an `m`-segment average.
pub fn bias_corrected(raw: &[f64], m: usize) -> AveragedCoherence {
    let uncertainty = raw.iter().map(|&g| coherence_uncertainty(g, m)).collect();

    let (coherence, notice) = if m < 2 {
        (raw.to_vec(), CoherenceNotice::Uncorrected { segments: m })
    } else {
        let mf = m as f64;
        let mut clipped_bins = 0;
        let corrected: Vec<f64> = raw
            .iter()
            .map(|&g| {
                let c = (mf * g - 1.0) / (mf - 1.0);
                if c < 0.0 {
                    clipped_bins += 1;
                    0.0
                } else {
                    c
                }
            })
            .collect();
        (
            corrected,
            CoherenceNotice::BiasCorrected {
                segments: m,
                clipped_bins,
                low_segment_count: m < MIN_RELIABLE_SEGMENTS,
            },
        )
    };

    tracing::warn!("{}", notice);

    AveragedCoherence {
        coherence,
        uncertainty,
        notices: vec![notice],
    }
}

fn coherence_uncertainty(raw: f64, m: usize) -> f64 {
    if raw <= 0.0 {
        return 0.0;
    }
    (2.0 / m as f64).sqrt() * (1.0 - raw).abs() * raw.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_segment_left_uncorrected() {
        let raw = [1.0, 0.5, 0.25];
        let result = bias_corrected(&raw, 1);
        assert_eq!(result.coherence, raw.to_vec());
        assert_eq!(result.notices, vec![CoherenceNotice::Uncorrected { segments: 1 }]);
        assert_eq!(result.uncertainty.len(), 3);
        assert_relative_eq!(result.uncertainty[0], 0.0);
    }

    #[test]
    fn test_incoherent_expectation_maps_to_zero() {
        let m = 10;
        let raw = vec![1.0 / m as f64; 4];
        let result = bias_corrected(&raw, m);
        for c in &result.coherence {
            assert_relative_eq!(*c, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_full_coherence_preserved() {
        let result = bias_corrected(&[1.0, 1.0], 100);
        assert_eq!(result.coherence, vec![1.0, 1.0]);
        assert_eq!(
            result.notices,
            vec![CoherenceNotice::BiasCorrected {
                segments: 100,
                clipped_bins: 0,
                low_segment_count: false,
            }]
        );
    }

    #[test]
    fn test_one_notice_for_many_clipped_bins() {
        let raw = vec![0.01; 500];
        let result = bias_corrected(&raw, 8);
        assert!(result.coherence.iter().all(|&c| c == 0.0));
        assert_eq!(result.notices.len(), 1);
        assert_eq!(
            result.notices[0],
            CoherenceNotice::BiasCorrected {
                segments: 8,
                clipped_bins: 500,
                low_segment_count: true,
            }
        );
    }

    #[test]
    fn test_uncertainty_formula() {
        let result = bias_corrected(&[0.64], 32);
        let expected = (2.0f64 / 32.0).sqrt() * 0.36 * 0.8;
        assert_relative_eq!(result.uncertainty[0], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_notice_messages() {
        let text = CoherenceNotice::BiasCorrected {
            segments: 4,
            clipped_bins: 2,
            low_segment_count: true,
        }
        .to_string();
        assert!(text.contains("4 segments"));
        assert!(text.contains("2 bin(s) clipped"));
    }
}
