//! Cross-spectrum normalizations.
//!
//! All factors are real and are applied to the complex product
//! `fft1 * conj(fft2)`. With `N` the (mean) photon count of a segment, `n` its
//! number of bins, `M = N / n` the mean counts per bin and `R = M / dt` the
//! mean rate, the cross-spectral versions use geometric means of the two
//! series:
//!
//! | norm  | factor                                  |
//! |-------|-----------------------------------------|
//! | none  | 1                                       |
//! | leahy | `2 / sqrt(N1 * N2)`                     |
//! | frac  | leahy / `sqrt(R1 * R2)` = `2 dt / (n M1 M2)` |
//! | abs   | leahy * `sqrt(R1 * R2)` = `2 / (n dt)`  |
//!
//! Leahy makes pure Poisson noise average 2 in an auto spectrum; frac gives
//! (rms/mean)^2 per Hz and abs gives rms^2 per Hz in count-rate units.

use crate::error::{SpectralError, SpectralResult};
use lib_types::units::Seconds;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalization convention applied to a cross spectrum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    /// Raw `fft1 * conj(fft2)`.
    #[default]
    None,
    /// Leahy normalization.
    Leahy,
    /// Fractional rms-squared normalization.
    Frac,
    /// Absolute rms-squared normalization.
    Abs,
}

impl Norm {
    /// All accepted modes.
    pub const ALL: [Norm; 4] = [Norm::None, Norm::Leahy, Norm::Frac, Norm::Abs];

    /// Lowercase name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Norm::None => "none",
            Norm::Leahy => "leahy",
            Norm::Frac => "frac",
            Norm::Abs => "abs",
        }
    }

    /// Scale factor for segments of `n` samples.
    ///
    /// `nphots1`/`nphots2` are the photon counts of the two series per
    /// segment, averaged over segments when several are combined.
    pub fn factor(&self, n: usize, dt: Seconds, nphots1: f64, nphots2: f64) -> SpectralResult<f64> {
        if *self == Norm::None {
            return Ok(1.0);
        }

        let photons = nphots1 * nphots2;
        if !(photons > 0.0) {
            return Err(SpectralError::NonPositiveMean { nphots1, nphots2 });
        }

        let n = n as f64;
        let factor = match self {
            Norm::None => 1.0,
            Norm::Leahy => 2.0 / photons.sqrt(),
            Norm::Frac => {
                let mean1 = nphots1 / n;
                let mean2 = nphots2 / n;
                2.0 * dt.0 / (n * mean1 * mean2)
            }
            Norm::Abs => 2.0 / (n * dt.0),
        };
        Ok(factor)
    }
}

impl fmt::Display for Norm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Norm {
    type Err = SpectralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Norm::None),
            "leahy" => Ok(Norm::Leahy),
            "frac" => Ok(Norm::Frac),
            "abs" => Ok(Norm::Abs),
            _ => Err(SpectralError::InvalidNorm(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("Leahy".parse::<Norm>().unwrap(), Norm::Leahy);
        assert_eq!("FRAC".parse::<Norm>().unwrap(), Norm::Frac);
        assert_eq!("abs".parse::<Norm>().unwrap(), Norm::Abs);
        assert_eq!("None".parse::<Norm>().unwrap(), Norm::None);
        assert_eq!(Norm::default(), Norm::None);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(
            "frabs".parse::<Norm>(),
            Err(SpectralError::InvalidNorm("frabs".to_string()))
        );
        assert!("".parse::<Norm>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for norm in Norm::ALL {
            assert_eq!(norm.to_string().parse::<Norm>().unwrap(), norm);
        }
    }

    #[test]
    fn test_factor_relations() {
        let n = 1000;
        let dt = Seconds(0.01);
        let (n1, n2) = (400.0, 900.0);

        let leahy = Norm::Leahy.factor(n, dt, n1, n2).unwrap();
        let frac = Norm::Frac.factor(n, dt, n1, n2).unwrap();
        let abs = Norm::Abs.factor(n, dt, n1, n2).unwrap();

        assert_relative_eq!(leahy, 2.0 / 600.0, epsilon = 1e-15);

        let rate1 = n1 / n as f64 / dt.0;
        let rate2 = n2 / n as f64 / dt.0;
        let mean_rate = (rate1 * rate2).sqrt();
        assert_relative_eq!(frac, leahy / mean_rate, max_relative = 1e-12);
        assert_relative_eq!(abs, leahy * mean_rate, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_photons_rejected() {
        let err = Norm::Leahy.factor(10, Seconds(1.0), 0.0, 5.0).unwrap_err();
        assert!(matches!(err, SpectralError::NonPositiveMean { .. }));
        assert_eq!(Norm::None.factor(10, Seconds(1.0), 0.0, 0.0).unwrap(), 1.0);
    }
}
