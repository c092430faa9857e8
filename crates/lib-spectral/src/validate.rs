//! Input validation for cross-spectral construction.
//!
//! Checks run in a fixed order (arity, shape, sampling, segment size) and
//! all of them complete before any transform is computed.

use crate::error::{SpectralError, SpectralResult};
use lib_types::lightcurve::EvenlySampled;
use lib_types::units::{approx_eq_rel, Seconds};

/// Relative tolerance when comparing sampling intervals.
pub const DT_TOLERANCE: f64 = 1e-6;

/// Check if two time steps are compatible (within tolerance).
#[inline]
pub fn are_compatible_dt(dt1: Seconds, dt2: Seconds, relative_tolerance: f64) -> bool {
    approx_eq_rel(dt1.0, dt2.0, relative_tolerance)
}

/// Resolve an optional pair of light curves.
///
/// Returns `Ok(None)` when both are absent and the pair when both are
/// present; a lone light curve is an arity error.
pub fn resolve_pair<'a, L: EvenlySampled>(
    lc1: Option<&'a L>,
    lc2: Option<&'a L>,
) -> SpectralResult<Option<(&'a L, &'a L)>> {
    match (lc1, lc2) {
        (None, None) => Ok(None),
        (Some(a), Some(b)) => Ok(Some((a, b))),
        _ => Err(SpectralError::ArityMismatch(1)),
    }
}

/// Check that two light curves can be cross-correlated bin by bin.
pub fn check_pair<L: EvenlySampled>(lc1: &L, lc2: &L) -> SpectralResult<()> {
    let (n1, n2) = (lc1.n_samples(), lc2.n_samples());
    if n1 != n2 {
        return Err(SpectralError::CountsShapeMismatch { left: n1, right: n2 });
    }

    check_sampling(lc1.dt(), lc2.dt())
}

/// Check that two sampling intervals agree.
pub fn check_sampling(dt1: Seconds, dt2: Seconds) -> SpectralResult<()> {
    if !are_compatible_dt(dt1, dt2, DT_TOLERANCE) {
        return Err(SpectralError::SamplingMismatch {
            left: dt1.0,
            right: dt2.0,
        });
    }
    Ok(())
}

/// Check an averaging segment length.
pub fn check_segment_size(segment_size: Seconds) -> SpectralResult<()> {
    if !segment_size.is_positive_finite() {
        return Err(SpectralError::InvalidSegmentSize(segment_size.0));
    }
    Ok(())
}

/// Check that a transform of `n` samples has at least one positive
/// frequency below Nyquist.
pub fn check_transform_length(n: usize) -> SpectralResult<()> {
    if n < 3 {
        return Err(SpectralError::InsufficientData { needed: 3, got: n });
    }
    Ok(())
}
