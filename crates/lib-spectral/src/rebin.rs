//! Linear frequency rebinning.
//!
//! Original bin `i` covers `[i, i + 1)` in index units and output bin `j`
//! covers `[j * step, (j + 1) * step)`, where `step = df_new / df_old`. Each
//! original bin contributes in proportion to the overlap, so non-integer
//! steps split edge bins between neighbours. A trailing partial output bin
//! is dropped.

use crate::error::{SpectralError, SpectralResult};
use lib_types::units::{approx_eq_rel, Hertz};
use std::ops::{Add, Mul};

/// Tolerance under which a requested resolution counts as the current one.
const SAME_RESOLUTION_TOLERANCE: f64 = 1e-10;

/// Overlaps smaller than this (in bins) come from float round-off.
const MIN_WEIGHT: f64 = 1e-9;

/// Ratio of the new to the current resolution.
///
/// Fails when the new resolution is finer than the current one; equal
/// resolutions (within round-off) give exactly 1.
pub fn step_size(current: Hertz, requested: Hertz) -> SpectralResult<f64> {
    if approx_eq_rel(current.0, requested.0, SAME_RESOLUTION_TOLERANCE) {
        return Ok(1.0);
    }
    if !(requested.0 > current.0) {
        return Err(SpectralError::RebinToFinerResolution {
            requested: requested.0,
            current: current.0,
        });
    }
    Ok(requested.0 / current.0)
}

/// Number of complete output bins.
pub fn output_len(len: usize, step: f64) -> usize {
    if !step.is_finite() {
        return 0;
    }
    (len as f64 / step + MIN_WEIGHT).floor() as usize
}

/// Centres of `bins` output bins of width `df`, starting at `lower_edge`.
pub fn bin_centres(lower_edge: f64, df: Hertz, bins: usize) -> Vec<f64> {
    (0..bins)
        .map(|j| lower_edge + (j as f64 + 0.5) * df.0)
        .collect()
}

/// Overlap-weighted mean of `values` into `bins` output bins.
pub fn rebin_mean<T>(values: &[T], step: f64, bins: usize) -> Vec<T>
where
    T: Copy + Default + Add<Output = T> + Mul<f64, Output = T>,
{
    (0..bins)
        .map(|j| {
            let total = overlaps(j, step, values.len())
                .fold(T::default(), |acc, (i, w)| acc + values[i] * w);
            total * (1.0 / step)
        })
        .collect()
}

/// Propagate independent one-sigma errors through [`rebin_mean`].
pub fn rebin_quadrature(errors: &[f64], step: f64, bins: usize) -> Vec<f64> {
    (0..bins)
        .map(|j| {
            let sum_sq: f64 = overlaps(j, step, errors.len())
                .map(|(i, w)| (errors[i] * w).powi(2))
                .sum();
            sum_sq.sqrt() / step
        })
        .collect()
}

/// Original bins overlapping output bin `j`, with their overlap in bins.
fn overlaps(j: usize, step: f64, len: usize) -> impl Iterator<Item = (usize, f64)> {
    let lo = j as f64 * step;
    let hi = lo + step;
    let first = lo.floor() as usize;
    let last = (hi.ceil() as usize).min(len);

    (first..last).filter_map(move |i| {
        let weight = hi.min((i + 1) as f64) - lo.max(i as f64);
        (weight > MIN_WEIGHT).then_some((i, weight))
    })
}
