//! # lib-types
//!
//! Core type definitions for cross-spectral timing analysis.
//!
//! This crate provides the foundational types shared across the workspace:
//! - Physical units (`Seconds`, `Hertz`) with compile-time safety
//! - Evenly sampled light curves and the `EvenlySampled` capability trait

pub mod units;
pub mod lightcurve;

pub use units::*;
pub use lightcurve::*;
