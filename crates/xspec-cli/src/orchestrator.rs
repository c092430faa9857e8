//! Run orchestration.

use crate::config::RunConfig;
use crate::loader::load_lightcurve;
use anyhow::{Context, Result};
use lib_spectral::{AveragedCrossSpectrum, CoherenceNotice, CrossSpectrum, Norm, Spectrum};
use lib_types::units::Seconds;
use lib_types::Lightcurve;

/// Results of one run, ready for output.
#[derive(Clone, Debug)]
pub struct RunResults {
    pub name: String,
    pub norm: Norm,
    pub pairs: usize,
    pub segment_size: Option<Seconds>,
    pub spectrum: Spectrum,
    pub coherence: Option<Vec<f64>>,
    pub uncertainty: Option<Vec<f64>>,
    pub notices: Vec<CoherenceNotice>,
    pub lag: Option<Vec<f64>>,
    pub lag_error: Option<Vec<f64>>,
}

/// Run orchestrator.
pub struct Orchestrator {
    config: RunConfig,
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(config: RunConfig) -> Result<Self> {
        Ok(Self { config })
    }

    /// Load every pair and compute the configured products.
    pub fn run(&self) -> Result<RunResults> {
        tracing::info!("Starting run: {}", self.config.name);

        let (lcs1, lcs2) = self.load_pairs()?;
        self.compute(&lcs1, &lcs2)
    }

    fn load_pairs(&self) -> Result<(Vec<Lightcurve>, Vec<Lightcurve>)> {
        let mut lcs1 = Vec::with_capacity(self.config.pairs.len());
        let mut lcs2 = Vec::with_capacity(self.config.pairs.len());
        for pair in &self.config.pairs {
            lcs1.push(load_lightcurve(&pair.lc1)?);
            lcs2.push(load_lightcurve(&pair.lc2)?);
        }
        Ok((lcs1, lcs2))
    }

    /// Compute spectrum, coherence and lags from loaded light curves.
    pub fn compute(&self, lcs1: &[Lightcurve], lcs2: &[Lightcurve]) -> Result<RunResults> {
        let norm = self.config.norm()?;
        let output = &self.config.output;

        let mut coherence = None;
        let mut uncertainty = None;
        let mut notices = Vec::new();
        let mut lag = None;
        let mut lag_error = None;

        let spectrum = match self.config.segment_size() {
            Some(segment_size) => {
                let mut cs = AveragedCrossSpectrum::from_lightcurve_pairs(lcs1, lcs2, segment_size, norm)
                    .context("Failed to build averaged cross spectrum")?;
                if let Some(df) = self.config.rebin_df() {
                    cs = cs
                        .rebin(df)
                        .with_context(|| format!("Failed to rebin to {} Hz", df.0))?;
                }
                tracing::info!("Averaged {} segment(s) of {} s", cs.m(), segment_size.0);

                if output.coherence {
                    let coh = cs.coherence()?;
                    coherence = Some(coh.coherence);
                    uncertainty = Some(coh.uncertainty);
                    notices = coh.notices;
                }
                if output.lags {
                    let time_lag = cs.time_lag()?;
                    lag = Some(time_lag.lag);
                    lag_error = Some(time_lag.error);
                }
                built(cs.spectrum())?
            }
            None => {
                let (lc1, lc2) = match (lcs1, lcs2) {
                    ([lc1], [lc2]) => (lc1, lc2),
                    _ => anyhow::bail!(
                        "A single-segment spectrum takes exactly one pair (got {})",
                        lcs1.len()
                    ),
                };
                let mut cs = CrossSpectrum::from_lightcurves(lc1, lc2, norm)
                    .context("Failed to build cross spectrum")?;
                if let Some(df) = self.config.rebin_df() {
                    cs = cs
                        .rebin(df)
                        .with_context(|| format!("Failed to rebin to {} Hz", df.0))?;
                }

                if output.coherence {
                    coherence = Some(cs.coherence()?);
                }
                if output.lags {
                    lag = Some(cs.time_lag()?);
                }
                built(cs.spectrum())?
            }
        };

        tracing::info!(
            "Spectrum: {} bins, df={:.6} Hz, m={}",
            spectrum.len(),
            spectrum.df().0,
            spectrum.m()
        );

        Ok(RunResults {
            name: self.config.name.clone(),
            norm,
            pairs: lcs1.len(),
            segment_size: self.config.segment_size(),
            spectrum,
            coherence,
            uncertainty,
            notices,
            lag,
            lag_error,
        })
    }
}

fn built(spectrum: Option<&Spectrum>) -> Result<Spectrum> {
    spectrum
        .cloned()
        .context("Cross spectrum was not built")
}
