//! Run configuration loading and validation.

use anyhow::{Context, Result};
use lib_spectral::Norm;
use lib_types::units::{Hertz, Seconds};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level run configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Run name/description.
    pub name: String,

    /// Normalization name: none, leahy, frac or abs.
    #[serde(default = "default_norm")]
    pub norm: String,

    /// Segment length in seconds. Absent means one spectrum over the
    /// full light curves.
    #[serde(default)]
    pub segment_size: Option<f64>,

    /// Target frequency resolution in Hz for rebinning.
    #[serde(default)]
    pub rebin_df: Option<f64>,

    /// Light curve pairs.
    #[serde(default)]
    pub pairs: Vec<PairConfig>,

    /// Output configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_norm() -> String {
    "none".to_string()
}

/// One pair of light curve files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PairConfig {
    pub lc1: PathBuf,
    pub lc2: PathBuf,
}

/// Output configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Write coherence (and its uncertainty when averaged).
    #[serde(default = "default_true")]
    pub coherence: bool,

    /// Write time lags.
    #[serde(default)]
    pub lags: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            coherence: true,
            lags: false,
        }
    }
}

fn default_true() -> bool { true }

impl RunConfig {
    /// Parsed normalization.
    pub fn norm(&self) -> Result<Norm> {
        self.norm
            .parse()
            .with_context(|| format!("Invalid normalization in config: {:?}", self.norm))
    }

    pub fn segment_size(&self) -> Option<Seconds> {
        self.segment_size.map(Seconds)
    }

    pub fn rebin_df(&self) -> Option<Hertz> {
        self.rebin_df.map(Hertz)
    }

    /// Resolve relative light curve paths against `base`.
    fn resolve_paths(&mut self, base: &Path) {
        for pair in &mut self.pairs {
            if pair.lc1.is_relative() {
                pair.lc1 = base.join(&pair.lc1);
            }
            if pair.lc2.is_relative() {
                pair.lc2 = base.join(&pair.lc2);
            }
        }
    }
}

/// Load configuration from a file.
///
/// Light curve paths are taken relative to the directory holding the
/// configuration file.
pub fn load_config(path: &Path) -> Result<RunConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let is_json = path.extension().map_or(false, |e| e == "json");
    let mut config = parse_config(&content, is_json)?;

    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }

    validate_config(&config)?;
    validate_files(&config)?;

    Ok(config)
}

/// Parse configuration text as JSON or TOML.
pub fn parse_config(content: &str, is_json: bool) -> Result<RunConfig> {
    if is_json {
        serde_json::from_str(content).with_context(|| "Failed to parse config as JSON")
    } else {
        toml::from_str(content).with_context(|| "Failed to parse config as TOML")
    }
}

/// Validate configuration values.
pub fn validate_config(config: &RunConfig) -> Result<()> {
    if config.pairs.is_empty() {
        anyhow::bail!("Config must list at least one [[pairs]] entry");
    }

    config.norm()?;

    if let Some(size) = config.segment_size {
        if !size.is_finite() || size <= 0.0 {
            anyhow::bail!("segment_size must be finite and positive (got {})", size);
        }
    } else if config.pairs.len() > 1 {
        anyhow::bail!(
            "{} pairs configured but no segment_size; several pairs are only \
             combined in an averaged spectrum",
            config.pairs.len()
        );
    }

    if let Some(df) = config.rebin_df {
        if !df.is_finite() || df <= 0.0 {
            anyhow::bail!("rebin_df must be finite and positive (got {})", df);
        }
    }

    Ok(())
}

/// Check that every light curve file exists.
fn validate_files(config: &RunConfig) -> Result<()> {
    for (i, pair) in config.pairs.iter().enumerate() {
        for path in [&pair.lc1, &pair.lc2] {
            if !path.exists() {
                anyhow::bail!("Pair {}: light curve file not found: {:?}", i + 1, path);
            }
        }
    }
    Ok(())
}
