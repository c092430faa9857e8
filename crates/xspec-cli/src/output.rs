//! Result output formatting and writing.

use crate::orchestrator::RunResults;
use crate::OutputFormat;
use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Optional per-bin columns present in this run, in output order.
fn extra_columns(results: &RunResults) -> Vec<(&'static str, &[f64])> {
    [
        ("coherence", results.coherence.as_deref()),
        ("uncertainty", results.uncertainty.as_deref()),
        ("lag", results.lag.as_deref()),
        ("lag_error", results.lag_error.as_deref()),
    ]
    .into_iter()
    .filter_map(|(name, values)| values.map(|v| (name, v)))
    .collect()
}

/// Write run results to the output directory.
pub fn write_results(results: &RunResults, output_dir: &Path, format: OutputFormat) -> Result<()> {
    let spectrum_path = write_spectrum(results, output_dir, format)?;
    tracing::info!("Wrote spectrum to {:?}", spectrum_path);

    let summary_path = output_dir.join("summary.txt");
    let mut f = std::fs::File::create(&summary_path)?;
    write_summary(results, &mut f)?;
    tracing::info!("Wrote summary to {:?}", summary_path);

    Ok(())
}

fn write_spectrum(results: &RunResults, output_dir: &Path, format: OutputFormat) -> Result<PathBuf> {
    let spectrum = &results.spectrum;
    let extras = extra_columns(results);

    let path = match format {
        OutputFormat::Text => output_dir.join("spectrum.txt"),
        OutputFormat::Json => output_dir.join("spectrum.json"),
        OutputFormat::Csv => output_dir.join("spectrum.csv"),
    };
    let mut f = std::fs::File::create(&path)?;

    match format {
        OutputFormat::Text => {
            write!(f, "# {:>14} {:>16} {:>16} {:>16}", "freq", "real", "imag", "error")?;
            for (name, _) in &extras {
                write!(f, " {:>16}", name)?;
            }
            writeln!(f)?;
            for (i, (freq, c)) in spectrum.freq().iter().zip(spectrum.cs()).enumerate() {
                write!(
                    f,
                    "{:>16.8e} {:>16.8e} {:>16.8e} {:>16.8e}",
                    freq,
                    c.re,
                    c.im,
                    spectrum.cs_err()[i]
                )?;
                for (_, values) in &extras {
                    write!(f, " {:>16.8e}", values[i])?;
                }
                writeln!(f)?;
            }
        }
        OutputFormat::Json => {
            let mut json = serde_json::json!({
                "name": results.name,
                "norm": results.norm,
                "df": spectrum.df(),
                "n": spectrum.n(),
                "m": spectrum.m(),
                "freq": spectrum.freq(),
                "real": spectrum.cs().iter().map(|c| c.re).collect::<Vec<_>>(),
                "imag": spectrum.cs().iter().map(|c| c.im).collect::<Vec<_>>(),
                "error": spectrum.cs_err(),
                "notices": results.notices,
            });
            for (name, values) in &extras {
                json[*name] = serde_json::json!(values);
            }
            writeln!(f, "{}", serde_json::to_string_pretty(&json)?)?;
        }
        OutputFormat::Csv => {
            write!(f, "freq,real,imag,error")?;
            for (name, _) in &extras {
                write!(f, ",{}", name)?;
            }
            writeln!(f)?;
            for (i, (freq, c)) in spectrum.freq().iter().zip(spectrum.cs()).enumerate() {
                write!(f, "{},{},{},{}", freq, c.re, c.im, spectrum.cs_err()[i])?;
                for (_, values) in &extras {
                    write!(f, ",{}", values[i])?;
                }
                writeln!(f)?;
            }
        }
    }

    Ok(path)
}

/// Human-readable run summary.
pub fn write_summary(results: &RunResults, f: &mut impl Write) -> Result<()> {
    let spectrum = &results.spectrum;

    writeln!(f, "xspec Run Summary")?;
    writeln!(f, "=================")?;
    writeln!(f)?;
    writeln!(f, "Name:           {}", results.name)?;
    writeln!(f, "Normalization:  {}", results.norm)?;
    writeln!(f, "Pairs:          {}", results.pairs)?;
    match results.segment_size {
        Some(size) => writeln!(f, "Segment size:   {} s", size.0)?,
        None => writeln!(f, "Segment size:   full light curve")?,
    }
    writeln!(f, "Segments (m):   {}", spectrum.m())?;
    writeln!(f, "Segment bins:   {}", spectrum.n())?;
    writeln!(f, "Resolution:     {:.6} Hz", spectrum.df().0)?;
    writeln!(f, "Frequency bins: {}", spectrum.len())?;
    writeln!(f, "Mean photons:   {:.1} / {:.1}", spectrum.nphots1(), spectrum.nphots2())?;

    if let Some(coherence) = &results.coherence {
        let finite: Vec<f64> = coherence.iter().copied().filter(|c| c.is_finite()).collect();
        if !finite.is_empty() {
            let mean = finite.iter().sum::<f64>() / finite.len() as f64;
            writeln!(f)?;
            writeln!(f, "Mean coherence: {:.4} over {} bins", mean, finite.len())?;
        }
    }

    for notice in &results.notices {
        writeln!(f, "Note: {}", notice)?;
    }

    Ok(())
}

/// Print a short summary to stdout.
pub fn print_results(results: &RunResults) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout)?;
    write_summary(results, &mut stdout)?;
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::orchestrator::Orchestrator;
    use lib_types::units::Seconds;
    use lib_types::Lightcurve;

    fn results(extra: &str) -> RunResults {
        let counts1: Vec<f64> = (0..512).map(|i| 20.0 + ((i * 13) % 7) as f64).collect();
        let counts2: Vec<f64> = (0..512).map(|i| 20.0 + ((i * 5) % 11) as f64).collect();
        let a = Lightcurve::from_counts(counts1, Seconds(0.5), Seconds::ZERO).unwrap();
        let b = Lightcurve::from_counts(counts2, Seconds(0.5), Seconds::ZERO).unwrap();
        let text = format!(
            "name = \"out\"\nnorm = \"frac\"\n{}\n[[pairs]]\nlc1 = \"a\"\nlc2 = \"b\"\n[output]\nlags = true\n",
            extra
        );
        Orchestrator::new(parse_config(&text, false).unwrap())
            .unwrap()
            .compute(&[a], &[b])
            .unwrap()
    }

    #[test]
    fn test_extra_columns() {
        let names: Vec<&str> = extra_columns(&results("segment_size = 64.0"))
            .iter()
            .map(|(name, _)| *name)
            .collect();
        assert_eq!(names, vec!["coherence", "uncertainty", "lag", "lag_error"]);

        let names: Vec<&str> = extra_columns(&results("")).iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["coherence", "lag"]);
    }

    #[test]
    fn test_summary_mentions_notice() {
        let mut buf = Vec::new();
        write_summary(&results("segment_size = 64.0"), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Segments (m):   4"));
        assert!(text.contains("Note: coherence bias corrected for 4 segments"));
    }
}
