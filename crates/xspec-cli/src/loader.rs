//! Light curve file reading.
//!
//! Two formats are accepted: a JSON object `{"time": [...], "counts": [...]}`
//! and plain text with a time and a counts column separated by whitespace or
//! commas. Text files may contain `#` comments and one non-numeric header
//! line before the data.

use anyhow::{Context, Result};
use lib_types::Lightcurve;
use std::path::Path;

/// Read a light curve from disk, picking the format from the extension.
pub fn load_lightcurve(path: &Path) -> Result<Lightcurve> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read light curve: {:?}", path))?;

    let is_json = path.extension().map_or(false, |e| e == "json");
    let lc = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse light curve JSON: {:?}", path))?
    } else {
        parse_text(&content).with_context(|| format!("Failed to parse light curve: {:?}", path))?
    };

    tracing::info!(
        "Loaded {:?}: {} samples, dt={} s",
        path,
        lc.len(),
        lc.dt().0
    );
    Ok(lc)
}

/// Parse two-column text.
pub fn parse_text(content: &str) -> Result<Lightcurve> {
    let mut time = Vec::new();
    let mut counts = Vec::new();
    let mut header_seen = false;

    for (lineno, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();

        let parsed: Option<Vec<f64>> = fields.iter().map(|f| f.parse().ok()).collect();
        let values = match parsed {
            Some(v) => v,
            None if time.is_empty() && !header_seen => {
                header_seen = true;
                continue;
            }
            None => anyhow::bail!("Line {}: non-numeric value in {:?}", lineno + 1, raw),
        };

        if values.len() < 2 {
            anyhow::bail!(
                "Line {}: expected time and counts columns, found {}",
                lineno + 1,
                values.len()
            );
        }
        time.push(values[0]);
        counts.push(values[1]);
    }

    Ok(Lightcurve::new(time, counts)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_whitespace_with_header() {
        let text = "# band 2-10 keV\ntime counts\n0.0 3\n0.5 4   # flare\n1.0 5\n\n1.5 2\n";
        let lc = parse_text(text).unwrap();
        assert_eq!(lc.len(), 4);
        assert_relative_eq!(lc.dt().0, 0.5);
        assert_eq!(lc.counts(), &[3.0, 4.0, 5.0, 2.0]);
    }

    #[test]
    fn test_parse_csv() {
        let lc = parse_text("time,counts\n1,2\n2,3\n3,2\n").unwrap();
        assert_eq!(lc.len(), 3);
        assert_relative_eq!(lc.n_photons(), 7.0);
    }

    #[test]
    fn test_rejects_bad_rows() {
        assert!(parse_text("0 1\n1 x\n").is_err());
        assert!(parse_text("0 1\n1\n").is_err());
        assert!(parse_text("0 1\n1 2\n3 3\n").is_err());
    }

    #[test]
    fn test_parse_json() {
        let lc: Lightcurve =
            serde_json::from_str(r#"{"time": [0.0, 1.0, 2.0], "counts": [1.0, 0.0, 4.0]}"#).unwrap();
        assert_eq!(lc.len(), 3);
    }
}
