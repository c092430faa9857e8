//! xspec: cross-spectral timing analysis of paired light curves.
//!
//! This is the main entry point for the xspec command-line tool.

mod config;
mod loader;
mod orchestrator;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "xspec")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a cross spectrum from a run configuration
    Run {
        /// Path to the run configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// Load a light curve and print its sampling summary
    Inspect {
        /// Path to the light curve (.json or two-column text)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Run { config, output } => {
            run(&config, &output, cli.format)?;
        }
        Commands::Inspect { file } => {
            inspect(&file, cli.format)?;
        }
    }

    Ok(())
}

fn run(config_path: &PathBuf, output_dir: &PathBuf, format: OutputFormat) -> Result<()> {
    tracing::info!("Loading configuration from {:?}", config_path);

    let config = config::load_config(config_path)?;
    let orchestrator = orchestrator::Orchestrator::new(config)?;

    let results = orchestrator.run()?;

    std::fs::create_dir_all(output_dir)?;
    output::write_results(&results, output_dir, format)?;

    if let OutputFormat::Text = format {
        output::print_results(&results)?;
    }

    tracing::info!("Run complete. Results written to {:?}", output_dir);
    Ok(())
}

fn inspect(file: &PathBuf, format: OutputFormat) -> Result<()> {
    tracing::info!("Inspecting light curve: {:?}", file);

    let lc = loader::load_lightcurve(file)?;

    match format {
        OutputFormat::Text => {
            println!("Light curve: {:?}", file);
            println!("  Samples:   {}", lc.len());
            println!("  dt:        {} s", lc.dt().0);
            println!("  Start:     {} s", lc.tstart().0);
            println!("  Duration:  {} s", lc.duration().0);
            println!("  Photons:   {}", lc.n_photons());
            println!("  Mean rate: {:.4} counts/s", lc.mean_rate());
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "file": file,
                "samples": lc.len(),
                "dt": lc.dt(),
                "tstart": lc.tstart(),
                "duration": lc.duration(),
                "photons": lc.n_photons(),
                "mean_rate": lc.mean_rate(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Csv => {
            println!("samples,dt,tstart,duration,photons,mean_rate");
            println!(
                "{},{},{},{},{},{}",
                lc.len(),
                lc.dt().0,
                lc.tstart().0,
                lc.duration().0,
                lc.n_photons(),
                lc.mean_rate()
            );
        }
    }

    Ok(())
}
