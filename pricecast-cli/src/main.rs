//! Pricecast CLI: forecast and feature-export commands over a CSV table.
//!
//! Commands:
//! - `predict`: clean, build features, fit and forecast with a confidence score
//! - `features`: write the assembled feature matrix to Parquet or CSV
//! - `profiles`: list the training profiles

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pricecast_core::export::write_features;
use pricecast_core::{select, TrainingProfile};
use pricecast_runner::{load_many, LoadedTable, PipelineConfig, PredictionPipeline};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pricecast",
    about = "Pricecast CLI: commodity price features, forecasts and confidence scores"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast the target series from a CSV table.
    Predict {
        /// CSV table(s): first column `date`, then one column per series.
        /// Several files are outer-joined on date.
        #[arg(long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Pipeline config (TOML). Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Training profile: ultra_fast, fast, balanced, high_precision.
        #[arg(long)]
        profile: Option<String>,

        /// Reference date for data freshness (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        as_of: Option<String>,

        /// Print the full report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also write the JSON report to this file.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Write the assembled feature matrix to .parquet or .csv.
    Features {
        #[arg(long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        #[arg(long)]
        output: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List training profiles.
    Profiles,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Predict {
            input,
            config,
            profile,
            as_of,
            json,
            report,
        } => run_predict(&input, config.as_deref(), profile.as_deref(), as_of.as_deref(), json, report),
        Commands::Features {
            input,
            output,
            config,
        } => run_features(&input, &output, config.as_deref()),
        Commands::Profiles => {
            print_profiles();
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>, profile: Option<&str>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(p) => PipelineConfig::load(p)?,
        None => PipelineConfig::default(),
    };
    if let Some(name) = profile {
        config.profile = select(name)?;
    }
    Ok(config)
}

fn load_input(paths: &[PathBuf]) -> Result<LoadedTable> {
    load_many(paths).with_context(|| {
        let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        format!("failed to load {}", names.join(", "))
    })
}

fn run_predict(
    input: &[PathBuf],
    config_path: Option<&Path>,
    profile: Option<&str>,
    as_of: Option<&str>,
    json: bool,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path, profile)?;
    let as_of = as_of
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("--as-of must be YYYY-MM-DD")?
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let table = load_input(input)?;
    info!(
        rows = table.frame.len(),
        columns = table.frame.width(),
        profile = %config.profile,
        "loaded input"
    );

    let pipeline = PredictionPipeline::new(config)?;
    let report = pipeline.run(&table.frame, as_of)?;

    let report_json = report.to_json().context("failed to serialize report")?;
    if let Some(path) = report_path {
        std::fs::write(&path, &report_json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "report saved");
    }

    if json {
        println!("{report_json}");
    } else {
        println!("{}", report.summary());
    }
    Ok(())
}

fn run_features(input: &[PathBuf], output: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path, None)?;
    let table = load_input(input)?;
    let pipeline = PredictionPipeline::new(config)?;
    let features = pipeline.build_features(&table.frame)?;

    write_features(&features.assembled, &features.target, output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "{} rows x {} features ({} dropped) written to {}",
        features.assembled.len(),
        features.assembled.feature_count(),
        features.assembled.dropped_columns.len(),
        output.display()
    );
    Ok(())
}

fn print_profiles() {
    println!(
        "{:<16} {:>6} {:>10} {:>12} {:>12}",
        "profile", "trees", "max_depth", "duration", "fit_ceiling"
    );
    for p in TrainingProfile::ALL {
        let marker = if p == TrainingProfile::default() { " (default)" } else { "" };
        println!(
            "{:<16} {:>6} {:>10} {:>12} {:>12.2}{marker}",
            p.name(),
            p.tree_count(),
            p.max_depth(),
            p.expected_duration(),
            p.fit_ceiling()
        );
    }
}
