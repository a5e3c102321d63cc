//! CLAIMSCOPE - Medicaid Claims Fraud Screening
//!
//! Chunked aggregation and anomaly scoring engine for large Medicaid
//! claims extracts.
//!
//! # Usage
//!
//! ```bash
//! # Screen an extract with default settings
//! claimscope claims_extract.csv
//!
//! # Smaller chunks and a dedicated output directory
//! claimscope claims_extract.csv --chunk-size 10000 --output-dir runs/august
//!
//! # Generate a synthetic extract to exercise the pipeline
//! gen-claims --rows 250000 --output synthetic_claims.csv
//! ```
//!
//! # Environment Variables
//!
//! - `CLAIMSCOPE_CONFIG`: Path to a TOML config file
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use claimscope::config::DetectorConfig;
use claimscope::pipeline::ScreeningPipeline;
use claimscope::report::fmt_count;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "claimscope")]
#[command(about = "Medicaid claims fraud screening over chunked CSV extracts")]
#[command(version)]
struct CliArgs {
    /// Path to the claims extract CSV
    input: PathBuf,

    /// Rows per ingest chunk (default: 50000)
    #[arg(long, value_name = "ROWS")]
    chunk_size: Option<usize>,

    /// Directory for the four output artifacts (default: ".")
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Path to a TOML config file (overrides CLAIMSCOPE_CONFIG)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// RNG seed for the ML pass (default: 42)
    #[arg(long)]
    seed: Option<u64>,

    /// Log warnings and errors only
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let default_filter = if args.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    let mut cfg = match &args.config {
        Some(path) => DetectorConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => DetectorConfig::load(),
    };
    if let Some(chunk_size) = args.chunk_size {
        cfg.ingest.chunk_size = chunk_size;
    }
    if let Some(output_dir) = args.output_dir {
        cfg.report.output_dir = output_dir;
    }
    if let Some(seed) = args.seed {
        cfg.ml.seed = seed;
    }
    cfg.validate().context("invalid configuration")?;

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  CLAIMSCOPE - Medicaid Fraud Detection");
    info!("  Large File Screening Engine");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("Input file: {}", args.input.display());

    let mut pipeline = ScreeningPipeline::new(cfg)?;
    match pipeline.run(&args.input) {
        Ok(summary) => {
            println!();
            println!("{}", "=".repeat(80));
            println!("ANALYSIS COMPLETE");
            println!("{}", "=".repeat(80));
            println!(
                "Total Transactions Analyzed: {}",
                fmt_count(summary.total_transactions as u64)
            );
            println!(
                "High-Risk Providers Found: {}",
                fmt_count(summary.elevated_providers as u64)
            );
            println!(
                "Anomalous Transactions: {}",
                fmt_count(summary.anomalous_transactions as u64)
            );
            println!();
            println!("Output Files:");
            println!("  1. fraud_detection_results.csv - High-risk providers summary");
            println!("  2. detailed_anomalies.csv - All anomalous transactions");
            println!("  3. fraud_analysis_report.txt - Detailed analysis report");
            println!("  4. processing_log.txt - Execution log");
            println!("{}", "=".repeat(80));
            println!();
            println!("✓ Processing completed successfully!");
            Ok(())
        }
        Err(e) => {
            error!("{e}");
            println!();
            println!("✗ Processing failed. Check processing_log.txt for details.");
            std::process::exit(1);
        }
    }
}
