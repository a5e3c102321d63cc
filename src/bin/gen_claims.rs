//! Synthetic Claims Extract Generator
//!
//! Generates a Medicaid-style claims extract for exercising CLAIMSCOPE.
//! Most rows follow per-procedure lognormal cost distributions; a small
//! slice of providers bills inflated amounts so the detectors have
//! something to find.
//!
//! # Usage
//! ```bash
//! gen-claims --rows 250000 --output synthetic_claims.csv
//! claimscope synthetic_claims.csv
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, LogNormal};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "gen-claims")]
#[command(about = "Synthetic Medicaid claims extract generator for CLAIMSCOPE testing")]
#[command(version)]
struct Args {
    /// Number of claim rows to generate
    #[arg(long, default_value = "250000", value_parser = clap::value_parser!(u64).range(1..))]
    rows: u64,

    /// Number of billing providers
    #[arg(long, default_value = "2000", value_parser = clap::value_parser!(u64).range(1..))]
    providers: u64,

    /// Number of procedure codes
    #[arg(long, default_value = "150", value_parser = clap::value_parser!(u64).range(1..))]
    codes: u64,

    /// Share of providers billing inflated amounts (0.0 to 1.0)
    #[arg(long, default_value = "0.02")]
    fraud_rate: f64,

    /// Random seed for reproducibility
    #[arg(long, default_value = "7")]
    seed: u64,

    /// Output CSV path
    #[arg(short, long, default_value = "synthetic_claims.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    if !(0.0..=1.0).contains(&args.fraud_rate) {
        return Err(anyhow!("--fraud-rate must lie in [0, 1]"));
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    writer.write_record([
        "BILLING_PROVIDER_NPI_NUM",
        "SERVICING_PROVIDER_NPI_NUM",
        "HCPCS_CODE",
        "CLAIM_FROM_MONTH",
        "TOTAL_UNIQUE_BENEFICIARIES",
        "TOTAL_CLAIMS",
        "TOTAL_PAID",
    ])?;

    // Per-code base cost, lognormal so a few codes are naturally pricey.
    let base_cost = LogNormal::new(4.0, 1.0).map_err(|e| anyhow!("bad lognormal params: {e}"))?;
    let code_costs: Vec<f64> = (0..args.codes).map(|_| base_cost.sample(&mut rng)).collect();

    let inflated_providers = (args.providers as f64 * args.fraud_rate).round() as u64;

    for _ in 0..args.rows {
        let provider = rng.gen_range(0..args.providers);
        let code_idx = rng.gen_range(0..args.codes as usize);

        let beneficiaries = rng.gen_range(1..=40i64);
        let claims = beneficiaries * rng.gen_range(1..=4i64);

        let mut cost_per_claim = code_costs[code_idx] * rng.gen_range(0.8..1.2);
        // Inflated providers overbill on roughly a third of their rows.
        if provider < inflated_providers && rng.gen_bool(0.35) {
            cost_per_claim *= rng.gen_range(8.0..20.0);
        }
        let paid = cost_per_claim * claims as f64;

        let month = format!("2024-{:02}", rng.gen_range(1..=12));
        writer.write_record([
            format!("1{provider:09}"),
            format!("2{:09}", rng.gen_range(0..args.providers)),
            format!("A{:04}", code_idx),
            month,
            beneficiaries.to_string(),
            claims.to_string(),
            format!("{paid:.2}"),
        ])?;
    }
    writer.flush()?;

    info!(
        "Wrote {} rows ({} providers, {} codes, {} inflated) to {}",
        args.rows,
        args.providers,
        args.codes,
        inflated_providers,
        args.output.display()
    );
    Ok(())
}
