//! Transaction Scoring
//!
//! Turns the buffered rows plus the finished benchmarks into scored
//! transactions. Split in two so flag counts can be logged in pipeline
//! order: [`compute_z_scores`] runs first, the ML pass runs outside this
//! module, then [`score_rows`] folds everything into [`ScoredClaim`]s.

pub mod composite;

pub use composite::composite_score;

use statrs::statistics::{Data, OrderStatistics};

use crate::benchmarks::{BenchmarkAccumulator, CodeBenchmark, RunningStats};
use crate::config::ScoringConfig;
use crate::types::{ClaimRow, ScoredClaim};

/// Z-scores for one row on both screened axes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowZScores {
    pub cost: f64,
    pub volume: f64,
}

/// Score every row against its procedure code's benchmark distribution.
///
/// Rows whose code is unknown or whose code population is below
/// `min_code_population` get zeros on both axes, as does any axis with
/// zero spread.
pub fn compute_z_scores(
    rows: &[ClaimRow],
    benchmarks: &BenchmarkAccumulator,
    cfg: &ScoringConfig,
) -> Vec<RowZScores> {
    rows.iter()
        .map(|row| match benchmarks.stats(&row.procedure_code) {
            Some(benchmark) if benchmark.cost_per_claim.count() >= cfg.min_code_population as u64 => {
                row_z_scores(row, benchmark)
            }
            _ => RowZScores::default(),
        })
        .collect()
}

fn row_z_scores(row: &ClaimRow, benchmark: &CodeBenchmark) -> RowZScores {
    RowZScores {
        cost: z_value(row.cost_per_claim, &benchmark.cost_per_claim),
        volume: z_value(row.claims_per_beneficiary, &benchmark.claims_per_beneficiary),
    }
}

fn z_value(x: f64, stats: &RunningStats) -> f64 {
    let std = stats.sample_std();
    if std > 0.0 {
        (x - stats.mean()) / std
    } else {
        0.0
    }
}

/// Paid amount at the given population quantile. Unreachable sentinel
/// for an empty population so nothing flags high-spend.
pub fn spend_quantile(rows: &[ClaimRow], tau: f64) -> f64 {
    if rows.is_empty() {
        return f64::INFINITY;
    }
    let mut paid = Data::new(rows.iter().map(|r| r.paid).collect::<Vec<f64>>());
    paid.quantile(tau)
}

/// Assemble scored transactions from the three detector passes.
///
/// `z_scores` and `ml_flags` must be parallel to `rows`.
pub fn score_rows(
    rows: &[ClaimRow],
    z_scores: &[RowZScores],
    ml_flags: &[bool],
    cfg: &ScoringConfig,
) -> Vec<ScoredClaim> {
    debug_assert_eq!(rows.len(), z_scores.len());
    debug_assert_eq!(rows.len(), ml_flags.len());

    let spend_cutoff = spend_quantile(rows, cfg.spend_quantile);

    rows.iter()
        .zip(z_scores)
        .zip(ml_flags)
        .map(|((row, z), &is_ml_anomaly)| {
            let is_cost_anomaly = z.cost > cfg.z_score_threshold;
            let is_volume_anomaly = z.volume > cfg.z_score_threshold;
            let is_high_spend = row.paid >= spend_cutoff;
            let fraud_risk_score = composite_score(
                z.cost,
                z.volume,
                is_ml_anomaly,
                is_high_spend,
                cfg.z_score_threshold,
            );

            ScoredClaim {
                billing_npi: row.billing_npi.clone(),
                servicing_npi: row.servicing_npi.clone(),
                procedure_code: row.procedure_code.clone(),
                claim_month: row.claim_month.clone(),
                beneficiaries: row.beneficiaries,
                claims: row.claims,
                paid: row.paid,
                cost_per_claim: row.cost_per_claim,
                claims_per_beneficiary: row.claims_per_beneficiary,
                cost_z_score: z.cost,
                claims_per_ben_z_score: z.volume,
                is_cost_anomaly,
                is_volume_anomaly,
                is_ml_anomaly,
                fraud_risk_score,
            }
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
