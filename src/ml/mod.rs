//! ML Outlier Pass
//!
//! Second screening layer alongside the z-score pass. Each validated row
//! becomes a five-feature vector, standardized and scored by an
//! isolation forest. Above the sampling threshold the scaler and forest
//! are fitted on a fixed-size random sample while every row is still
//! scored, keeping fit cost bounded on very large extracts.

pub mod isolation_forest;
pub mod scaler;

pub use isolation_forest::IsolationForest;
pub use scaler::StandardScaler;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::MlConfig;
use crate::types::ClaimRow;

/// Features per row fed to the forest.
pub const FEATURE_COUNT: usize = 5;

/// One row's feature vector: cost per claim, claims per beneficiary,
/// paid, claims, beneficiaries.
pub type FeatureRow = [f64; FEATURE_COUNT];

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Extract the model features from a validated row.
pub fn feature_row(row: &ClaimRow) -> FeatureRow {
    [
        finite_or_zero(row.cost_per_claim),
        finite_or_zero(row.claims_per_beneficiary),
        finite_or_zero(row.paid),
        row.claims as f64,
        row.beneficiaries as f64,
    ]
}

/// Run the full ML pass and return one flag per input row.
///
/// Deterministic for a fixed seed: sampling, tree construction and
/// scoring all derive from `cfg.seed`.
pub fn detect_outliers(rows: &[ClaimRow], cfg: &MlConfig) -> Vec<bool> {
    if rows.is_empty() {
        return Vec::new();
    }

    let features: Vec<FeatureRow> = rows.iter().map(feature_row).collect();
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    let train: Vec<FeatureRow> = if features.len() > cfg.sampling_threshold {
        sample_rows(&features, cfg.sampling_threshold, &mut rng)
    } else {
        features.clone()
    };

    let scaler = StandardScaler::fit(&train);
    let scaled_train: Vec<FeatureRow> = train.iter().map(|r| scaler.transform(r)).collect();
    let forest = IsolationForest::fit(&scaled_train, cfg.n_estimators, cfg.contamination, &mut rng);

    let scaled: Vec<FeatureRow> = features.iter().map(|r| scaler.transform(r)).collect();
    forest.predict(&scaled)
}

/// Sample exactly `amount` rows without replacement, preserving file
/// order for stable downstream fits.
fn sample_rows(features: &[FeatureRow], amount: usize, rng: &mut StdRng) -> Vec<FeatureRow> {
    let mut indices = rand::seq::index::sample(rng, features.len(), amount).into_vec();
    indices.sort_unstable();
    indices.into_iter().map(|i| features[i]).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(cost_per_claim: f64, claims_per_beneficiary: f64, paid: f64) -> ClaimRow {
        ClaimRow {
            billing_npi: "1".to_string(),
            servicing_npi: "2".to_string(),
            procedure_code: "A".to_string(),
            claim_month: "2024-01".to_string(),
            beneficiaries: 4,
            claims: 8,
            paid,
            cost_per_claim,
            claims_per_beneficiary,
        }
    }

    #[test]
    fn test_feature_order() {
        let row = claim(12.5, 2.0, 100.0);
        assert_eq!(feature_row(&row), [12.5, 2.0, 100.0, 8.0, 4.0]);
    }

    #[test]
    fn test_non_finite_features_become_zero() {
        let mut row = claim(1.0, 1.0, 1.0);
        row.cost_per_claim = f64::NAN;
        row.claims_per_beneficiary = f64::INFINITY;
        row.paid = f64::NEG_INFINITY;

        assert_eq!(feature_row(&row), [0.0, 0.0, 0.0, 8.0, 4.0]);
    }

    #[test]
    fn test_empty_input_yields_no_flags() {
        let cfg = MlConfig::default();
        assert!(detect_outliers(&[], &cfg).is_empty());
    }

    #[test]
    fn test_sampling_branch_is_deterministic_and_total() {
        let rows: Vec<ClaimRow> = (0..150)
            .map(|i| {
                let v = f64::from(i).mul_add(0.21, 3.0);
                claim(v, v * 0.1, v * 10.0)
            })
            .collect();

        let cfg = MlConfig {
            sampling_threshold: 100,
            n_estimators: 50,
            ..MlConfig::default()
        };

        let flags_a = detect_outliers(&rows, &cfg);
        let flags_b = detect_outliers(&rows, &cfg);

        // Every row gets a verdict even though the fit saw only 100.
        assert_eq!(flags_a.len(), 150);
        assert_eq!(flags_a, flags_b);
    }

    #[test]
    fn test_planted_outlier_is_flagged() {
        let mut rows: Vec<ClaimRow> = (0..200)
            .map(|i| {
                let jitter = (i % 7) as f64 * 0.03;
                claim(10.0 + jitter, 1.0 + jitter, 100.0 + jitter)
            })
            .collect();
        rows.push(claim(5_000.0, 80.0, 400_000.0));

        let cfg = MlConfig {
            n_estimators: 100,
            ..MlConfig::default()
        };
        let flags = detect_outliers(&rows, &cfg);

        assert!(flags[200], "planted outlier should be flagged");
    }
}
