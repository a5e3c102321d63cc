//! Provider Summary
//!
//! Collapses scored transactions into one row per billing provider for
//! the results CSV and the ranked report sections.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::ScoredClaim;

/// One provider's aggregate screening outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummaryRow {
    pub provider_npi: String,
    pub avg_fraud_risk_score: f64,
    pub total_spending: f64,
    pub total_claims: i64,
    pub total_beneficiaries: i64,
    pub cost_anomaly_count: u64,
    pub volume_anomaly_count: u64,
    pub ml_anomaly_count: u64,
    /// Sum of the three flag counts. Tallies anomaly events, not
    /// anomalous rows, so a row raising two flags adds two here.
    pub total_anomalies: u64,
}

#[derive(Default)]
struct ProviderAgg {
    score_sum: f64,
    row_count: u64,
    total_spending: f64,
    total_claims: i64,
    total_beneficiaries: i64,
    cost_anomaly_count: u64,
    volume_anomaly_count: u64,
    ml_anomaly_count: u64,
}

/// Group scored transactions by billing provider, sorted by mean risk
/// score descending with NPI as the tie-break.
pub fn build_provider_summary(scored: &[ScoredClaim]) -> Vec<ProviderSummaryRow> {
    let mut groups: HashMap<&str, ProviderAgg> = HashMap::new();
    for claim in scored {
        let agg = groups.entry(claim.billing_npi.as_str()).or_default();
        agg.score_sum += claim.fraud_risk_score;
        agg.row_count += 1;
        agg.total_spending += claim.paid;
        agg.total_claims += claim.claims;
        agg.total_beneficiaries += claim.beneficiaries;
        agg.cost_anomaly_count += u64::from(claim.is_cost_anomaly);
        agg.volume_anomaly_count += u64::from(claim.is_volume_anomaly);
        agg.ml_anomaly_count += u64::from(claim.is_ml_anomaly);
    }

    let mut rows: Vec<ProviderSummaryRow> = groups
        .into_iter()
        .map(|(npi, agg)| ProviderSummaryRow {
            provider_npi: npi.to_string(),
            avg_fraud_risk_score: agg.score_sum / agg.row_count as f64,
            total_spending: agg.total_spending,
            total_claims: agg.total_claims,
            total_beneficiaries: agg.total_beneficiaries,
            cost_anomaly_count: agg.cost_anomaly_count,
            volume_anomaly_count: agg.volume_anomaly_count,
            ml_anomaly_count: agg.ml_anomaly_count,
            total_anomalies: agg.cost_anomaly_count
                + agg.volume_anomaly_count
                + agg.ml_anomaly_count,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.avg_fraud_risk_score
            .total_cmp(&a.avg_fraud_risk_score)
            .then_with(|| a.provider_npi.cmp(&b.provider_npi))
    });
    rows
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(npi: &str, score: f64, paid: f64, cost: bool, volume: bool, ml: bool) -> ScoredClaim {
        ScoredClaim {
            billing_npi: npi.to_string(),
            servicing_npi: "9".to_string(),
            procedure_code: "A".to_string(),
            claim_month: "2024-01".to_string(),
            beneficiaries: 2,
            claims: 4,
            paid,
            cost_per_claim: paid / 4.0,
            claims_per_beneficiary: 2.0,
            cost_z_score: 0.0,
            claims_per_ben_z_score: 0.0,
            is_cost_anomaly: cost,
            is_volume_anomaly: volume,
            is_ml_anomaly: ml,
            fraud_risk_score: score,
        }
    }

    #[test]
    fn test_groups_aggregate_scores_and_sums() {
        let scored = vec![
            claim("1", 80.0, 100.0, true, false, false),
            claim("1", 40.0, 50.0, false, false, false),
            claim("2", 10.0, 30.0, false, false, false),
        ];

        let summary = build_provider_summary(&scored);
        assert_eq!(summary.len(), 2);

        let one = summary.iter().find(|r| r.provider_npi == "1").unwrap();
        assert!((one.avg_fraud_risk_score - 60.0).abs() < 1e-12);
        assert!((one.total_spending - 150.0).abs() < 1e-12);
        assert_eq!(one.total_claims, 8);
        assert_eq!(one.total_beneficiaries, 4);
        assert_eq!(one.cost_anomaly_count, 1);
    }

    #[test]
    fn test_total_anomalies_tallies_events_not_rows() {
        // One row raising all three flags produces three anomaly events.
        let scored = vec![claim("1", 100.0, 10.0, true, true, true)];

        let summary = build_provider_summary(&scored);
        assert_eq!(summary[0].cost_anomaly_count, 1);
        assert_eq!(summary[0].volume_anomaly_count, 1);
        assert_eq!(summary[0].ml_anomaly_count, 1);
        assert_eq!(summary[0].total_anomalies, 3);
    }

    #[test]
    fn test_sorted_by_mean_score_descending() {
        let scored = vec![
            claim("low", 10.0, 1.0, false, false, false),
            claim("high", 90.0, 1.0, false, false, false),
            claim("mid", 50.0, 1.0, false, false, false),
        ];

        let order: Vec<String> = build_provider_summary(&scored)
            .into_iter()
            .map(|r| r.provider_npi)
            .collect();
        assert_eq!(order, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_equal_scores_tie_break_on_npi() {
        let scored = vec![
            claim("222", 50.0, 1.0, false, false, false),
            claim("111", 50.0, 1.0, false, false, false),
        ];

        let order: Vec<String> = build_provider_summary(&scored)
            .into_iter()
            .map(|r| r.provider_npi)
            .collect();
        assert_eq!(order, vec!["111", "222"]);
    }

    #[test]
    fn test_empty_input_yields_empty_summary() {
        assert!(build_provider_summary(&[]).is_empty());
    }
}
