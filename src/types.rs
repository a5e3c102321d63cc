//! Core data types shared across the screening pipeline.

use serde::Serialize;

/// One validated claims transaction: a billing provider billing one
/// procedure code for one claim month.
///
/// Rows are produced by the ingest validator, so the numeric invariants
/// hold by construction: paid, claims and beneficiaries are positive and
/// both derived ratios are finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimRow {
    pub billing_npi: String,
    pub servicing_npi: String,
    pub procedure_code: String,
    pub claim_month: String,
    pub beneficiaries: i64,
    pub claims: i64,
    pub paid: f64,
    /// paid / claims
    pub cost_per_claim: f64,
    /// claims / beneficiaries
    pub claims_per_beneficiary: f64,
}

/// A claim row with its anomaly signals and composite risk score attached.
///
/// Kept flat (no nested row struct) so `csv::Writer::serialize` emits one
/// spreadsheet row per claim in the detailed anomalies artifact.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredClaim {
    pub billing_npi: String,
    pub servicing_npi: String,
    pub procedure_code: String,
    pub claim_month: String,
    pub beneficiaries: i64,
    pub claims: i64,
    pub paid: f64,
    pub cost_per_claim: f64,
    pub claims_per_beneficiary: f64,
    pub cost_z_score: f64,
    pub claims_per_ben_z_score: f64,
    pub is_cost_anomaly: bool,
    pub is_volume_anomaly: bool,
    pub is_ml_anomaly: bool,
    pub fraud_risk_score: f64,
}

impl ScoredClaim {
    /// True when any of the three anomaly detectors fired for this row.
    pub fn has_anomaly_flag(&self) -> bool {
        self.is_cost_anomaly || self.is_volume_anomaly || self.is_ml_anomaly
    }
}
