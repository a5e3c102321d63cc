//! Provider Rollups
//!
//! Streaming per-provider aggregates. Spending, claim and beneficiary
//! totals are exact sums across the whole file. The distinct-procedure
//! figure is a high-water mark: each chunk's per-provider distinct count
//! is computed locally and the maximum across chunks is kept, so a code
//! seen in two chunks is never double counted but cross-chunk unions are
//! never formed either. The figure is exact for single-chunk files and a
//! lower bound otherwise.

use std::collections::{HashMap, HashSet};

use crate::types::ClaimRow;

/// Aggregates for one billing provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderRollup {
    pub total_paid: f64,
    pub total_claims: i64,
    pub total_beneficiaries: i64,
    /// High-water mark of per-chunk distinct procedure codes.
    pub unique_procedures: usize,
}

/// Per-provider rollup accumulator fed chunk by chunk.
#[derive(Debug, Default)]
pub struct RollupAccumulator {
    providers: HashMap<String, ProviderRollup>,
}

#[derive(Default)]
struct ChunkAgg<'a> {
    paid: f64,
    claims: i64,
    beneficiaries: i64,
    codes: HashSet<&'a str>,
}

impl RollupAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a chunk of validated rows into the provider aggregates.
    pub fn observe(&mut self, rows: &[ClaimRow]) {
        // Aggregate within the chunk first so the distinct-code count is
        // taken per chunk, not per row.
        let mut batch: HashMap<&str, ChunkAgg<'_>> = HashMap::new();
        for row in rows {
            let agg = batch.entry(row.billing_npi.as_str()).or_default();
            agg.paid += row.paid;
            agg.claims += row.claims;
            agg.beneficiaries += row.beneficiaries;
            if !row.procedure_code.is_empty() {
                agg.codes.insert(row.procedure_code.as_str());
            }
        }

        for (npi, agg) in batch {
            let rollup = self.providers.entry(npi.to_string()).or_default();
            rollup.total_paid += agg.paid;
            rollup.total_claims += agg.claims;
            rollup.total_beneficiaries += agg.beneficiaries;
            rollup.unique_procedures = rollup.unique_procedures.max(agg.codes.len());
        }
    }

    pub fn get(&self, billing_npi: &str) -> Option<&ProviderRollup> {
        self.providers.get(billing_npi)
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Total spending across all providers.
    pub fn total_paid(&self) -> f64 {
        self.providers.values().map(|p| p.total_paid).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
