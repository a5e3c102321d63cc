//! Procedure Code Benchmarks
//!
//! Streaming per-code statistics for the two screened ratios. Welford's
//! algorithm keeps mean and variance numerically stable across millions
//! of rows without buffering per-code samples.

use std::collections::HashMap;

use crate::types::ClaimRow;

/// Running mean and variance over a single metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    /// Fold in one observation. Non-finite values are ignored.
    pub fn push(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation (n - 1 denominator). Zero below two
    /// observations.
    pub fn sample_std(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).sqrt()
        }
    }
}

/// Benchmark distributions for one procedure code.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeBenchmark {
    pub cost_per_claim: RunningStats,
    pub claims_per_beneficiary: RunningStats,
}

/// Per-code benchmark accumulator fed chunk by chunk.
#[derive(Debug, Default)]
pub struct BenchmarkAccumulator {
    benchmarks: HashMap<String, CodeBenchmark>,
}

impl BenchmarkAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a chunk of validated rows into the per-code distributions.
    ///
    /// Rows without a procedure code never join a benchmark group.
    pub fn observe(&mut self, rows: &[ClaimRow]) {
        for row in rows {
            if row.procedure_code.is_empty() {
                continue;
            }
            let benchmark = self
                .benchmarks
                .entry(row.procedure_code.clone())
                .or_default();
            benchmark.cost_per_claim.push(row.cost_per_claim);
            benchmark
                .claims_per_beneficiary
                .push(row.claims_per_beneficiary);
        }
    }

    pub fn stats(&self, procedure_code: &str) -> Option<&CodeBenchmark> {
        self.benchmarks.get(procedure_code)
    }

    pub fn code_count(&self) -> usize {
        self.benchmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, cost_per_claim: f64) -> ClaimRow {
        ClaimRow {
            billing_npi: "1".to_string(),
            servicing_npi: "2".to_string(),
            procedure_code: code.to_string(),
            claim_month: "2024-01".to_string(),
            beneficiaries: 1,
            claims: 1,
            paid: cost_per_claim,
            cost_per_claim,
            claims_per_beneficiary: 1.0,
        }
    }

    #[test]
    fn test_known_mean_and_sample_std() {
        let mut stats = RunningStats::default();
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 8);
        assert!((stats.mean() - 5.0).abs() < 1e-12);
        // Sum of squared deviations is 32, so sample variance is 32/7.
        let expected = (32.0f64 / 7.0).sqrt();
        assert!(
            (stats.sample_std() - expected).abs() < 1e-12,
            "got {}",
            stats.sample_std()
        );
    }

    #[test]
    fn test_std_is_zero_below_two_observations() {
        let mut stats = RunningStats::default();
        assert_eq!(stats.sample_std(), 0.0);
        stats.push(42.0);
        assert_eq!(stats.sample_std(), 0.0);
    }

    #[test]
    fn test_non_finite_values_are_ignored() {
        let mut stats = RunningStats::default();
        stats.push(1.0);
        stats.push(f64::NAN);
        stats.push(f64::INFINITY);
        stats.push(3.0);

        assert_eq!(stats.count(), 2);
        assert!((stats.mean() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_chunked_observation_matches_single_pass() {
        let values: Vec<f64> = (1..=100).map(|i| (i as f64).mul_add(0.37, 5.0)).collect();
        let rows: Vec<ClaimRow> = values.iter().map(|&v| row("A0425", v)).collect();

        let mut single = BenchmarkAccumulator::new();
        single.observe(&rows);

        let mut chunked = BenchmarkAccumulator::new();
        for chunk in rows.chunks(7) {
            chunked.observe(chunk);
        }

        let a = single.stats("A0425").unwrap().cost_per_claim;
        let b = chunked.stats("A0425").unwrap().cost_per_claim;
        assert_eq!(a.count(), b.count());
        assert!((a.mean() - b.mean()).abs() < 1e-9);
        assert!((a.sample_std() - b.sample_std()).abs() < 1e-9);
    }

    #[test]
    fn test_codes_accumulate_independently() {
        let mut acc = BenchmarkAccumulator::new();
        acc.observe(&[row("A", 10.0), row("B", 100.0), row("A", 20.0)]);

        assert_eq!(acc.code_count(), 2);
        assert_eq!(acc.stats("A").unwrap().cost_per_claim.count(), 2);
        assert_eq!(acc.stats("B").unwrap().cost_per_claim.count(), 1);
        assert!(acc.stats("C").is_none());
    }

    #[test]
    fn test_empty_procedure_codes_are_skipped() {
        let mut acc = BenchmarkAccumulator::new();
        acc.observe(&[row("", 10.0), row("A", 20.0)]);

        assert_eq!(acc.code_count(), 1);
        assert!(acc.stats("").is_none());
    }
}
