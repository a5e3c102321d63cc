//! Screening Pipeline
//!
//! ## Three-Phase Architecture
//!
//! ```text
//! PHASE 1: Chunked ingest (header resolution, validation, accumulators)
//! PHASE 2: Fraud scoring (z-scores, isolation forest, composite)
//! PHASE 3: Report generation (two CSVs, analysis report, log)
//! ```
//!
//! Benchmarks and rollups build incrementally during phase 1, but the
//! validated rows themselves stay buffered in memory: every row's
//! z-score needs its code's full-file statistics, so scoring cannot
//! start until ingest finishes. Memory scales with the number of valid
//! rows, not with the raw file size.

use std::path::Path;

use tracing::warn;

use crate::benchmarks::BenchmarkAccumulator;
use crate::config::DetectorConfig;
use crate::error::PipelineError;
use crate::ingest::{validate_chunk, ChunkReader, ColumnMap, IngestStats, RawChunk};
use crate::ml;
use crate::report::{
    fmt_count, fmt_money, write_detailed_anomalies, write_provider_results, write_text_report,
    ProcessingLog, ReportContext, ANOMALIES_CSV, REPORT_TXT, RESULTS_CSV,
};
use crate::rollup::RollupAccumulator;
use crate::scoring::{compute_z_scores, score_rows};
use crate::summary::build_provider_summary;
use crate::types::{ClaimRow, ScoredClaim};

/// Headline figures returned to the caller after a successful run.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub total_transactions: usize,
    pub elevated_providers: usize,
    pub anomalous_transactions: usize,
}

/// End-to-end screening pipeline over one claims extract.
pub struct ScreeningPipeline {
    cfg: DetectorConfig,
    benchmarks: BenchmarkAccumulator,
    rollups: RollupAccumulator,
    rows: Vec<ClaimRow>,
    stats: IngestStats,
    log: ProcessingLog,
}

impl ScreeningPipeline {
    /// Set up a pipeline, creating the output directory and its log.
    /// Rejects out-of-range configuration before anything is written.
    pub fn new(cfg: DetectorConfig) -> Result<Self, PipelineError> {
        cfg.validate()?;
        let log = ProcessingLog::create(&cfg.report.output_dir)?;
        Ok(Self {
            cfg,
            benchmarks: BenchmarkAccumulator::new(),
            rollups: RollupAccumulator::new(),
            rows: Vec::new(),
            stats: IngestStats::default(),
            log,
        })
    }

    /// Run all three phases against an extract.
    pub fn run(&mut self, input: &Path) -> Result<RunSummary, PipelineError> {
        self.log
            .line(&format!("Starting processing of {}", input.display()));
        self.log.line(&format!(
            "Chunk size: {} rows",
            fmt_count(self.cfg.ingest.chunk_size as u64)
        ));

        if !input.exists() {
            let err = PipelineError::InputNotFound(input.to_path_buf());
            self.log.line(&format!("ERROR: File not found: {}", input.display()));
            return Err(err);
        }
        let size_mb = std::fs::metadata(input)?.len() as f64 / (1024.0 * 1024.0);
        self.log
            .line(&format!("File size: {} MB", fmt_money(size_mb)));

        match self.run_phases(input) {
            Ok(summary) => {
                self.log.blank();
                self.log.line("=== PROCESSING COMPLETE ===");
                Ok(summary)
            }
            Err(e) => {
                self.log.line(&format!("ERROR: {e}"));
                Err(e)
            }
        }
    }

    fn run_phases(&mut self, input: &Path) -> Result<RunSummary, PipelineError> {
        self.ingest(input)?;

        self.log.blank();
        self.log.line("=== PHASE 2: Calculating Fraud Scores ===");
        let scored = self.score()?;

        self.log.blank();
        self.log.line("=== PHASE 3: Generating Reports ===");
        self.report(&scored)
    }

    // ------------------------------------------------------------------
    // Phase 1: ingest
    // ------------------------------------------------------------------

    fn ingest(&mut self, input: &Path) -> Result<(), PipelineError> {
        self.log.blank();
        self.log
            .line("=== PHASE 1: Reading and Preprocessing Data ===");

        let mut reader = ChunkReader::open(input, self.cfg.ingest.chunk_size)?;
        while let Some(chunk) = reader.next_chunk()? {
            self.observe_chunk(&chunk);
        }

        self.log.blank();
        self.log.line(&format!(
            "Completed reading {} rows in {} chunks",
            fmt_count(self.stats.rows_read as u64),
            self.stats.chunks_read
        ));
        self.log.line(&format!(
            "Valid transactions: {}",
            fmt_count(self.stats.rows_kept as u64)
        ));
        self.log.line(&format!(
            "Unique providers: {}",
            fmt_count(self.rollups.provider_count() as u64)
        ));
        self.log.line(&format!(
            "Unique procedures: {}",
            fmt_count(self.benchmarks.code_count() as u64)
        ));
        Ok(())
    }

    /// Fold one raw chunk into the buffers and accumulators.
    ///
    /// A chunk whose header cannot be resolved is counted, logged and
    /// skipped; it never aborts the run.
    pub fn observe_chunk(&mut self, chunk: &RawChunk) {
        self.stats.chunks_read += 1;
        self.stats.rows_read += chunk.records.len();
        self.log.line(&format!(
            "Processing chunk {} ({} rows, total: {})",
            chunk.index,
            fmt_count(chunk.records.len() as u64),
            fmt_count(self.stats.rows_read as u64)
        ));

        let map = match ColumnMap::from_headers(&chunk.headers) {
            Ok(map) => map,
            Err(mismatch) => {
                self.stats.chunks_skipped += 1;
                warn!(chunk = chunk.index, "{mismatch}");
                let found: Vec<&str> = chunk.headers.iter().collect();
                self.log.line(&format!(
                    "WARNING: Missing required columns. Found: [{}]",
                    found.join(", ")
                ));
                return;
            }
        };

        let validated = validate_chunk(&chunk.records, &map);
        self.stats.rows_kept += validated.rows.len();
        self.stats.rows_dropped += validated.dropped;

        self.benchmarks.observe(&validated.rows);
        self.rollups.observe(&validated.rows);
        self.rows.extend(validated.rows);
    }

    // ------------------------------------------------------------------
    // Phase 2: scoring
    // ------------------------------------------------------------------

    fn score(&mut self) -> Result<Vec<ScoredClaim>, PipelineError> {
        if self.rows.is_empty() {
            return Err(PipelineError::EmptyDataset);
        }

        self.log.line("Calculating Z-scores for cost anomalies...");
        let z_scores = compute_z_scores(&self.rows, &self.benchmarks, &self.cfg.scoring);

        let z = self.cfg.scoring.z_score_threshold;
        let cost_flags = z_scores.iter().filter(|s| s.cost > z).count();
        let volume_flags = z_scores.iter().filter(|s| s.volume > z).count();
        self.log.line(&format!(
            "Cost anomalies detected: {}",
            fmt_count(cost_flags as u64)
        ));
        self.log.line(&format!(
            "Volume anomalies detected: {}",
            fmt_count(volume_flags as u64)
        ));

        self.log.line("Running Isolation Forest ML model...");
        if self.rows.len() > self.cfg.ml.sampling_threshold {
            self.log.line(&format!(
                "Using sample of {} rows for ML (dataset has {} rows)",
                fmt_count(self.cfg.ml.sampling_threshold as u64),
                fmt_count(self.rows.len() as u64)
            ));
        }
        let ml_flags = ml::detect_outliers(&self.rows, &self.cfg.ml);
        let ml_count = ml_flags.iter().filter(|&&f| f).count();
        self.log.line(&format!(
            "ML anomalies detected: {}",
            fmt_count(ml_count as u64)
        ));

        self.log.line("Calculating composite fraud risk scores...");
        let scored = score_rows(&self.rows, &z_scores, &ml_flags, &self.cfg.scoring);

        let high_risk = scored
            .iter()
            .filter(|c| c.fraud_risk_score > self.cfg.report.high_risk_threshold)
            .count();
        self.log.line(&format!(
            "High-risk transactions (score > {}): {}",
            self.cfg.report.high_risk_threshold,
            fmt_count(high_risk as u64)
        ));

        Ok(scored)
    }

    // ------------------------------------------------------------------
    // Phase 3: reports
    // ------------------------------------------------------------------

    fn report(&mut self, scored: &[ScoredClaim]) -> Result<RunSummary, PipelineError> {
        let summary = build_provider_summary(scored);

        self.log.line("Generating high-risk providers report...");
        let providers_written = write_provider_results(
            &self.cfg.report.output_dir,
            &summary,
            self.cfg.report.elevated_score_threshold,
        )?;
        self.log.line(&format!(
            "Saved {} high-risk providers to {RESULTS_CSV}",
            fmt_count(providers_written as u64)
        ));

        self.log.line("Generating detailed anomalies report...");
        let anomalies_written = write_detailed_anomalies(
            &self.cfg.report.output_dir,
            scored,
            self.cfg.report.high_risk_threshold,
        )?;
        self.log.line(&format!(
            "Saved {} anomalous transactions to {ANOMALIES_CSV}",
            fmt_count(anomalies_written as u64)
        ));

        self.log.line("Generating summary report...");
        let ctx = self.report_context(scored, &summary);
        write_text_report(&self.cfg.report.output_dir, &ctx)?;
        self.log.line(&format!("Saved summary report to {REPORT_TXT}"));

        Ok(RunSummary {
            total_transactions: scored.len(),
            elevated_providers: providers_written,
            anomalous_transactions: anomalies_written,
        })
    }

    fn report_context(
        &self,
        scored: &[ScoredClaim],
        summary: &[crate::summary::ProviderSummaryRow],
    ) -> ReportContext {
        let months = self.rows.iter().filter(|r| !r.claim_month.is_empty());
        let period_min = months
            .clone()
            .map(|r| r.claim_month.as_str())
            .min()
            .unwrap_or("n/a")
            .to_string();
        let period_max = months
            .map(|r| r.claim_month.as_str())
            .max()
            .unwrap_or("n/a")
            .to_string();

        let report = &self.cfg.report;
        ReportContext {
            total_transactions: scored.len(),
            unique_providers: self.rollups.provider_count(),
            unique_procedures: self.benchmarks.code_count(),
            total_spending: self.rollups.total_paid(),
            period_min,
            period_max,
            cost_anomalies: scored.iter().filter(|c| c.is_cost_anomaly).count(),
            volume_anomalies: scored.iter().filter(|c| c.is_volume_anomaly).count(),
            ml_anomalies: scored.iter().filter(|c| c.is_ml_anomaly).count(),
            high_risk_transactions: scored
                .iter()
                .filter(|c| c.fraud_risk_score > report.high_risk_threshold)
                .count(),
            critical_risk_transactions: scored
                .iter()
                .filter(|c| c.fraud_risk_score > report.critical_risk_threshold)
                .count(),
            elevated_providers: summary
                .iter()
                .filter(|p| p.avg_fraud_risk_score > report.elevated_score_threshold)
                .count(),
            high_risk_providers: summary
                .iter()
                .filter(|p| p.avg_fraud_risk_score > report.high_risk_threshold)
                .count(),
            critical_providers: summary
                .iter()
                .filter(|p| p.avg_fraud_risk_score > report.critical_risk_threshold)
                .count(),
            top_providers: summary
                .iter()
                .filter(|p| p.avg_fraud_risk_score > report.elevated_score_threshold)
                .take(10)
                .cloned()
                .collect(),
            z_threshold: self.cfg.scoring.z_score_threshold,
            elevated_threshold: report.elevated_score_threshold,
            high_risk_threshold: report.high_risk_threshold,
            critical_risk_threshold: report.critical_risk_threshold,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    pub fn rows(&self) -> &[ClaimRow] {
        &self.rows
    }

    pub fn benchmarks(&self) -> &BenchmarkAccumulator {
        &self.benchmarks
    }

    pub fn rollups(&self) -> &RollupAccumulator {
        &self.rollups
    }
}
