//! Report Generation
//!
//! The four run artifacts: high-risk provider CSV, detailed anomaly CSV,
//! human-readable analysis report and the timestamped processing log.
//! All land in the configured output directory under fixed names so
//! downstream tooling can pick them up without configuration.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;
use tracing::info;

use crate::error::PipelineError;
use crate::summary::ProviderSummaryRow;
use crate::types::ScoredClaim;

pub const RESULTS_CSV: &str = "fraud_detection_results.csv";
pub const ANOMALIES_CSV: &str = "detailed_anomalies.csv";
pub const REPORT_TXT: &str = "fraud_analysis_report.txt";
pub const LOG_TXT: &str = "processing_log.txt";

// ============================================================================
// Processing Log
// ============================================================================

/// Timestamped run log, mirrored to tracing.
///
/// Every line is flushed as written so the log survives a mid-run abort.
/// Write failures are ignored; the run never fails over its own log.
pub struct ProcessingLog {
    writer: BufWriter<File>,
}

impl ProcessingLog {
    /// Create (or truncate) the log file inside `output_dir`, creating
    /// the directory if needed.
    pub fn create(output_dir: &Path) -> Result<Self, PipelineError> {
        std::fs::create_dir_all(output_dir)?;
        let file = File::create(output_dir.join(LOG_TXT))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Append one timestamped line.
    pub fn line(&mut self, message: &str) {
        info!("{message}");
        let stamped = format!("[{}] {message}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(self.writer, "{stamped}").and_then(|()| self.writer.flush());
    }

    /// Append an unstamped blank line between sections.
    pub fn blank(&mut self) {
        let _ = writeln!(self.writer).and_then(|()| self.writer.flush());
    }
}

// ============================================================================
// CSV Artifacts
// ============================================================================

/// Must match the serde field order of [`ProviderSummaryRow`].
pub const PROVIDER_CSV_HEADER: [&str; 9] = [
    "provider_npi",
    "avg_fraud_risk_score",
    "total_spending",
    "total_claims",
    "total_beneficiaries",
    "cost_anomaly_count",
    "volume_anomaly_count",
    "ml_anomaly_count",
    "total_anomalies",
];

/// Must match the serde field order of [`ScoredClaim`].
pub const ANOMALY_CSV_HEADER: [&str; 15] = [
    "billing_npi",
    "servicing_npi",
    "procedure_code",
    "claim_month",
    "beneficiaries",
    "claims",
    "paid",
    "cost_per_claim",
    "claims_per_beneficiary",
    "cost_z_score",
    "claims_per_ben_z_score",
    "is_cost_anomaly",
    "is_volume_anomaly",
    "is_ml_anomaly",
    "fraud_risk_score",
];

/// Write providers whose mean score exceeds `elevated_threshold`,
/// preserving the summary's descending order. Returns the row count.
///
/// The header row is written explicitly so an empty result still
/// produces a well-formed CSV.
pub fn write_provider_results(
    output_dir: &Path,
    summary: &[ProviderSummaryRow],
    elevated_threshold: f64,
) -> Result<usize, PipelineError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output_dir.join(RESULTS_CSV))?;
    writer.write_record(PROVIDER_CSV_HEADER)?;

    let mut written = 0;
    for row in summary
        .iter()
        .filter(|r| r.avg_fraud_risk_score > elevated_threshold)
    {
        writer.serialize(row)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Write every transaction carrying a detector flag or scoring above
/// `high_risk_threshold`, descending by score. Returns the row count.
pub fn write_detailed_anomalies(
    output_dir: &Path,
    scored: &[ScoredClaim],
    high_risk_threshold: f64,
) -> Result<usize, PipelineError> {
    let mut anomalies: Vec<&ScoredClaim> = scored
        .iter()
        .filter(|c| c.has_anomaly_flag() || c.fraud_risk_score > high_risk_threshold)
        .collect();
    anomalies.sort_by(|a, b| b.fraud_risk_score.total_cmp(&a.fraud_risk_score));

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output_dir.join(ANOMALIES_CSV))?;
    writer.write_record(ANOMALY_CSV_HEADER)?;
    for claim in &anomalies {
        writer.serialize(claim)?;
    }
    writer.flush()?;
    Ok(anomalies.len())
}

// ============================================================================
// Text Report
// ============================================================================

/// Everything the analysis report needs, gathered by the pipeline.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub total_transactions: usize,
    pub unique_providers: usize,
    pub unique_procedures: usize,
    pub total_spending: f64,
    pub period_min: String,
    pub period_max: String,
    pub cost_anomalies: usize,
    pub volume_anomalies: usize,
    pub ml_anomalies: usize,
    pub high_risk_transactions: usize,
    pub critical_risk_transactions: usize,
    pub elevated_providers: usize,
    pub high_risk_providers: usize,
    pub critical_providers: usize,
    /// Highest-risk providers, already sorted, at most ten.
    pub top_providers: Vec<ProviderSummaryRow>,
    pub z_threshold: f64,
    pub elevated_threshold: f64,
    pub high_risk_threshold: f64,
    pub critical_risk_threshold: f64,
}

/// Write the human-readable analysis report.
pub fn write_text_report(output_dir: &Path, ctx: &ReportContext) -> Result<(), PipelineError> {
    let file = File::create(output_dir.join(REPORT_TXT))?;
    let mut w = BufWriter::new(file);

    let heavy = "=".repeat(80);
    let light = "-".repeat(80);

    writeln!(w, "{heavy}")?;
    writeln!(w, "MEDICAID FRAUD DETECTION ANALYSIS REPORT")?;
    writeln!(w, "{heavy}")?;
    writeln!(w)?;
    writeln!(
        w,
        "Analysis Date: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(w)?;

    writeln!(w, "DATASET SUMMARY")?;
    writeln!(w, "{light}")?;
    writeln!(
        w,
        "Total Transactions: {}",
        fmt_count(ctx.total_transactions as u64)
    )?;
    writeln!(
        w,
        "Unique Providers: {}",
        fmt_count(ctx.unique_providers as u64)
    )?;
    writeln!(
        w,
        "Unique Procedures: {}",
        fmt_count(ctx.unique_procedures as u64)
    )?;
    writeln!(w, "Total Spending: ${}", fmt_money(ctx.total_spending))?;
    writeln!(w, "Date Range: {} to {}", ctx.period_min, ctx.period_max)?;
    writeln!(w)?;

    writeln!(w, "FRAUD DETECTION RESULTS")?;
    writeln!(w, "{light}")?;
    writeln!(
        w,
        "Cost Anomalies (Z-score > {}): {} ({:.2}%)",
        ctx.z_threshold,
        fmt_count(ctx.cost_anomalies as u64),
        pct(ctx.cost_anomalies, ctx.total_transactions)
    )?;
    writeln!(
        w,
        "Volume Anomalies (Z-score > {}): {} ({:.2}%)",
        ctx.z_threshold,
        fmt_count(ctx.volume_anomalies as u64),
        pct(ctx.volume_anomalies, ctx.total_transactions)
    )?;
    writeln!(
        w,
        "ML-Detected Anomalies: {} ({:.2}%)",
        fmt_count(ctx.ml_anomalies as u64),
        pct(ctx.ml_anomalies, ctx.total_transactions)
    )?;
    writeln!(
        w,
        "High-Risk Transactions (score > {}): {}",
        ctx.high_risk_threshold,
        fmt_count(ctx.high_risk_transactions as u64)
    )?;
    writeln!(
        w,
        "Critical-Risk Transactions (score > {}): {}",
        ctx.critical_risk_threshold,
        fmt_count(ctx.critical_risk_transactions as u64)
    )?;
    writeln!(w)?;

    writeln!(w, "HIGH-RISK PROVIDERS")?;
    writeln!(w, "{light}")?;
    writeln!(
        w,
        "Providers with avg risk score > {}: {}",
        ctx.elevated_threshold,
        fmt_count(ctx.elevated_providers as u64)
    )?;
    writeln!(
        w,
        "Providers with avg risk score > {}: {}",
        ctx.high_risk_threshold,
        fmt_count(ctx.high_risk_providers as u64)
    )?;
    writeln!(
        w,
        "Providers with avg risk score > {}: {}",
        ctx.critical_risk_threshold,
        fmt_count(ctx.critical_providers as u64)
    )?;
    writeln!(w)?;

    writeln!(w, "TOP 10 HIGHEST RISK PROVIDERS")?;
    writeln!(w, "{light}")?;
    for provider in &ctx.top_providers {
        writeln!(w)?;
        writeln!(w, "Provider NPI: {}", provider.provider_npi)?;
        writeln!(w, "  Risk Score: {:.1}", provider.avg_fraud_risk_score)?;
        writeln!(
            w,
            "  Total Spending: ${}",
            fmt_money(provider.total_spending)
        )?;
        writeln!(
            w,
            "  Total Claims: {}",
            fmt_count_i64(provider.total_claims)
        )?;
        writeln!(w, "  Anomalies: {}", fmt_count(provider.total_anomalies))?;
    }
    writeln!(w)?;

    writeln!(w, "{heavy}")?;
    writeln!(w, "END OF REPORT")?;
    writeln!(w, "{heavy}")?;
    w.flush()?;
    Ok(())
}

// ============================================================================
// Number Formatting
// ============================================================================

/// Thousands-grouped unsigned count.
pub fn fmt_count(n: u64) -> String {
    group_digits(&n.to_string())
}

/// Thousands-grouped signed count.
pub fn fmt_count_i64(n: i64) -> String {
    if n < 0 {
        format!("-{}", group_digits(&n.unsigned_abs().to_string()))
    } else {
        group_digits(&n.to_string())
    }
}

/// Thousands-grouped money amount with two decimals.
pub fn fmt_money(v: f64) -> String {
    let s = format!("{v:.2}");
    match s.split_once('.') {
        Some((int_part, frac)) => {
            let (sign, digits) = match int_part.strip_prefix('-') {
                Some(rest) => ("-", rest),
                None => ("", int_part),
            };
            format!("{sign}{}.{frac}", group_digits(digits))
        }
        None => s,
    }
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

// ============================================================================
// Tests
// ============================================================================
