//! CLAIMSCOPE: Medicaid Claims Fraud Screening
//!
//! Chunked aggregation and anomaly scoring over large Medicaid claims
//! extracts.
//!
//! ## Architecture
//!
//! - **Ingest**: Streaming chunked CSV read with per-chunk header
//!   resolution and row validation
//! - **Accumulators**: Per-code benchmarks (Welford) and per-provider
//!   rollups built incrementally during ingest
//! - **Scoring**: Z-score screening, isolation forest outlier pass and
//!   a capped composite risk score per transaction
//! - **Reporting**: Provider and anomaly CSVs, analysis report and a
//!   timestamped processing log

pub mod benchmarks;
pub mod config;
pub mod error;
pub mod ingest;
pub mod ml;
pub mod pipeline;
pub mod report;
pub mod rollup;
pub mod scoring;
pub mod summary;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, DetectorConfig};

// Re-export the pipeline entry points
pub use pipeline::{RunSummary, ScreeningPipeline};

// Re-export commonly used types
pub use error::PipelineError;
pub use types::{ClaimRow, ScoredClaim};

// Re-export the streaming accumulators
pub use benchmarks::BenchmarkAccumulator;
pub use rollup::RollupAccumulator;
