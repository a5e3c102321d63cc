//! Error taxonomy for the screening pipeline.
//!
//! Only two failure classes abort a run: a missing input file and an
//! unexpected runtime failure (I/O, malformed CSV structure, bad config).
//! Chunks with unresolvable headers and rows that fail validation degrade
//! data volume silently and surface only through logged counts.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline failures. Anything not represented here is handled
/// in-line (skipped chunks, dropped rows) and never aborts the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("no valid transactions after filtering; nothing to score")]
    EmptyDataset,
}
