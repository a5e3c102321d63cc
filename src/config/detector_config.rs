//! Detector Configuration
//!
//! All screening tunables in one TOML-backed struct. Every field has a
//! built-in default matching the production screening profile, so a
//! missing file, a missing table or a missing key all degrade gracefully.
//!
//! Load order:
//! 1. Path named by the `CLAIMSCOPE_CONFIG` environment variable
//! 2. `./claimscope.toml`
//! 3. Built-in defaults
//!
//! # Example
//!
//! ```toml
//! [ingest]
//! chunk_size = 50000
//!
//! [scoring]
//! z_score_threshold = 3.0
//! min_code_population = 3
//! spend_quantile = 0.95
//!
//! [ml]
//! sampling_threshold = 100000
//! contamination = 0.05
//! n_estimators = 100
//! seed = 42
//!
//! [report]
//! elevated_score_threshold = 50.0
//! high_risk_threshold = 75.0
//! critical_risk_threshold = 90.0
//! output_dir = "."
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file path.
pub const CONFIG_ENV_VAR: &str = "CLAIMSCOPE_CONFIG";

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "claimscope.toml";

// ============================================================================
// Errors
// ============================================================================

/// Errors from loading or validating a detector configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    Read(String),
    /// Configuration file is not valid TOML.
    Parse(String),
    /// One or more fields failed range validation.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read(e) => write!(f, "failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "failed to parse config file: {e}"),
            Self::Validation(problems) => {
                write!(f, "invalid configuration: {}", problems.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Configuration Sections
// ============================================================================

/// Chunked ingest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Rows per chunk for the streaming CSV read.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

/// Statistical scoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Z-score above which a cost or volume flag is raised.
    #[serde(default = "default_z_score_threshold")]
    pub z_score_threshold: f64,
    /// Minimum rows a procedure code needs before z-scores are computed.
    #[serde(default = "default_min_code_population")]
    pub min_code_population: usize,
    /// Population quantile of paid amounts that marks high spending.
    #[serde(default = "default_spend_quantile")]
    pub spend_quantile: f64,
}

/// Isolation forest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MlConfig {
    /// Above this row count the scaler and forest are fitted on a sample
    /// of exactly this many rows instead of the full population.
    #[serde(default = "default_sampling_threshold")]
    pub sampling_threshold: usize,
    /// Expected outlier share, in (0, 0.5].
    #[serde(default = "default_contamination")]
    pub contamination: f64,
    /// Number of isolation trees.
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    /// RNG seed for sampling and tree construction.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// Report thresholds and output location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Mean provider score above which a provider lands in the results CSV.
    #[serde(default = "default_elevated_score_threshold")]
    pub elevated_score_threshold: f64,
    /// Row score above which a transaction counts as high-risk.
    #[serde(default = "default_high_risk_threshold")]
    pub high_risk_threshold: f64,
    /// Row score above which a transaction counts as critical-risk.
    #[serde(default = "default_critical_risk_threshold")]
    pub critical_risk_threshold: f64,
    /// Directory receiving the four output artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// Complete detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DetectorConfig {
    pub ingest: IngestConfig,
    pub scoring: ScoringConfig,
    pub ml: MlConfig,
    pub report: ReportConfig,
}

// ============================================================================
// Defaults
// ============================================================================

fn default_chunk_size() -> usize {
    50_000
}

fn default_z_score_threshold() -> f64 {
    3.0
}

fn default_min_code_population() -> usize {
    3
}

fn default_spend_quantile() -> f64 {
    0.95
}

fn default_sampling_threshold() -> usize {
    100_000
}

fn default_contamination() -> f64 {
    0.05
}

fn default_n_estimators() -> usize {
    100
}

fn default_seed() -> u64 {
    42
}

fn default_elevated_score_threshold() -> f64 {
    50.0
}

fn default_high_risk_threshold() -> f64 {
    75.0
}

fn default_critical_risk_threshold() -> f64 {
    90.0
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            z_score_threshold: default_z_score_threshold(),
            min_code_population: default_min_code_population(),
            spend_quantile: default_spend_quantile(),
        }
    }
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            sampling_threshold: default_sampling_threshold(),
            contamination: default_contamination(),
            n_estimators: default_n_estimators(),
            seed: default_seed(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            elevated_score_threshold: default_elevated_score_threshold(),
            high_risk_threshold: default_high_risk_threshold(),
            critical_risk_threshold: default_critical_risk_threshold(),
            output_dir: default_output_dir(),
        }
    }
}

// ============================================================================
// Loading and Validation
// ============================================================================

impl DetectorConfig {
    /// Load configuration from the standard lookup chain. Never fails:
    /// unreadable or invalid files log a warning and the chain continues.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            match Self::from_file(Path::new(&path)) {
                Ok(cfg) => {
                    info!(path = %path, "Loaded detector config from {CONFIG_ENV_VAR}");
                    return cfg;
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Ignoring config from {CONFIG_ENV_VAR}");
                }
            }
        }

        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            match Self::from_file(default_path) {
                Ok(cfg) => {
                    info!(path = %default_path.display(), "Loaded detector config");
                    return cfg;
                }
                Err(e) => {
                    warn!(path = %default_path.display(), error = %e, "Ignoring config file");
                }
            }
        }

        info!("Using built-in default detector config");
        Self::default()
    }

    /// Parse and validate a specific config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
        let cfg: Self = toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Range-check every tunable, collecting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.ingest.chunk_size == 0 {
            problems.push("ingest.chunk_size must be at least 1".to_string());
        }
        if !self.scoring.z_score_threshold.is_finite() || self.scoring.z_score_threshold <= 0.0 {
            problems.push("scoring.z_score_threshold must be a positive number".to_string());
        }
        if self.scoring.min_code_population < 2 {
            problems.push("scoring.min_code_population must be at least 2".to_string());
        }
        if !(self.scoring.spend_quantile > 0.0 && self.scoring.spend_quantile < 1.0) {
            problems.push("scoring.spend_quantile must lie in (0, 1)".to_string());
        }
        if self.ml.sampling_threshold == 0 {
            problems.push("ml.sampling_threshold must be at least 1".to_string());
        }
        if !(self.ml.contamination > 0.0 && self.ml.contamination <= 0.5) {
            problems.push("ml.contamination must lie in (0, 0.5]".to_string());
        }
        if self.ml.n_estimators == 0 {
            problems.push("ml.n_estimators must be at least 1".to_string());
        }
        for (name, value) in [
            (
                "report.elevated_score_threshold",
                self.report.elevated_score_threshold,
            ),
            ("report.high_risk_threshold", self.report.high_risk_threshold),
            (
                "report.critical_risk_threshold",
                self.report.critical_risk_threshold,
            ),
        ] {
            if !value.is_finite() || value <= 0.0 || value > 100.0 {
                problems.push(format!("{name} must lie in (0, 100]"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
