//! Detector Configuration Module
//!
//! Provides the screening configuration loaded from TOML files, replacing
//! hardcoded thresholds with analyst-tunable values.
//!
//! ## Loading Order
//!
//! 1. `CLAIMSCOPE_CONFIG` environment variable (path to TOML file)
//! 2. `claimscope.toml` in the current working directory
//! 3. Built-in defaults (matching the production screening profile)
//!
//! The config is threaded explicitly through constructors rather than held
//! in a global, so tests can run pipelines with different tunables side by
//! side.

mod detector_config;

pub use detector_config::{
    ConfigError, DetectorConfig, IngestConfig, MlConfig, ReportConfig, ScoringConfig,
    CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH,
};
