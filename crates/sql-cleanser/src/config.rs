//! Configuration loading and validation.
//!
//! `Config` is an explicit value object: constructed once at process start
//! (usually by the CLI) and passed by reference into the components that need
//! tunables. There is no ambient global configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CleanseError, Result};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Parsing and key-inference tunables.
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Duplicate-detection tunables.
    #[serde(default)]
    pub data_quality: DataQualityConfig,
}

/// Parsing and key-inference tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Rows per table handed to the primary-key advisor as a sample.
    #[serde(default = "default_max_sample_rows")]
    pub max_sample_rows: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_sample_rows: default_max_sample_rows(),
        }
    }
}

/// Duplicate-detection tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityConfig {
    /// Whether to attempt the fuzzy (advisor-backed) duplicate phase at all.
    #[serde(default = "default_true")]
    pub enable_fuzzy_matching: bool,

    /// Similarity threshold forwarded to the advisor (0.0 to 1.0).
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Maximum rows sampled for the fuzzy phase. A bound on advisor input
    /// size, not a correctness constant.
    #[serde(default = "default_fuzzy_sample_size")]
    pub fuzzy_sample_size: usize,
}

impl Default for DataQualityConfig {
    fn default() -> Self {
        Self {
            enable_fuzzy_matching: default_true(),
            similarity_threshold: default_similarity_threshold(),
            fuzzy_sample_size: default_fuzzy_sample_size(),
        }
    }
}

fn default_max_sample_rows() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_similarity_threshold() -> f64 {
    0.8
}

fn default_fuzzy_sample_size() -> usize {
    20
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.processing.max_sample_rows == 0 {
            return Err(CleanseError::Config(
                "processing.max_sample_rows must be at least 1".to_string(),
            ));
        }
        let threshold = self.data_quality.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CleanseError::Config(format!(
                "data_quality.similarity_threshold must be between 0.0 and 1.0 (got {})",
                threshold
            )));
        }
        if self.data_quality.fuzzy_sample_size == 0 {
            return Err(CleanseError::Config(
                "data_quality.fuzzy_sample_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
