//! Configuration for the layout and OCR post-processors.
//!
//! Configuration values are plain data passed to the post-processors when they are
//! built; nothing in the crate reads process-wide settings.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::errors::{ConfigError, ConfigValidator};
use super::parallel::ParallelPolicy;
use crate::processors::SortPolicy;

/// Settings for layout post-processing (deduplication and reading order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Minimum `intersection / smaller area` ratio at which the shorter region is dropped.
    pub overlap_threshold: f32,
    /// Reading-order policy applied after deduplication.
    pub sort_policy: SortPolicy,
    /// Pages with more regions than this log a warning about the quadratic
    /// deduplication cost.
    pub max_regions_warning: usize,
}

impl LayoutConfig {
    /// Default overlap ratio threshold.
    pub const DEFAULT_OVERLAP_THRESHOLD: f32 = 0.8;

    /// Sets the overlap threshold.
    pub fn with_overlap_threshold(mut self, threshold: f32) -> Self {
        self.overlap_threshold = threshold;
        self
    }

    /// Sets the reading-order policy.
    pub fn with_sort_policy(mut self, policy: SortPolicy) -> Self {
        self.sort_policy = policy;
        self
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: Self::DEFAULT_OVERLAP_THRESHOLD,
            sort_policy: SortPolicy::default(),
            max_regions_warning: 1000,
        }
    }
}

impl ConfigValidator for LayoutConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_ratio("layout.overlap_threshold", self.overlap_threshold)?;
        self.validate_positive_count("layout.max_regions_warning", self.max_regions_warning)
    }
}

/// What to do with a word whose geometry or segmentation is invalid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Fail the whole page, naming the offending word.
    #[default]
    Abort,
    /// Log the offending word, record its index and continue with the rest.
    Skip,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(FailurePolicy::Abort),
            "skip" => Ok(FailurePolicy::Skip),
            other => Err(format!(
                "unknown failure policy '{other}', expected abort or skip"
            )),
        }
    }
}

/// Settings for OCR character reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Strip recognizer style markers (`<b>`, `<sup>`, ...) from word text before grouping.
    pub strip_style_tags: bool,
    /// Per-word failure handling.
    pub failure_policy: FailurePolicy,
}

impl OcrConfig {
    /// Sets the per-word failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            strip_style_tags: true,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl ConfigValidator for OcrConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Top-level configuration for the post-processing pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Layout post-processing settings.
    pub layout: LayoutConfig,
    /// OCR post-processing settings.
    pub ocr: OcrConfig,
    /// Parallelism settings shared by both post-processors.
    pub parallel: ParallelPolicy,
}

impl PipelineConfig {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        tracing::debug!("Loaded pipeline configuration from {}", path.display());
        Ok(config)
    }
}

impl ConfigValidator for PipelineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;
        self.ocr.validate()?;
        self.parallel.validate()
    }
}
