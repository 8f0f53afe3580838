//! Configuration for the CLI and HTTP server.

use std::path::PathBuf;

use clap::Args;
use layout_refine::core::{ConfigError, ConfigValidator, FailurePolicy, PipelineConfig};
use layout_refine::processors::SortPolicy;
use tracing::info;

/// Pipeline settings shared by every subcommand.
///
/// A configuration file, when given, is loaded first; individual flags override it.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Path to a JSON pipeline configuration file
    #[arg(long, env = "LAYOUT_REFINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overlap ratio at which the shorter of two regions is dropped
    #[arg(long, env = "LAYOUT_REFINE_OVERLAP_THRESHOLD")]
    pub overlap_threshold: Option<f32>,

    /// Reading order (by_left_x, by_top_y, by_top_then_left)
    #[arg(long, env = "LAYOUT_REFINE_SORT_POLICY")]
    pub sort_policy: Option<SortPolicy>,

    /// Handling of invalid words (abort, skip)
    #[arg(long, env = "LAYOUT_REFINE_FAILURE_POLICY")]
    pub failure_policy: Option<FailurePolicy>,

    /// Keep style markers such as <b> in recognized text
    #[arg(long, env = "LAYOUT_REFINE_KEEP_STYLE_TAGS")]
    pub keep_style_tags: bool,

    /// Number of worker threads (defaults to number of CPUs)
    #[arg(long, env = "LAYOUT_REFINE_WORKERS")]
    pub workers: Option<usize>,
}

impl ConfigArgs {
    /// Builds the validated pipeline configuration.
    pub fn load(&self) -> Result<PipelineConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                PipelineConfig::from_json_file(path)?
            }
            None => PipelineConfig::default(),
        };

        if let Some(threshold) = self.overlap_threshold {
            config.layout.overlap_threshold = threshold;
        }
        if let Some(policy) = self.sort_policy {
            config.layout.sort_policy = policy;
        }
        if let Some(policy) = self.failure_policy {
            config.ocr.failure_policy = policy;
        }
        if self.keep_style_tags {
            config.ocr.strip_style_tags = false;
        }
        if self.workers.is_some() {
            config.parallel.max_threads = self.workers;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub pipeline: PipelineConfig,
    pub host: String,
    pub port: u16,
}
