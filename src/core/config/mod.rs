//! Configuration management for the post-processing pipeline.
//!
//! This module provides configuration types, validation traits, and utilities
//! for loading pipeline settings.

pub mod errors;
pub mod parallel;
pub mod pipeline;

// Re-export commonly used types
pub use errors::{ConfigError, ConfigValidator};
pub use parallel::ParallelPolicy;
pub use pipeline::{FailurePolicy, LayoutConfig, OcrConfig, PipelineConfig};
