//! The core module of the post-processing engine.
//!
//! This module contains the fundamental components shared by every stage:
//! - Configuration management
//! - Error handling
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod config;
pub mod errors;

pub use config::{
    ConfigError, ConfigValidator, FailurePolicy, LayoutConfig, OcrConfig, ParallelPolicy,
    PipelineConfig,
};
pub use errors::{ProcessingStage, RefineError, RefineResult};
