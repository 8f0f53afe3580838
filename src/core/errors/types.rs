//! Core error types for the post-processing engine.
//!
//! This module defines the fundamental error types used throughout the crate,
//! including the main [`RefineError`] enum and the [`ProcessingStage`] enum.
//! Geometry and segmentation failures are local input-validation errors: they
//! indicate the upstream model output violated its contract and are never retried.

use thiserror::Error;

/// Enum representing the different stages of post-processing.
///
/// This enum is used to identify which stage an error occurred in, providing
/// context for debugging upstream model regressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Polygon reduction and box validation.
    Geometry,
    /// Word-to-character box reconstruction.
    CharacterReconstruction,
    /// Page conversion and batch assembly.
    Assembly,
    /// Configuration loading or thread pool setup.
    Configuration,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Geometry => write!(f, "geometry"),
            ProcessingStage::CharacterReconstruction => write!(f, "character reconstruction"),
            ProcessingStage::Assembly => write!(f, "assembly"),
            ProcessingStage::Configuration => write!(f, "configuration"),
        }
    }
}

/// Enum representing the errors that can occur while refining model output.
#[derive(Error, Debug)]
pub enum RefineError {
    /// A polygon or box is malformed: too few points, non-finite coordinates,
    /// or `min > max` after reduction.
    #[error("invalid geometry: {message}")]
    InvalidGeometry {
        /// A message describing the malformed geometry.
        message: String,
    },

    /// Segmentation hints cannot be reconciled with the recognized word.
    #[error("invalid segmentation: {message}")]
    InvalidSegmentation {
        /// A message describing the inconsistent hint.
        message: String,
    },

    /// A non-geometric field (score, category id) is out of its documented range.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error that occurred outside input validation, such as thread pool setup.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An item-level failure annotated with the page and item index that caused it.
    #[error("{stage} failed for page '{page}' at index {index}: {source}")]
    AtItem {
        /// The stage where the item failed.
        stage: ProcessingStage,
        /// Identifier of the page or image the item belongs to.
        page: String,
        /// Index of the region or word within the page.
        index: usize,
        /// The validation error raised for the item.
        #[source]
        source: Box<RefineError>,
    },

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("json")]
    Json(#[from] serde_json::Error),
}

impl From<crate::core::config::ConfigError> for RefineError {
    /// Converts a ConfigError to RefineError::ConfigError.
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}

impl RefineError {
    /// Creates an [`RefineError::InvalidGeometry`] error.
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }

    /// Creates an [`RefineError::InvalidSegmentation`] error.
    pub fn invalid_segmentation(message: impl Into<String>) -> Self {
        Self::InvalidSegmentation {
            message: message.into(),
        }
    }

    /// Creates an [`RefineError::InvalidInput`] error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Annotates an item-level error with the page and index that produced it.
    ///
    /// Errors that already carry item context are returned unchanged so that the
    /// innermost location wins.
    pub fn at_item(
        stage: ProcessingStage,
        page: impl Into<String>,
        index: usize,
        source: RefineError,
    ) -> Self {
        if matches!(source, RefineError::AtItem { .. }) {
            return source;
        }
        Self::AtItem {
            stage,
            page: page.into(),
            index,
            source: Box::new(source),
        }
    }

    /// Wraps a thread pool or runtime setup failure.
    pub fn processing(
        kind: ProcessingStage,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Returns true when the error stems from caller-supplied data rather than
    /// from the environment.
    pub fn is_input_error(&self) -> bool {
        match self {
            RefineError::InvalidGeometry { .. }
            | RefineError::InvalidSegmentation { .. }
            | RefineError::InvalidInput { .. }
            | RefineError::Json(_) => true,
            RefineError::AtItem { source, .. } => source.is_input_error(),
            _ => false,
        }
    }
}

/// Convenience alias used across the crate.
pub type RefineResult<T> = Result<T, RefineError>;
