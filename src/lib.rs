//! # layout-refine
//!
//! Geometric post-processing for document-understanding model output.
//!
//! Three pure operations sit at the heart of the crate:
//!
//! - [`processors::deduplicate_regions`] drops layout regions that are nested inside, or
//!   nearly coincide with, a taller region.
//! - [`processors::sort_regions`] puts the surviving regions into reading order.
//! - [`processors::reconstruct_characters`] splits a recognized word's box into per-character
//!   boxes using the recognizer's column segmentation.
//!
//! The [`pipeline`] module wraps them into page-level post-processors configured through
//! [`core::PipelineConfig`], and the `layout-refine-server` binary exposes those over a CLI
//! and an HTTP API.
//!
//! ## Example
//!
//! ```
//! use layout_refine::prelude::*;
//!
//! let regions = vec![
//!     Region::from_flat(&[0.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0, 100.0], 1, 0.9)?,
//!     Region::from_flat(&[10.0, 10.0, 50.0, 10.0, 50.0, 50.0, 10.0, 50.0], 1, 0.8)?,
//! ];
//! let kept = deduplicate_regions(regions, 0.8)?;
//! assert_eq!(kept.len(), 1);
//! # Ok::<(), layout_refine::core::RefineError>(())
//! ```

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Commonly used types and functions.
pub mod prelude {
    pub use crate::core::{
        FailurePolicy, LayoutConfig, OcrConfig, ParallelPolicy, PipelineConfig, RefineError,
        RefineResult,
    };
    pub use crate::domain::{
        CharRecord, CharacterBox, CharacterGroup, LayoutCategory, Quad, RawRegion, RawWord,
        Region, SegmentationHint, WordDetection,
    };
    pub use crate::pipeline::{
        LayoutPage, LayoutPageResult, LayoutPostprocessor, OcrPage, OcrPageResult,
        OcrPostprocessor,
    };
    pub use crate::processors::{
        AxisAlignedBox, SortPolicy, deduplicate_regions, reconstruct_character_boxes,
        reconstruct_characters, sort_regions,
    };
}
