//! Page-level post-processors.
//!
//! # Main APIs
//!
//! - [`LayoutPostprocessor`] - deduplicates and orders layout regions
//! - [`OcrPostprocessor`] - reconstructs character boxes from recognized words

pub mod layout;
pub mod ocr;
pub mod result;

pub use layout::LayoutPostprocessor;
pub use ocr::OcrPostprocessor;
pub use result::{LayoutPage, LayoutPageResult, OcrPage, OcrPageResult};

use std::collections::HashMap;

use crate::core::{ProcessingStage, RefineError, RefineResult};

/// Rejects batches in which two pages share an image id, since results are keyed by it.
pub(crate) fn ensure_unique_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> RefineResult<()> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (index, id) in ids.into_iter().enumerate() {
        if let Some(first) = seen.insert(id, index) {
            return Err(RefineError::at_item(
                ProcessingStage::Assembly,
                id,
                index,
                RefineError::invalid_input(format!(
                    "duplicate image id, first seen at index {first}"
                )),
            ));
        }
    }
    Ok(())
}
