//! Input and output records of the page post-processors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{CharRecord, RawRegion, RawWord, Region};

/// Layout detector output for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPage {
    /// Identifier of the page image; results are keyed by it.
    pub image_id: String,
    /// Detected regions in detector order, validated when the page is processed.
    pub layout_dets: Vec<RawRegion>,
}

impl LayoutPage {
    pub fn new(image_id: impl Into<String>, layout_dets: Vec<RawRegion>) -> Self {
        Self {
            image_id: image_id.into(),
            layout_dets,
        }
    }
}

/// Deduplicated regions of one page, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPageResult {
    /// Surviving regions.
    pub layout_dets: Vec<Region>,
    /// Number of regions dropped as duplicates.
    pub removed: usize,
}

impl LayoutPageResult {
    /// Number of regions the detector reported before deduplication.
    pub fn parsed(&self) -> usize {
        self.layout_dets.len() + self.removed
    }
}

impl fmt::Display for LayoutPageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Regions: {} kept, {} removed of {}",
            self.layout_dets.len(),
            self.removed,
            self.parsed()
        )?;
        for (index, region) in self.layout_dets.iter().enumerate() {
            let bbox = &region.polygon;
            writeln!(
                f,
                "  {}: {} ({:.2}) [{:.0}, {:.0}, {:.0}, {:.0}]",
                index,
                region.category().as_str(),
                region.score,
                bbox.x_min(),
                bbox.y_min(),
                bbox.x_max(),
                bbox.y_max()
            )?;
        }
        Ok(())
    }
}

/// Text engine output for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrPage {
    /// Identifier of the page image; results are keyed by it.
    pub image_id: String,
    /// Recognized text lines.
    #[serde(default)]
    pub text: Vec<String>,
    /// Quadrilaterals of the text lines, when the engine reported them.
    #[serde(default)]
    pub text_region: Option<Vec<[[f32; 2]; 4]>>,
    /// Recognized words with their segmentation hints.
    #[serde(default)]
    pub words: Vec<RawWord>,
    /// Markdown rendering of a recognized table, if any.
    #[serde(default)]
    pub table_markdown: Option<String>,
}

/// Character-level OCR result of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrPageResult {
    /// Recognized text lines, unchanged.
    pub text: Vec<String>,
    /// Text line quadrilaterals, unchanged.
    pub bbox: Option<Vec<[[f32; 2]; 4]>>,
    /// Flattened character boxes of every reconstructed word, in word order.
    pub chars: Vec<CharRecord>,
    /// Table markdown, empty when the page had none.
    pub table_markdown: String,
    /// Indices of words dropped under the skip policy.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_words: Vec<usize>,
}

impl fmt::Display for OcrPageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Text lines: {}", self.text.len())?;
        for line in &self.text {
            writeln!(f, "  {line}")?;
        }
        writeln!(f, "Characters: {}", self.chars.len())?;
        for record in &self.chars {
            writeln!(
                f,
                "  {:?} x={:.2} y={:.2} w={:.2} h={:.2}",
                record.text, record.x, record.y, record.width, record.height
            )?;
        }
        if !self.skipped_words.is_empty() {
            writeln!(f, "Skipped words: {:?}", self.skipped_words)?;
        }
        if !self.table_markdown.is_empty() {
            writeln!(f, "Table:\n{}", self.table_markdown)?;
        }
        Ok(())
    }
}
