//! OCR post-processing: word-to-character box reconstruction for a page.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::core::{
    ConfigValidator, FailurePolicy, OcrConfig, ParallelPolicy, ProcessingStage, RefineError,
    RefineResult,
};
use crate::domain::{CharRecord, CharacterBox, RawWord};
use crate::pipeline::{OcrPage, OcrPageResult, ensure_unique_ids};
use crate::processors::reconstruct_character_boxes;

/// Post-processor for text engine output.
#[derive(Debug, Clone)]
pub struct OcrPostprocessor {
    config: OcrConfig,
    parallel: ParallelPolicy,
}

impl OcrPostprocessor {
    /// Creates a post-processor from validated configuration.
    pub fn new(config: OcrConfig, parallel: ParallelPolicy) -> RefineResult<Self> {
        config.validate()?;
        parallel.validate()?;
        Ok(Self { config, parallel })
    }

    fn reconstruct_word(&self, word: &RawWord) -> RefineResult<Vec<CharacterBox>> {
        let detection = word.clone().into_detection(self.config.strip_style_tags)?;
        reconstruct_character_boxes(&detection)
    }

    /// Reconstructs the character boxes of every word on a page.
    ///
    /// Under [`FailurePolicy::Abort`] the first invalid word fails the page, naming its
    /// index. Under [`FailurePolicy::Skip`] invalid words are logged and listed in
    /// [`OcrPageResult::skipped_words`].
    pub fn process(&self, page: OcrPage) -> RefineResult<OcrPageResult> {
        let OcrPage {
            image_id,
            text,
            text_region,
            words,
            table_markdown,
        } = page;

        let per_word: Vec<RefineResult<Vec<CharacterBox>>> =
            if self.parallel.parallel_words(words.len()) {
                words.par_iter().map(|w| self.reconstruct_word(w)).collect()
            } else {
                words.iter().map(|w| self.reconstruct_word(w)).collect()
            };

        let mut chars = Vec::new();
        let mut skipped_words = Vec::new();
        for (index, outcome) in per_word.into_iter().enumerate() {
            match outcome {
                Ok(boxes) => chars.extend(boxes.iter().map(CharRecord::from_box)),
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::Abort => {
                        return Err(RefineError::at_item(
                            ProcessingStage::CharacterReconstruction,
                            &image_id,
                            index,
                            e,
                        ));
                    }
                    FailurePolicy::Skip => {
                        warn!("page '{}': skipping word {}: {}", image_id, index, e);
                        skipped_words.push(index);
                    }
                },
            }
        }

        debug!(
            "page '{}': {} word(s) -> {} character(s), {} skipped",
            image_id,
            words.len(),
            chars.len(),
            skipped_words.len()
        );

        Ok(OcrPageResult {
            text,
            bbox: text_region,
            chars,
            table_markdown: table_markdown.unwrap_or_default(),
            skipped_words,
        })
    }

    /// Processes a batch of pages, keyed by image id.
    ///
    /// Duplicate image ids are rejected before any page is processed.
    pub fn process_pages(
        &self,
        pages: Vec<OcrPage>,
    ) -> RefineResult<BTreeMap<String, OcrPageResult>> {
        ensure_unique_ids(pages.iter().map(|page| page.image_id.as_str()))?;
        if self.parallel.parallel_pages(pages.len()) {
            pages
                .into_par_iter()
                .map(|page| {
                    let id = page.image_id.clone();
                    self.process(page).map(|result| (id, result))
                })
                .collect()
        } else {
            pages
                .into_iter()
                .map(|page| {
                    let id = page.image_id.clone();
                    self.process(page).map(|result| (id, result))
                })
                .collect()
        }
    }
}

impl Default for OcrPostprocessor {
    fn default() -> Self {
        Self {
            config: OcrConfig::default(),
            parallel: ParallelPolicy::default(),
        }
    }
}
