//! Layout post-processing: deduplication followed by reading-order sorting.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::core::{
    ConfigValidator, LayoutConfig, ParallelPolicy, ProcessingStage, RefineError, RefineResult,
};
use crate::domain::{RawRegion, Region};
use crate::pipeline::{LayoutPage, LayoutPageResult, ensure_unique_ids};
use crate::processors::dedup::retain_survivors;
use crate::processors::reading_order::sort_keyed;
use crate::processors::{overlap_removal_indices, region_bounds};

/// Post-processor for layout detector output.
#[derive(Debug, Clone)]
pub struct LayoutPostprocessor {
    config: LayoutConfig,
    parallel: ParallelPolicy,
}

impl LayoutPostprocessor {
    /// Creates a post-processor from validated configuration.
    pub fn new(config: LayoutConfig, parallel: ParallelPolicy) -> RefineResult<Self> {
        config.validate()?;
        parallel.validate()?;
        Ok(Self { config, parallel })
    }

    /// Deduplicates and sorts the regions of one page.
    ///
    /// Each region is reduced to its bounds once; deduplication and sorting share them.
    /// Geometry errors name the page and the index of the offending region.
    pub fn process_page(
        &self,
        image_id: &str,
        regions: Vec<Region>,
    ) -> RefineResult<LayoutPageResult> {
        let parsed = regions.len();
        if parsed > self.config.max_regions_warning {
            warn!(
                "page '{}' has {} regions, above the limit of {}; deduplication is quadratic",
                image_id, parsed, self.config.max_regions_warning
            );
        }

        let boxes = region_bounds(image_id, &regions)?;
        let removed_indices = overlap_removal_indices(&boxes, self.config.overlap_threshold);
        let paired: Vec<_> = boxes.into_iter().zip(regions).collect();
        let keyed = retain_survivors(paired, &removed_indices);
        let removed = removed_indices.len();
        let layout_dets = sort_keyed(keyed, self.config.sort_policy);

        info!(
            "page '{}': parsed {} layout regions, removed {} overlapping",
            image_id, parsed, removed
        );

        Ok(LayoutPageResult {
            layout_dets,
            removed,
        })
    }

    /// Validates the raw detections of one page and processes them.
    ///
    /// A malformed detection fails the page with its image id and region index.
    pub fn process(&self, page: LayoutPage) -> RefineResult<LayoutPageResult> {
        let regions = page
            .layout_dets
            .into_iter()
            .enumerate()
            .map(|(index, raw)| validate_region(&page.image_id, index, raw))
            .collect::<RefineResult<Vec<_>>>()?;
        self.process_page(&page.image_id, regions)
    }

    /// Processes a batch of pages, keyed by image id.
    ///
    /// Batches above the configured page threshold are spread over the rayon pool.
    /// Duplicate image ids and the first failing page abort the batch.
    pub fn process_pages(
        &self,
        pages: Vec<LayoutPage>,
    ) -> RefineResult<BTreeMap<String, LayoutPageResult>> {
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

fn validate_region(image_id: &str, index: usize, raw: RawRegion) -> RefineResult<Region> {
    raw.into_region().map_err(|e| {
        let stage = match e {
            RefineError::InvalidGeometry { .. } => ProcessingStage::Geometry,
            _ => ProcessingStage::Assembly,
        };
        RefineError::at_item(stage, image_id, index, e)
    })
}

impl Default for LayoutPostprocessor {
    fn default() -> Self {
        Self {
            config: LayoutConfig::default(),
            parallel: ParallelPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::{BoundingBox, SortPolicy};

    fn region(x1: f32, y1: f32, x2: f32, y2: f32, category_id: u32) -> RawRegion {
        RawRegion {
            poly: vec![x1, y1, x2, y1, x2, y2, x1, y2],
            category_id: f64::from(category_id),
            score: 0.9,
        }
    }

    fn sample_page(image_id: &str) -> LayoutPage {
        LayoutPage::new(
            image_id,
            vec![
                region(0.0, 300.0, 500.0, 400.0, 1),
                region(10.0, 310.0, 490.0, 350.0, 1),
                region(0.0, 0.0, 500.0, 60.0, 0),
                region(0.0, 100.0, 500.0, 250.0, 5),
            ],
        )
    }

    #[test]
    fn test_process_deduplicates_then_sorts() {
        let result = LayoutPostprocessor::default()
            .process(sample_page("p1"))
            .unwrap();
        assert_eq!(result.removed, 1);
        assert_eq!(result.parsed(), 4);
        let ids: Vec<u32> = result.layout_dets.iter().map(|r| r.category_id).collect();
        assert_eq!(ids, vec![0, 5, 1]);
    }

    #[test]
    fn test_sort_policy_is_configurable() {
        let config = LayoutConfig::default().with_sort_policy(SortPolicy::ByLeftX);
        let processor = LayoutPostprocessor::new(config, ParallelPolicy::default()).unwrap();
        let result = processor
            .process(LayoutPage::new(
                "p",
                vec![region(50.0, 0.0, 60.0, 10.0, 0), region(0.0, 90.0, 10.0, 99.0, 1)],
            ))
            .unwrap();
        let ids: Vec<u32> = result.layout_dets.iter().map(|r| r.category_id).collect();
        assert_eq!(ids, vec![1, 0]);
    }

    #[test]
    fn test_process_pages_keyed_by_image_id() {
        let pages: Vec<LayoutPage> = (0..6).map(|i| sample_page(&format!("img-{i}"))).collect();
        // Six pages exceed the default threshold of four, so this runs on rayon.
        let results = LayoutPostprocessor::default().process_pages(pages).unwrap();
        assert_eq!(results.len(), 6);
        for result in results.values() {
            assert_eq!(result.layout_dets.len(), 3);
        }
        assert!(results.contains_key("img-5"));
    }

    #[test]
    fn test_malformed_region_names_page_and_index() {
        let mut page = sample_page("broken-page");
        page.layout_dets.push(RawRegion {
            poly: Vec::new(),
            category_id: 2.0,
            score: 0.1,
        });
        let err = LayoutPostprocessor::default().process(page).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("broken-page"), "{message}");
        assert!(message.contains("index 4"), "{message}");
        assert!(err.is_input_error());
    }

    #[test]
    fn test_malformed_polygon_from_json_names_page_and_index() {
        let page: LayoutPage = serde_json::from_str(
            r#"{"image_id": "scan-7", "layout_dets": [
                {"poly": [0, 0, 10, 0, 10, 10, 0, 10], "category_id": 1, "score": 0.9},
                {"poly": [1], "category_id": 1.0, "score": 0.8}
            ]}"#,
        )
        .unwrap();
        match LayoutPostprocessor::default().process(page).unwrap_err() {
            RefineError::AtItem {
                stage,
                page,
                index,
                source,
            } => {
                assert_eq!(stage, ProcessingStage::Geometry);
                assert_eq!(page, "scan-7");
                assert_eq!(index, 1);
                assert!(matches!(*source, RefineError::InvalidGeometry { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_out_of_range_score_names_region() {
        let mut page = sample_page("p");
        page.layout_dets[2].score = 1.5;
        let err = LayoutPostprocessor::default().process(page).unwrap_err();
        assert!(matches!(
            err,
            RefineError::AtItem {
                stage: ProcessingStage::Assembly,
                index: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_process_page_accepts_validated_regions() {
        let regions = vec![
            Region::new(BoundingBox::from_coords(0.0, 50.0, 10.0, 60.0), 1, 0.9).unwrap(),
            Region::new(BoundingBox::from_coords(0.0, 0.0, 10.0, 10.0), 0, 0.9).unwrap(),
        ];
        let result = LayoutPostprocessor::default()
            .process_page("direct", regions)
            .unwrap();
        let ids: Vec<u32> = result.layout_dets.iter().map(|r| r.category_id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(result.removed, 0);
    }

    #[test]
    fn test_duplicate_image_ids_rejected() {
        let pages = vec![sample_page("same"), sample_page("other"), sample_page("same")];
        let err = LayoutPostprocessor::default()
            .process_pages(pages)
            .unwrap_err();
        match err {
            RefineError::AtItem {
                stage, page, index, ..
            } => {
                assert_eq!(stage, ProcessingStage::Assembly);
                assert_eq!(page, "same");
                assert_eq!(index, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LayoutConfig::default().with_overlap_threshold(2.0);
        assert!(LayoutPostprocessor::new(config, ParallelPolicy::default()).is_err());
    }
}
