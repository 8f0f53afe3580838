//! Removal of overlapping layout regions.
//!
//! Layout detectors often report the same element twice, or a fragment of an element
//! nested inside the element itself. For every pair of regions whose intersection covers
//! at least `threshold` of the smaller region's area, the region with the smaller vertical
//! extent is dropped.

use std::collections::BTreeSet;

use tracing::debug;

use crate::core::{ProcessingStage, RefineError, RefineResult};
use crate::domain::Region;
use crate::processors::AxisAlignedBox;

/// Computes the indices of regions to drop.
///
/// Every unordered pair `(i, j)` with `i < j` is compared, including pairs whose members
/// were already marked. When the overlap ratio reaches `threshold`, the shorter region is
/// marked; equal heights mark `j`, so the earlier region survives.
pub fn overlap_removal_indices(boxes: &[AxisAlignedBox], threshold: f32) -> BTreeSet<usize> {
    let n = boxes.len();
    let mut removed = BTreeSet::new();
    if n <= 1 {
        return removed;
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (&boxes[i], &boxes[j]);
            if a.intersection_area(b) <= 0.0 {
                continue;
            }
            let ratio = a.overlap_ratio(b);
            if ratio >= threshold {
                let drop_index = if a.height() < b.height() { i } else { j };
                debug!(
                    "regions {} and {} overlap by {:.3}, dropping {}",
                    i, j, ratio, drop_index
                );
                removed.insert(drop_index);
            }
        }
    }

    removed
}

/// Rejects overlap thresholds outside `(0, 1]`.
fn check_threshold(threshold: f32) -> RefineResult<()> {
    if threshold > 0.0 && threshold <= 1.0 {
        Ok(())
    } else {
        Err(RefineError::ConfigError {
            message: format!("overlap threshold must lie in (0, 1], got {threshold}"),
        })
    }
}

/// Removes near-duplicate regions, preserving the order of the survivors.
///
/// # Errors
///
/// * [`RefineError::ConfigError`] when `threshold` is outside `(0, 1]`.
/// * [`RefineError::InvalidGeometry`] when a region's polygon cannot be reduced to a box.
pub fn deduplicate_regions(regions: Vec<Region>, threshold: f32) -> RefineResult<Vec<Region>> {
    check_threshold(threshold)?;
    if regions.len() <= 1 {
        return Ok(regions);
    }

    let boxes = regions
        .iter()
        .map(Region::bounds)
        .collect::<RefineResult<Vec<_>>>()?;
    let removed = overlap_removal_indices(&boxes, threshold);
    if removed.is_empty() {
        return Ok(regions);
    }

    Ok(retain_survivors(regions, &removed))
}

/// Drops the items at the removed indices, keeping the order of the rest.
pub(crate) fn retain_survivors<T>(items: Vec<T>, removed: &BTreeSet<usize>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| (!removed.contains(&index)).then_some(item))
        .collect()
}

/// Reduces every region to its bounds, naming the page and index of the first failure.
pub fn region_bounds(page: &str, regions: &[Region]) -> RefineResult<Vec<AxisAlignedBox>> {
    regions
        .iter()
        .enumerate()
        .map(|(index, region)| {
            region
                .bounds()
                .map_err(|e| RefineError::at_item(ProcessingStage::Geometry, page, index, e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::BoundingBox;

    fn region(x1: f32, y1: f32, x2: f32, y2: f32) -> Region {
        Region::new(BoundingBox::from_coords(x1, y1, x2, y2), 1, 0.9).unwrap()
    }

    #[test]
    fn test_contained_region_is_removed() {
        let outer = region(0.0, 0.0, 100.0, 100.0);
        let inner = region(10.0, 10.0, 50.0, 50.0);
        let kept = deduplicate_regions(vec![outer.clone(), inner], 0.8).unwrap();
        assert_eq!(kept, vec![outer]);
    }

    #[test]
    fn test_shorter_region_is_removed_regardless_of_order() {
        let inner = region(10.0, 10.0, 50.0, 50.0);
        let outer = region(0.0, 0.0, 100.0, 100.0);
        let kept = deduplicate_regions(vec![inner, outer.clone()], 0.8).unwrap();
        assert_eq!(kept, vec![outer]);
    }

    #[test]
    fn test_low_overlap_keeps_both() {
        // Intersection is 30 of the smaller region's 100.
        let a = region(0.0, 0.0, 10.0, 10.0);
        let b = region(7.0, 0.0, 17.0, 10.0);
        let kept = deduplicate_regions(vec![a.clone(), b.clone()], 0.8).unwrap();
        assert_eq!(kept, vec![a, b]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // Intersection is exactly 80% of the smaller area.
        let a = region(0.0, 0.0, 10.0, 10.0);
        let b = region(2.0, 0.0, 12.0, 10.0);
        let kept = deduplicate_regions(vec![a.clone(), b], 0.8).unwrap();
        assert_eq!(kept, vec![a]);
    }

    #[test]
    fn test_identical_regions_keep_earlier() {
        let a = Region::new(BoundingBox::from_coords(0.0, 0.0, 10.0, 10.0), 1, 0.5).unwrap();
        let b = Region::new(BoundingBox::from_coords(0.0, 0.0, 10.0, 10.0), 3, 0.7).unwrap();
        let kept = deduplicate_regions(vec![a.clone(), b], 0.8).unwrap();
        assert_eq!(kept, vec![a]);
    }

    #[test]
    fn test_disjoint_regions_unchanged() {
        let regions = vec![
            region(0.0, 0.0, 10.0, 10.0),
            region(20.0, 0.0, 30.0, 10.0),
            region(0.0, 20.0, 10.0, 30.0),
            region(10.0, 10.0, 20.0, 20.0),
        ];
        let kept = deduplicate_regions(regions.clone(), 0.8).unwrap();
        assert_eq!(kept, regions);
    }

    #[test]
    fn test_deduplication_is_idempotent() {
        let regions = vec![
            region(0.0, 0.0, 100.0, 100.0),
            region(5.0, 5.0, 95.0, 60.0),
            region(10.0, 10.0, 20.0, 20.0),
            region(200.0, 0.0, 300.0, 40.0),
            region(205.0, 2.0, 295.0, 38.0),
            region(400.0, 400.0, 410.0, 410.0),
        ];
        let once = deduplicate_regions(regions, 0.8).unwrap();
        let twice = deduplicate_regions(once.clone(), 0.8).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_zero_area_regions_never_remove() {
        let line = region(0.0, 5.0, 100.0, 5.0);
        let point = region(50.0, 5.0, 50.0, 5.0);
        let body = region(0.0, 0.0, 100.0, 10.0);
        let kept = deduplicate_regions(vec![line.clone(), point.clone(), body.clone()], 0.8)
            .unwrap();
        assert_eq!(kept, vec![line, point, body]);
    }

    #[test]
    fn test_empty_and_single_input() {
        assert!(deduplicate_regions(Vec::new(), 0.8).unwrap().is_empty());
        let only = vec![region(0.0, 0.0, 1.0, 1.0)];
        assert_eq!(deduplicate_regions(only.clone(), 0.8).unwrap(), only);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        for threshold in [0.0, -0.5, 1.5, f32::NAN] {
            let result = deduplicate_regions(vec![region(0.0, 0.0, 1.0, 1.0)], threshold);
            assert!(matches!(result, Err(RefineError::ConfigError { .. })));
        }
    }

    #[test]
    fn test_malformed_polygon_is_rejected() {
        let broken = Region {
            polygon: BoundingBox::new(Vec::new()),
            category_id: 1,
            score: 0.5,
        };
        let regions = vec![region(0.0, 0.0, 1.0, 1.0), broken];
        let err = deduplicate_regions(regions.clone(), 0.8).unwrap_err();
        assert!(matches!(err, RefineError::InvalidGeometry { .. }));

        match region_bounds("scan-1", &regions).unwrap_err() {
            RefineError::AtItem {
                page,
                index,
                source,
                ..
            } => {
                assert_eq!(page, "scan-1");
                assert_eq!(index, 1);
                assert!(matches!(*source, RefineError::InvalidGeometry { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_retain_survivors_keeps_order() {
        let removed = BTreeSet::from([0, 2]);
        let kept = retain_survivors(vec!["a", "b", "c", "d"], &removed);
        assert_eq!(kept, vec!["b", "d"]);
    }

    #[test]
    fn test_removal_indices_collects_set() {
        let boxes = vec![
            AxisAlignedBox::new(0.0, 0.0, 100.0, 100.0).unwrap(),
            AxisAlignedBox::new(10.0, 10.0, 20.0, 20.0).unwrap(),
            AxisAlignedBox::new(30.0, 30.0, 40.0, 40.0).unwrap(),
        ];
        let removed = overlap_removal_indices(&boxes, 0.8);
        assert_eq!(removed.into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }
}
