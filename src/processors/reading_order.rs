//! Reading-order sorting of layout regions.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::core::RefineResult;
use crate::domain::Region;
use crate::processors::AxisAlignedBox;

/// Ordering applied to the surviving regions of a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPolicy {
    /// Ascending left edge.
    ByLeftX,
    /// Ascending top edge.
    ByTopY,
    /// Ascending top edge, ties broken by the left edge.
    #[default]
    ByTopThenLeft,
}

impl SortPolicy {
    fn compare(&self, a: (f32, f32), b: (f32, f32)) -> Ordering {
        let (ax, ay) = a;
        let (bx, by) = b;
        match self {
            SortPolicy::ByLeftX => ax.total_cmp(&bx),
            SortPolicy::ByTopY => ay.total_cmp(&by),
            SortPolicy::ByTopThenLeft => ay.total_cmp(&by).then_with(|| ax.total_cmp(&bx)),
        }
    }
}

impl std::str::FromStr for SortPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "by_left_x" | "left" => Ok(SortPolicy::ByLeftX),
            "by_top_y" | "top" => Ok(SortPolicy::ByTopY),
            "by_top_then_left" | "top_left" => Ok(SortPolicy::ByTopThenLeft),
            other => Err(format!(
                "unknown sort policy '{other}', expected by_left_x, by_top_y or by_top_then_left"
            )),
        }
    }
}

/// Sorts regions into reading order.
///
/// The sort is stable: regions with equal keys keep their input order. Regions are
/// neither removed nor modified.
pub fn sort_regions(regions: Vec<Region>, policy: SortPolicy) -> RefineResult<Vec<Region>> {
    let keyed = regions
        .into_iter()
        .map(|region| Ok((region.bounds()?, region)))
        .collect::<RefineResult<Vec<_>>>()?;
    Ok(sort_keyed(keyed, policy))
}

/// Stable sort of items paired with their precomputed bounds.
pub(crate) fn sort_keyed<T>(mut keyed: Vec<(AxisAlignedBox, T)>, policy: SortPolicy) -> Vec<T> {
    keyed.sort_by(|(a, _), (b, _)| {
        policy.compare((a.x_min(), a.y_min()), (b.x_min(), b.y_min()))
    });
    keyed.into_iter().map(|(_, item)| item).collect()
}
