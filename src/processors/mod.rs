//! Geometry and post-processing algorithms.
//!
//! - [`geometry`] - points, polygons and axis-aligned boxes
//! - [`dedup`] - overlap-based removal of duplicate layout regions
//! - [`reading_order`] - reading-order sorting of layout regions
//! - [`char_boxes`] - character boxes from word boxes and column hints

pub mod char_boxes;
pub mod dedup;
pub mod geometry;
pub mod reading_order;

pub use char_boxes::{reconstruct_character_boxes, reconstruct_characters};
pub use dedup::{deduplicate_regions, overlap_removal_indices, region_bounds};
pub use geometry::{AxisAlignedBox, BoundingBox, Point, area, bounds_of, intersection_area};
pub use reading_order::{SortPolicy, sort_regions};
