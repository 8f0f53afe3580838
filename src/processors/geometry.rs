//! Geometric utilities for layout and OCR post-processing.
//!
//! This module provides the geometric primitives shared by every stage: points,
//! polygons as emitted by the detectors, and the axis-aligned boxes they reduce to.
//! Intersection and area computations are done on axis-aligned boxes only.

use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

use crate::core::{RefineError, RefineResult};

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    /// X-coordinate of the point.
    pub x: f32,
    /// Y-coordinate of the point.
    pub y: f32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns true when both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A polygon represented by an ordered collection of points.
///
/// Detectors emit four points, clockwise or counter-clockwise, not necessarily
/// axis-aligned. No convexity or ordering is assumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// The points that define the polygon.
    pub points: Vec<Point>,
}

impl BoundingBox {
    /// Creates a new bounding box from a vector of points.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Creates a rectangular bounding box from corner coordinates.
    ///
    /// # Arguments
    ///
    /// * `x1` - The x-coordinate of the top-left corner.
    /// * `y1` - The y-coordinate of the top-left corner.
    /// * `x2` - The x-coordinate of the bottom-right corner.
    /// * `y2` - The y-coordinate of the bottom-right corner.
    ///
    /// # Returns
    ///
    /// A new `BoundingBox` with four points in clockwise order starting at the top-left.
    pub fn from_coords(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        let points = vec![
            Point::new(x1, y1),
            Point::new(x2, y1),
            Point::new(x2, y2),
            Point::new(x1, y2),
        ];
        Self { points }
    }

    /// Creates a bounding box from a flat `[x1, y1, x2, y2, ...]` coordinate list.
    ///
    /// Layout detectors serialize polygons this way; both 8-value polygons and
    /// 4-value `xyxy` boxes are accepted since the reduction only needs min/max.
    ///
    /// # Errors
    ///
    /// Returns [`RefineError::InvalidGeometry`] when fewer than 2 coordinates are
    /// given, when the count is odd, or when any coordinate is not finite.
    pub fn from_flat(coords: &[f32]) -> RefineResult<Self> {
        if coords.len() < 2 {
            return Err(RefineError::invalid_geometry(format!(
                "polygon needs at least one x/y pair, got {} coordinate(s)",
                coords.len()
            )));
        }
        if coords.len() % 2 != 0 {
            return Err(RefineError::invalid_geometry(format!(
                "polygon has an odd number of coordinates ({})",
                coords.len()
            )));
        }
        let points: Vec<Point> = coords
            .chunks_exact(2)
            .map(|pair| Point::new(pair[0], pair[1]))
            .collect();
        let polygon = Self::new(points);
        polygon.validate()?;
        Ok(polygon)
    }

    /// Flattens the polygon back into `[x1, y1, x2, y2, ...]`.
    pub fn to_flat(&self) -> Vec<f32> {
        self.points.iter().flat_map(|p| [p.x, p.y]).collect()
    }

    /// Checks that the polygon has at least one point and only finite coordinates.
    pub fn validate(&self) -> RefineResult<()> {
        if self.points.is_empty() {
            return Err(RefineError::invalid_geometry("polygon has no points"));
        }
        if let Some(position) = self.points.iter().position(|p| !p.is_finite()) {
            return Err(RefineError::invalid_geometry(format!(
                "polygon point {position} has a non-finite coordinate"
            )));
        }
        Ok(())
    }

    /// Reduces the polygon to its axis-aligned bounds.
    pub fn bounds(&self) -> RefineResult<AxisAlignedBox> {
        bounds_of(&self.points)
    }

    /// Gets the minimum x-coordinate of all points, or 0.0 if there are no points.
    pub fn x_min(&self) -> f32 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points
            .iter()
            .map(|p| p.x)
            .fold(f32::INFINITY, f32::min)
    }

    /// Gets the minimum y-coordinate of all points, or 0.0 if there are no points.
    pub fn y_min(&self) -> f32 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points
            .iter()
            .map(|p| p.y)
            .fold(f32::INFINITY, f32::min)
    }

    /// Gets the maximum x-coordinate of all points, or 0.0 if there are no points.
    pub fn x_max(&self) -> f32 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points
            .iter()
            .map(|p| p.x)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Gets the maximum y-coordinate of all points, or 0.0 if there are no points.
    pub fn y_max(&self) -> f32 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points
            .iter()
            .map(|p| p.y)
            .fold(f32::NEG_INFINITY, f32::max)
    }
}

/// An axis-aligned rectangle `(x_min, y_min, x_max, y_max)`.
///
/// Derived on demand from polygons and never persisted. Serialized as a
/// `[x_min, y_min, x_max, y_max]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f32; 4]", into = "[f32; 4]")]
pub struct AxisAlignedBox {
    x_min: f32,
    y_min: f32,
    x_max: f32,
    y_max: f32,
}

impl AxisAlignedBox {
    /// Creates a validated axis-aligned box.
    ///
    /// # Errors
    ///
    /// Returns [`RefineError::InvalidGeometry`] when a coordinate is not finite or
    /// when `min > max` on either axis.
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> RefineResult<Self> {
        if !(x_min.is_finite() && y_min.is_finite() && x_max.is_finite() && y_max.is_finite()) {
            return Err(RefineError::invalid_geometry(format!(
                "box ({x_min}, {y_min}, {x_max}, {y_max}) has a non-finite coordinate"
            )));
        }
        if x_min > x_max || y_min > y_max {
            return Err(RefineError::invalid_geometry(format!(
                "box ({x_min}, {y_min}, {x_max}, {y_max}) has min > max"
            )));
        }
        Ok(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    #[inline]
    pub fn x_min(&self) -> f32 {
        self.x_min
    }

    #[inline]
    pub fn y_min(&self) -> f32 {
        self.y_min
    }

    #[inline]
    pub fn x_max(&self) -> f32 {
        self.x_max
    }

    #[inline]
    pub fn y_max(&self) -> f32 {
        self.y_max
    }

    /// Horizontal extent.
    #[inline]
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    /// Vertical extent. Deduplication uses this, not the area, to pick the loser.
    #[inline]
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Area of the box; 0 for degenerate boxes.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Computes the area of intersection with another box, 0 when they do not overlap.
    pub fn intersection_area(&self, other: &AxisAlignedBox) -> f32 {
        let inter_x_min = self.x_min.max(other.x_min);
        let inter_y_min = self.y_min.max(other.y_min);
        let inter_x_max = self.x_max.min(other.x_max);
        let inter_y_max = self.y_max.min(other.y_max);

        if inter_x_min >= inter_x_max || inter_y_min >= inter_y_max {
            return 0.0;
        }

        (inter_x_max - inter_x_min) * (inter_y_max - inter_y_min)
    }

    /// Intersection area divided by the smaller of the two areas.
    ///
    /// Returns 0.0 when the boxes do not intersect, so degenerate boxes never
    /// produce a positive ratio.
    pub fn overlap_ratio(&self, other: &AxisAlignedBox) -> f32 {
        let inter_area = self.intersection_area(other);
        if inter_area <= 0.0 {
            return 0.0;
        }
        let smaller_area = self.area().min(other.area());
        if smaller_area <= 0.0 {
            return 0.0;
        }
        inter_area / smaller_area
    }
}

impl TryFrom<[f32; 4]> for AxisAlignedBox {
    type Error = RefineError;

    fn try_from(value: [f32; 4]) -> Result<Self, Self::Error> {
        Self::new(value[0], value[1], value[2], value[3])
    }
}

impl From<AxisAlignedBox> for [f32; 4] {
    fn from(value: AxisAlignedBox) -> Self {
        [value.x_min, value.y_min, value.x_max, value.y_max]
    }
}

/// Reduces a polygon to `(min_x, min_y, max_x, max_y)` by a min/max scan.
///
/// # Errors
///
/// Returns [`RefineError::InvalidGeometry`] when no point is supplied or when a
/// coordinate is not finite.
pub fn bounds_of(points: &[Point]) -> RefineResult<AxisAlignedBox> {
    let (x_min, x_max) = match points.iter().map(|p| p.x).minmax_by(f32::total_cmp) {
        MinMaxResult::NoElements => {
            return Err(RefineError::invalid_geometry(
                "polygon needs at least one x/y pair",
            ));
        }
        MinMaxResult::OneElement(x) => (x, x),
        MinMaxResult::MinMax(min, max) => (min, max),
    };
    let (y_min, y_max) = match points.iter().map(|p| p.y).minmax_by(f32::total_cmp) {
        MinMaxResult::NoElements => {
            return Err(RefineError::invalid_geometry(
                "polygon needs at least one x/y pair",
            ));
        }
        MinMaxResult::OneElement(y) => (y, y),
        MinMaxResult::MinMax(min, max) => (min, max),
    };
    AxisAlignedBox::new(x_min, y_min, x_max, y_max)
}

/// Standard rectangle-intersection area; 0 when the boxes do not overlap.
#[inline]
pub fn intersection_area(a: &AxisAlignedBox, b: &AxisAlignedBox) -> f32 {
    a.intersection_area(b)
}

/// `(x_max - x_min) * (y_max - y_min)`.
#[inline]
pub fn area(bbox: &AxisAlignedBox) -> f32 {
    bbox.area()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aabb(x1: f32, y1: f32, x2: f32, y2: f32) -> AxisAlignedBox {
        AxisAlignedBox::new(x1, y1, x2, y2).unwrap()
    }

    #[test]
    fn test_bounds_of_rotated_polygon() {
        let points = vec![
            Point::new(50.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 100.0),
            Point::new(0.0, 50.0),
        ];
        let bounds = bounds_of(&points).unwrap();
        assert_eq!(bounds, aabb(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_bounds_of_counter_clockwise_polygon() {
        let polygon = BoundingBox::from_flat(&[10.0, 80.0, 90.0, 80.0, 90.0, 20.0, 10.0, 20.0])
            .unwrap();
        let bounds = polygon.bounds().unwrap();
        assert_eq!(bounds.x_min(), 10.0);
        assert_eq!(bounds.y_min(), 20.0);
        assert_eq!(bounds.x_max(), 90.0);
        assert_eq!(bounds.y_max(), 80.0);
    }

    #[test]
    fn test_bounds_of_single_point_is_degenerate() {
        let bounds = bounds_of(&[Point::new(3.0, 4.0)]).unwrap();
        assert_eq!(bounds.area(), 0.0);
        assert_eq!(bounds.x_min(), bounds.x_max());
    }

    #[test]
    fn test_bounds_of_empty_polygon_fails() {
        let err = bounds_of(&[]).unwrap_err();
        assert!(matches!(err, RefineError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_from_flat_rejects_malformed_coordinates() {
        assert!(matches!(
            BoundingBox::from_flat(&[1.0]),
            Err(RefineError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            BoundingBox::from_flat(&[1.0, 2.0, 3.0]),
            Err(RefineError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            BoundingBox::from_flat(&[1.0, f32::NAN, 3.0, 4.0]),
            Err(RefineError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_from_flat_accepts_xyxy() {
        let polygon = BoundingBox::from_flat(&[5.0, 6.0, 15.0, 26.0]).unwrap();
        assert_eq!(polygon.points.len(), 2);
        assert_eq!(polygon.bounds().unwrap(), aabb(5.0, 6.0, 15.0, 26.0));
        assert_eq!(polygon.to_flat(), vec![5.0, 6.0, 15.0, 26.0]);
    }

    #[test]
    fn test_axis_aligned_box_rejects_min_greater_than_max() {
        assert!(matches!(
            AxisAlignedBox::new(10.0, 0.0, 5.0, 10.0),
            Err(RefineError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            AxisAlignedBox::new(0.0, 10.0, 5.0, 0.0),
            Err(RefineError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_intersection_area() {
        let a = aabb(0.0, 0.0, 10.0, 10.0);
        let b = aabb(5.0, 5.0, 15.0, 15.0);
        assert_eq!(intersection_area(&a, &b), 25.0);
        assert_eq!(intersection_area(&b, &a), 25.0);

        // Disjoint and edge-touching boxes never produce a negative area.
        let far = aabb(20.0, 20.0, 30.0, 30.0);
        assert_eq!(intersection_area(&a, &far), 0.0);
        let touching = aabb(10.0, 0.0, 20.0, 10.0);
        assert_eq!(intersection_area(&a, &touching), 0.0);
    }

    #[test]
    fn test_overlap_ratio_uses_smaller_area() {
        let outer = aabb(0.0, 0.0, 100.0, 100.0);
        let inner = aabb(10.0, 10.0, 50.0, 50.0);
        assert!((outer.overlap_ratio(&inner) - 1.0).abs() < 1e-6);

        let degenerate = aabb(20.0, 20.0, 20.0, 60.0);
        assert_eq!(area(&degenerate), 0.0);
        assert_eq!(outer.overlap_ratio(&degenerate), 0.0);
    }

    #[test]
    fn test_axis_aligned_box_serializes_as_array() {
        let bbox = aabb(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");

        let parsed: AxisAlignedBox = serde_json::from_str("[1.0,2.0,3.0,4.0]").unwrap();
        assert_eq!(parsed, bbox);
        assert!(serde_json::from_str::<AxisAlignedBox>("[3.0,2.0,1.0,4.0]").is_err());
    }
}
