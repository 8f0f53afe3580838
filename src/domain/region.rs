//! Layout regions emitted by the page-layout detector.

use serde::{Deserialize, Serialize, Serializer};

use crate::core::{RefineError, RefineResult};
use crate::processors::{AxisAlignedBox, BoundingBox};

/// Category of a layout region, following the layout detector's 10-class label set.
///
/// The raw `category_id` is preserved on [`Region`]; this enum is a typed view of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutCategory {
    /// Document or section title
    Title,
    /// Body text
    PlainText,
    /// Headers, footers, page numbers and other content dropped from the reading flow
    Abandon,
    /// Figure or image
    Figure,
    /// Figure caption
    FigureCaption,
    /// Table
    Table,
    /// Table caption
    TableCaption,
    /// Table footnote
    TableFootnote,
    /// Display (isolated) formula
    IsolateFormula,
    /// Formula caption or number
    FormulaCaption,
    /// Class id outside the known label set
    Other(u32),
}

impl LayoutCategory {
    /// Maps a detector class id to its category.
    pub fn from_id(id: u32) -> Self {
        match id {
            0 => LayoutCategory::Title,
            1 => LayoutCategory::PlainText,
            2 => LayoutCategory::Abandon,
            3 => LayoutCategory::Figure,
            4 => LayoutCategory::FigureCaption,
            5 => LayoutCategory::Table,
            6 => LayoutCategory::TableCaption,
            7 => LayoutCategory::TableFootnote,
            8 => LayoutCategory::IsolateFormula,
            9 => LayoutCategory::FormulaCaption,
            other => LayoutCategory::Other(other),
        }
    }

    /// Returns the detector class id for this category.
    pub fn id(&self) -> u32 {
        match self {
            LayoutCategory::Title => 0,
            LayoutCategory::PlainText => 1,
            LayoutCategory::Abandon => 2,
            LayoutCategory::Figure => 3,
            LayoutCategory::FigureCaption => 4,
            LayoutCategory::Table => 5,
            LayoutCategory::TableCaption => 6,
            LayoutCategory::TableFootnote => 7,
            LayoutCategory::IsolateFormula => 8,
            LayoutCategory::FormulaCaption => 9,
            LayoutCategory::Other(id) => *id,
        }
    }

    /// Returns the detector's label string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutCategory::Title => "title",
            LayoutCategory::PlainText => "plain text",
            LayoutCategory::Abandon => "abandon",
            LayoutCategory::Figure => "figure",
            LayoutCategory::FigureCaption => "figure_caption",
            LayoutCategory::Table => "table",
            LayoutCategory::TableCaption => "table_caption",
            LayoutCategory::TableFootnote => "table_footnote",
            LayoutCategory::IsolateFormula => "isolate_formula",
            LayoutCategory::FormulaCaption => "formula_caption",
            LayoutCategory::Other(_) => "other",
        }
    }

    /// Parses a label string; unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let category = match label.to_lowercase().as_str() {
            "title" => LayoutCategory::Title,
            "plain text" | "plain_text" | "text" => LayoutCategory::PlainText,
            "abandon" => LayoutCategory::Abandon,
            "figure" => LayoutCategory::Figure,
            "figure_caption" => LayoutCategory::FigureCaption,
            "table" => LayoutCategory::Table,
            "table_caption" => LayoutCategory::TableCaption,
            "table_footnote" => LayoutCategory::TableFootnote,
            "isolate_formula" => LayoutCategory::IsolateFormula,
            "formula_caption" => LayoutCategory::FormulaCaption,
            _ => return None,
        };
        Some(category)
    }
}

/// A detected layout element.
///
/// Regions are validated on construction: the polygon has at least one point and
/// only finite coordinates, and the score is a finite value in `[0, 1]`. On the wire
/// the polygon is a flat `poly` coordinate list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRegion")]
pub struct Region {
    /// Polygon bounding the region.
    #[serde(rename = "poly", serialize_with = "serialize_flat_polygon")]
    pub polygon: BoundingBox,
    /// Detector class id, see [`LayoutCategory`].
    pub category_id: u32,
    /// Detection confidence in `[0, 1]`.
    pub score: f32,
}

impl Region {
    /// Creates a validated region.
    pub fn new(polygon: BoundingBox, category_id: u32, score: f32) -> RefineResult<Self> {
        polygon.validate()?;
        if !(score.is_finite() && (0.0..=1.0).contains(&score)) {
            return Err(RefineError::invalid_input(format!(
                "region score must lie in [0, 1], got {score}"
            )));
        }
        Ok(Self {
            polygon,
            category_id,
            score,
        })
    }

    /// Creates a validated region from a flat coordinate list.
    pub fn from_flat(coords: &[f32], category_id: u32, score: f32) -> RefineResult<Self> {
        Self::new(BoundingBox::from_flat(coords)?, category_id, score)
    }

    /// Axis-aligned bounds of the region polygon.
    pub fn bounds(&self) -> RefineResult<AxisAlignedBox> {
        self.polygon.bounds()
    }

    /// Typed category of the region.
    pub fn category(&self) -> LayoutCategory {
        LayoutCategory::from_id(self.category_id)
    }
}

/// Wire form of a region as produced by the layout detector.
///
/// Pages carry regions in this form so that a malformed detection is reported with
/// its page and index instead of failing the whole document parse. Class ids may
/// arrive as floats (`1.0`); they must be integral and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRegion {
    /// Flat `x0, y0, x1, y1, ...` coordinate list.
    pub poly: Vec<f32>,
    /// Detector class id.
    pub category_id: f64,
    /// Detection confidence.
    pub score: f32,
}

impl RawRegion {
    /// Validates the detection into a [`Region`].
    ///
    /// # Errors
    ///
    /// * [`RefineError::InvalidGeometry`] when the polygon is malformed.
    /// * [`RefineError::InvalidInput`] when the class id or score is out of range.
    pub fn into_region(self) -> RefineResult<Region> {
        let id = self.category_id;
        if !(id.is_finite() && id >= 0.0 && id.fract() == 0.0 && id <= u32::MAX as f64) {
            return Err(RefineError::invalid_input(format!(
                "category_id must be a non-negative integer, got {id}"
            )));
        }
        Region::from_flat(&self.poly, id as u32, self.score)
    }
}

impl From<Region> for RawRegion {
    fn from(region: Region) -> Self {
        Self {
            poly: region.polygon.to_flat(),
            category_id: f64::from(region.category_id),
            score: region.score,
        }
    }
}

impl TryFrom<RawRegion> for Region {
    type Error = RefineError;

    fn try_from(raw: RawRegion) -> Result<Self, Self::Error> {
        raw.into_region()
    }
}

fn serialize_flat_polygon<S>(polygon: &BoundingBox, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    polygon.to_flat().serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_category_round_trip() {
        for id in 0..10 {
            let category = LayoutCategory::from_id(id);
            assert_eq!(category.id(), id);
            assert_eq!(LayoutCategory::from_label(category.as_str()), Some(category));
        }
        assert_eq!(LayoutCategory::from_id(42), LayoutCategory::Other(42));
        assert_eq!(LayoutCategory::from_label("sidebar"), None);
    }

    #[test]
    fn test_region_deserializes_detector_output() {
        let region: Region = serde_json::from_str(
            r#"{"poly": [0, 0, 100, 0, 100, 50, 0, 50], "category_id": 5.0, "score": 0.93}"#,
        )
        .unwrap();
        assert_eq!(region.category(), LayoutCategory::Table);
        assert_eq!(region.polygon.points.len(), 4);
        let bounds = region.bounds().unwrap();
        assert_eq!(bounds.height(), 50.0);
    }

    #[test]
    fn test_region_rejects_invalid_fields() {
        let fractional = serde_json::from_str::<Region>(
            r#"{"poly": [0, 0, 1, 1], "category_id": 1.5, "score": 0.5}"#,
        );
        assert!(fractional.is_err());

        let bad_score = Region::from_flat(&[0.0, 0.0, 1.0, 1.0], 1, 1.2);
        assert!(matches!(bad_score, Err(RefineError::InvalidInput { .. })));

        let bad_poly = Region::from_flat(&[0.0], 1, 0.5);
        assert!(matches!(bad_poly, Err(RefineError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_raw_region_defers_validation() {
        let raw: RawRegion =
            serde_json::from_str(r#"{"poly": [1], "category_id": 2, "score": 0.4}"#).unwrap();
        assert_eq!(raw.poly, vec![1.0]);
        assert!(matches!(
            raw.into_region(),
            Err(RefineError::InvalidGeometry { .. })
        ));

        let region = Region::from_flat(&[0.0, 0.0, 4.0, 0.0, 4.0, 2.0, 0.0, 2.0], 6, 0.75).unwrap();
        let raw = RawRegion::from(region.clone());
        assert_eq!(raw.category_id, 6.0);
        assert_eq!(raw.into_region().unwrap(), region);
    }

    #[test]
    fn test_region_serializes_flat_polygon() {
        let region = Region::from_flat(&[1.0, 2.0, 3.0, 4.0], 3, 0.5).unwrap();
        let value = serde_json::to_value(&region).unwrap();
        assert_eq!(value["poly"], serde_json::json!([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(value["category_id"], serde_json::json!(3));
    }
}
