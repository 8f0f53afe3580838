//! Word-level recognition output and its character-segmentation hints.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::{RefineError, RefineResult};
use crate::processors::Point;

/// Recognizer formatting markers. They describe style, not content.
static STYLE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</?(?:strike|sup|sub|b|i|overline|underline)>")
        .expect("Invalid style tag regex")
});

/// Removes recognizer style markers (`<b>`, `</sup>`, `<underline>`, ...) from text.
///
/// Segmentation hints are computed against the stripped text, so this must run once,
/// before grouping.
pub fn strip_style_tags(text: &str) -> String {
    STYLE_TAG_REGEX.replace_all(text, "").into_owned()
}

/// A word's bounding quadrilateral: top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f32; 2]; 4]", into = "[[f32; 2]; 4]")]
pub struct Quad {
    /// Corner points in the order p0..p3.
    pub points: [Point; 4],
}

impl Quad {
    /// Creates a quadrilateral from its four corners.
    pub fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self {
            points: [top_left, top_right, bottom_right, bottom_left],
        }
    }

    /// Creates an axis-aligned quadrilateral.
    pub fn from_coords(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(
            Point::new(x1, y1),
            Point::new(x2, y1),
            Point::new(x2, y2),
            Point::new(x1, y2),
        )
    }

    pub fn top_left(&self) -> Point {
        self.points[0]
    }

    pub fn top_right(&self) -> Point {
        self.points[1]
    }

    pub fn bottom_right(&self) -> Point {
        self.points[2]
    }
}

impl From<[[f32; 2]; 4]> for Quad {
    fn from(value: [[f32; 2]; 4]) -> Self {
        Self {
            points: value.map(|[x, y]| Point::new(x, y)),
        }
    }
}

impl From<Quad> for [[f32; 2]; 4] {
    fn from(value: Quad) -> Self {
        value.points.map(|p| [p.x, p.y])
    }
}

/// One group of the recognizer's character segmentation.
///
/// `units` are the characters of the group in reading order. A unit may hold more
/// than one glyph (ligatures). When the group has exactly one column per unit,
/// each unit gets its own box; otherwise the group is emitted as a single unit
/// sharing its column span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterGroup {
    /// Characters of the group.
    pub units: Vec<String>,
    /// Strictly increasing column indices occupied by the group.
    pub columns: Vec<usize>,
    /// Auxiliary recognizer state, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl CharacterGroup {
    /// Creates a group without auxiliary state.
    pub fn new(units: Vec<String>, columns: Vec<usize>) -> Self {
        Self {
            units,
            columns,
            state: None,
        }
    }

    /// Concatenated content of the group.
    pub fn text(&self) -> String {
        self.units.concat()
    }

    /// Returns true when every unit owns exactly one column.
    pub fn is_one_column_per_unit(&self) -> bool {
        self.units.len() == self.columns.len()
    }
}

/// Column segmentation of a word: `column_count` horizontal cells and the groups
/// laid over them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationHint {
    /// Number of cells the word's width is divided into.
    pub column_count: usize,
    /// Character groups in reading order.
    pub groups: Vec<CharacterGroup>,
}

/// One recognized word with its quadrilateral and segmentation hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordDetection {
    /// Recognized text with style markers already stripped.
    pub text: String,
    /// Bounding quadrilateral of the word.
    #[serde(rename = "box")]
    pub quad: Quad,
    /// Column segmentation of the word.
    pub hint: SegmentationHint,
}

impl WordDetection {
    /// Creates a validated word detection.
    pub fn new(text: impl Into<String>, quad: Quad, hint: SegmentationHint) -> RefineResult<Self> {
        let word = Self {
            text: text.into(),
            quad,
            hint,
        };
        word.validate()?;
        Ok(word)
    }

    /// Checks the word against the reconstruction contract.
    ///
    /// # Errors
    ///
    /// * [`RefineError::InvalidSegmentation`] when the text is empty, the column count
    ///   is zero, a group has no units or no columns, columns are not strictly
    ///   increasing or exceed the column count, or the groups do not concatenate to
    ///   the text.
    /// * [`RefineError::InvalidGeometry`] when the quadrilateral has non-finite
    ///   coordinates or its right/bottom edge lies before its left/top edge.
    pub fn validate(&self) -> RefineResult<()> {
        if self.text.is_empty() {
            return Err(RefineError::invalid_segmentation("word text is empty"));
        }
        let column_count = self.hint.column_count;
        if column_count == 0 {
            return Err(RefineError::invalid_segmentation(
                "column_count must be positive",
            ));
        }

        for (index, group) in self.hint.groups.iter().enumerate() {
            if group.units.is_empty() {
                return Err(RefineError::invalid_segmentation(format!(
                    "group {index} has no characters"
                )));
            }
            if group.columns.is_empty() {
                return Err(RefineError::invalid_segmentation(format!(
                    "group {index} has no columns"
                )));
            }
            if group.columns.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(RefineError::invalid_segmentation(format!(
                    "group {index} columns {:?} are not strictly increasing",
                    group.columns
                )));
            }
            let last = group.columns[group.columns.len() - 1];
            if last >= column_count {
                return Err(RefineError::invalid_segmentation(format!(
                    "group {index} uses column {last} but the word has {column_count} columns"
                )));
            }
        }

        let grouped: String = self
            .hint
            .groups
            .iter()
            .flat_map(|g| g.units.iter().map(String::as_str))
            .collect();
        if grouped != self.text {
            return Err(RefineError::invalid_segmentation(format!(
                "groups cover {} character(s) ({grouped:?}) but the text has {} ({:?})",
                grouped.chars().count(),
                self.text.chars().count(),
                self.text
            )));
        }

        if let Some(position) = self.quad.points.iter().position(|p| !p.is_finite()) {
            return Err(RefineError::invalid_geometry(format!(
                "word box point {position} has a non-finite coordinate"
            )));
        }
        let (top_left, top_right, bottom_right) = (
            self.quad.top_left(),
            self.quad.top_right(),
            self.quad.bottom_right(),
        );
        if top_right.x < top_left.x {
            return Err(RefineError::invalid_geometry(format!(
                "word box right edge {} lies left of its left edge {}",
                top_right.x, top_left.x
            )));
        }
        if bottom_right.y < top_left.y {
            return Err(RefineError::invalid_geometry(format!(
                "word box bottom edge {} lies above its top edge {}",
                bottom_right.y, top_left.y
            )));
        }
        Ok(())
    }
}

/// Wire form of a recognized word, with the segmentation hint as parallel lists.
///
/// Negative counts and indices are representable here so that they can be reported
/// as segmentation errors instead of deserialization failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWord {
    /// Recognized text, possibly containing style markers.
    pub text: String,
    /// Quadrilateral `[[x, y]; 4]`, top-left first, clockwise.
    #[serde(rename = "box")]
    pub quad: Quad,
    /// Number of columns the word was divided into.
    pub column_count: i64,
    /// Characters of each group.
    pub character_groups: Vec<Vec<String>>,
    /// Column indices of each group.
    pub group_columns: Vec<Vec<i64>>,
    /// Auxiliary per-group state; may be empty.
    #[serde(default)]
    pub group_states: Vec<String>,
}

impl RawWord {
    /// Validates the raw hint and converts it into a [`WordDetection`].
    ///
    /// When `strip_tags` is set, style markers are removed from the text first.
    pub fn into_detection(self, strip_tags: bool) -> RefineResult<WordDetection> {
        if self.column_count <= 0 {
            return Err(RefineError::invalid_segmentation(format!(
                "column_count must be positive, got {}",
                self.column_count
            )));
        }
        if self.character_groups.len() != self.group_columns.len() {
            return Err(RefineError::invalid_segmentation(format!(
                "{} character group(s) but {} column group(s)",
                self.character_groups.len(),
                self.group_columns.len()
            )));
        }
        if !self.group_states.is_empty() && self.group_states.len() != self.character_groups.len()
        {
            return Err(RefineError::invalid_segmentation(format!(
                "{} character group(s) but {} group state(s)",
                self.character_groups.len(),
                self.group_states.len()
            )));
        }

        let mut states = self.group_states.into_iter();
        let groups = self
            .character_groups
            .into_iter()
            .zip(self.group_columns)
            .enumerate()
            .map(|(index, (units, columns))| {
                let columns = columns
                    .into_iter()
                    .map(|column| {
                        usize::try_from(column).map_err(|_| {
                            RefineError::invalid_segmentation(format!(
                                "group {index} has negative column index {column}"
                            ))
                        })
                    })
                    .collect::<RefineResult<Vec<usize>>>()?;
                Ok(CharacterGroup {
                    units,
                    columns,
                    state: states.next(),
                })
            })
            .collect::<RefineResult<Vec<CharacterGroup>>>()?;

        let text = if strip_tags {
            strip_style_tags(&self.text)
        } else {
            self.text
        };

        WordDetection::new(
            text,
            self.quad,
            SegmentationHint {
                column_count: self.column_count as usize,
                groups,
            },
        )
    }
}
