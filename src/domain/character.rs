//! Character-level output of word reconstruction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::processors::AxisAlignedBox;

/// One character (or multi-glyph unit) and its bounding rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterBox {
    /// Character content.
    pub text: String,
    /// Axis-aligned rectangle of the character.
    pub bbox: AxisAlignedBox,
}

impl CharacterBox {
    pub fn new(text: impl Into<String>, bbox: AxisAlignedBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

impl fmt::Display for CharacterBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} [{:.2}, {:.2}, {:.2}, {:.2}]",
            self.text,
            self.bbox.x_min(),
            self.bbox.y_min(),
            self.bbox.x_max(),
            self.bbox.y_max()
        )
    }
}

/// Flattened character record used in OCR page results.
///
/// `x` is the left edge, `y` and `accumulated_y` are the bottom edge. All values are
/// rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharRecord {
    pub height: f32,
    pub width: f32,
    #[serde(rename = "str")]
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub accumulated_y: f32,
}

impl CharRecord {
    /// Builds the record for a reconstructed character box.
    pub fn from_box(character: &CharacterBox) -> Self {
        let bbox = &character.bbox;
        let bottom = round2(bbox.y_max());
        Self {
            height: round2(bbox.height()),
            width: round2(bbox.width()),
            text: character.text.clone(),
            x: round2(bbox.x_min()),
            y: bottom,
            accumulated_y: bottom,
        }
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_record_from_box() {
        let character = CharacterBox::new(
            "x",
            AxisAlignedBox::new(10.004, 5.0, 22.5051, 17.333).unwrap(),
        );
        let record = CharRecord::from_box(&character);
        assert_eq!(record.text, "x");
        assert!((record.x - 10.0).abs() < 1e-4);
        assert!((record.width - 12.5).abs() < 1e-4);
        assert!((record.height - 12.33).abs() < 1e-4);
        assert!((record.y - 17.33).abs() < 1e-4);
        assert_eq!(record.y, record.accumulated_y);
    }

    #[test]
    fn test_char_record_serializes_str_key() {
        let character = CharacterBox::new("é", AxisAlignedBox::new(0.0, 0.0, 1.0, 2.0).unwrap());
        let value = serde_json::to_value(CharRecord::from_box(&character)).unwrap();
        assert_eq!(value["str"], "é");
        assert!(value.get("text").is_none());
    }

    #[test]
    fn test_character_box_display() {
        let character = CharacterBox::new("a", AxisAlignedBox::new(0.0, 1.0, 2.5, 3.0).unwrap());
        assert_eq!(character.to_string(), "\"a\" [0.00, 1.00, 2.50, 3.00]");
    }
}
