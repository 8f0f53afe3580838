//! Reconstruction of character boxes from a word box and its column segmentation.
//!
//! The recognizer divides a word's width into `column_count` equal cells and reports,
//! for each character group, the cells it fired on. Each character gets a box centred on
//! its cell, spanning the word's full height.

use tracing::debug;

use crate::core::RefineResult;
use crate::domain::{CharacterBox, CharacterGroup, WordDetection};
use crate::processors::AxisAlignedBox;

/// Horizontal frame of a word in which cell offsets are computed.
#[derive(Debug, Clone, Copy)]
struct WordFrame {
    x_start: f32,
    y_start: f32,
    y_end: f32,
    width: f32,
    cell_width: f32,
    default_char_width: f32,
}

impl WordFrame {
    fn of(word: &WordDetection) -> Self {
        let x_start = word.quad.top_left().x;
        let x_end = word.quad.top_right().x;
        let width = x_end - x_start;
        let char_len = word.text.chars().count().max(1);
        Self {
            x_start,
            y_start: word.quad.top_left().y,
            y_end: word.quad.bottom_right().y,
            width,
            cell_width: width / word.hint.column_count as f32,
            default_char_width: width / char_len as f32,
        }
    }

    /// Box of `char_width` centred on column `column`, clamped to the word.
    fn centred(&self, column: usize, char_width: f32) -> RefineResult<AxisAlignedBox> {
        let center = (column as f32 + 0.5) * self.cell_width;
        let start = (center - char_width / 2.0).max(0.0) + self.x_start;
        let end = (center + char_width / 2.0).min(self.width) + self.x_start;
        AxisAlignedBox::new(start, self.y_start, end, self.y_end)
    }

    /// Box covering columns `first..=last`, clamped to the word.
    fn span(&self, first: usize, last: usize) -> RefineResult<AxisAlignedBox> {
        let start = (first as f32 * self.cell_width).max(0.0) + self.x_start;
        let end = ((last + 1) as f32 * self.cell_width).min(self.width) + self.x_start;
        AxisAlignedBox::new(start, self.y_start, end, self.y_end)
    }

    fn char_width(&self, columns: &[usize]) -> f32 {
        match columns {
            [first, .., last] => {
                ((last - first + 1) as f32 * self.cell_width) / (columns.len() - 1) as f32
            }
            _ => self.default_char_width,
        }
    }
}

fn group_boxes(
    frame: &WordFrame,
    group: &CharacterGroup,
    out: &mut Vec<CharacterBox>,
) -> RefineResult<()> {
    if group.is_one_column_per_unit() {
        let char_width = frame.char_width(&group.columns);
        for (unit, &column) in group.units.iter().zip(&group.columns) {
            out.push(CharacterBox::new(unit.clone(), frame.centred(column, char_width)?));
        }
    } else {
        // Columns and units disagree, so the group shares one box over its span.
        let first = group.columns[0];
        let last = group.columns[group.columns.len() - 1];
        debug!(
            "group {:?} has {} unit(s) over {} column(s), emitting one box for columns {}..={}",
            group.text(),
            group.units.len(),
            group.columns.len(),
            first,
            last
        );
        out.push(CharacterBox::new(group.text(), frame.span(first, last)?));
    }
    Ok(())
}

/// Splits a word box into one box per character, in reading order.
///
/// Groups with exactly one column per character produce one box per character. Other
/// groups (ligatures, characters spread over several columns) produce a single box whose
/// content is the whole group.
///
/// # Errors
///
/// * [`RefineError::InvalidSegmentation`](crate::core::RefineError::InvalidSegmentation)
///   when the segmentation hint does not match the text.
/// * [`RefineError::InvalidGeometry`](crate::core::RefineError::InvalidGeometry) when the
///   word box is inverted or non-finite.
pub fn reconstruct_character_boxes(word: &WordDetection) -> RefineResult<Vec<CharacterBox>> {
    word.validate()?;

    let frame = WordFrame::of(word);
    let mut boxes = Vec::with_capacity(word.text.chars().count());
    for group in &word.hint.groups {
        group_boxes(&frame, group, &mut boxes)?;
    }
    Ok(boxes)
}

/// Same as [`reconstruct_character_boxes`], split into parallel character and box lists.
pub fn reconstruct_characters(
    word: &WordDetection,
) -> RefineResult<(Vec<String>, Vec<AxisAlignedBox>)> {
    Ok(reconstruct_character_boxes(word)?
        .into_iter()
        .map(|c| (c.text, c.bbox))
        .unzip())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RefineError;
    use crate::domain::{Quad, SegmentationHint};

    const EPS: f32 = 1e-4;

    fn group(units: &[&str], columns: &[usize]) -> CharacterGroup {
        CharacterGroup::new(
            units.iter().map(|u| u.to_string()).collect(),
            columns.to_vec(),
        )
    }

    fn word(
        text: &str,
        x1: f32,
        x2: f32,
        column_count: usize,
        groups: Vec<CharacterGroup>,
    ) -> WordDetection {
        WordDetection {
            text: text.to_string(),
            quad: Quad::from_coords(x1, 10.0, x2, 30.0),
            hint: SegmentationHint {
                column_count,
                groups,
            },
        }
    }

    fn assert_span(bbox: &AxisAlignedBox, x_min: f32, x_max: f32) {
        assert!((bbox.x_min() - x_min).abs() < EPS, "x_min {} != {x_min}", bbox.x_min());
        assert!((bbox.x_max() - x_max).abs() < EPS, "x_max {} != {x_max}", bbox.x_max());
    }

    #[test]
    fn test_single_column_groups_use_default_width() {
        // Width 100, 4 characters -> default width 25; 10 cells of 10.
        let w = word(
            "abcd",
            0.0,
            100.0,
            10,
            vec![
                group(&["a"], &[0]),
                group(&["b"], &[3]),
                group(&["c"], &[6]),
                group(&["d"], &[9]),
            ],
        );
        let boxes = reconstruct_character_boxes(&w).unwrap();
        assert_eq!(boxes.len(), 4);
        // Centre 5, clamped at the left edge.
        assert_span(&boxes[0].bbox, 0.0, 17.5);
        assert_span(&boxes[1].bbox, 22.5, 47.5);
        assert_span(&boxes[2].bbox, 52.5, 77.5);
        // Centre 95, clamped at the right edge.
        assert_span(&boxes[3].bbox, 82.5, 100.0);
        for b in &boxes {
            assert_eq!(b.bbox.y_min(), 10.0);
            assert_eq!(b.bbox.y_max(), 30.0);
        }
    }

    #[test]
    fn test_multi_column_group_spreads_span() {
        // 8 cells of 10; columns 1 and 3 span 3 cells over one boundary -> width 30.
        let w = word("ab", 100.0, 180.0, 8, vec![group(&["a", "b"], &[1, 3])]);
        let boxes = reconstruct_character_boxes(&w).unwrap();
        assert_eq!(boxes.len(), 2);
        assert_span(&boxes[0].bbox, 100.0, 130.0);
        assert_span(&boxes[1].bbox, 120.0, 150.0);
    }

    #[test]
    fn test_groups_spanning_columns_share_one_box() {
        let w = word("Hi", 0.0, 100.0, 4, vec![group(&["H"], &[0, 1]), group(&["i"], &[2, 3])]);
        let boxes = reconstruct_character_boxes(&w).unwrap();
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].text, "H");
        assert_eq!(boxes[1].text, "i");
        assert_span(&boxes[0].bbox, 0.0, 50.0);
        assert_span(&boxes[1].bbox, 50.0, 100.0);
        // No overlap, and together the boxes cover the word.
        assert!(boxes[0].bbox.x_max() <= boxes[1].bbox.x_min());
        assert_eq!(boxes[0].bbox.x_max(), boxes[1].bbox.x_min());
    }

    #[test]
    fn test_ligature_group_is_one_unit() {
        let w = word("ffi!", 0.0, 40.0, 4, vec![group(&["ffi"], &[1]), group(&["!"], &[3])]);
        let (chars, boxes) = reconstruct_characters(&w).unwrap();
        assert_eq!(chars, vec!["ffi".to_string(), "!".to_string()]);
        assert_eq!(boxes.len(), 2);
    }

    #[test]
    fn test_round_trip_reproduces_text() {
        let w = word(
            "héllo",
            5.0,
            55.0,
            10,
            vec![group(&["h", "é"], &[0, 2]), group(&["l", "l"], &[4, 5]), group(&["o"], &[8])],
        );
        let (chars, boxes) = reconstruct_characters(&w).unwrap();
        assert_eq!(chars.concat(), "héllo");
        assert_eq!(chars.len(), boxes.len());
        // One column per character: one box per consumed column.
        let consumed: usize = w.hint.groups.iter().map(|g| g.columns.len()).sum();
        assert_eq!(boxes.len(), consumed);
        for b in &boxes {
            assert!(b.x_min() >= 5.0 - EPS && b.x_max() <= 55.0 + EPS);
        }
    }

    #[test]
    fn test_zero_width_word_yields_degenerate_boxes() {
        let w = word("ab", 7.0, 7.0, 2, vec![group(&["a"], &[0]), group(&["b"], &[1])]);
        let boxes = reconstruct_character_boxes(&w).unwrap();
        assert!(boxes.iter().all(|b| b.bbox.width() == 0.0 && b.bbox.x_min() == 7.0));
    }

    #[test]
    fn test_invalid_segmentation_is_rejected() {
        let empty_text = word("", 0.0, 10.0, 2, Vec::new());
        assert!(matches!(
            reconstruct_character_boxes(&empty_text),
            Err(RefineError::InvalidSegmentation { .. })
        ));

        let no_columns = word("ab", 0.0, 10.0, 0, vec![group(&["a", "b"], &[0, 1])]);
        assert!(matches!(
            reconstruct_character_boxes(&no_columns),
            Err(RefineError::InvalidSegmentation { .. })
        ));

        let empty_cols = word("ab", 0.0, 10.0, 2, vec![group(&["a", "b"], &[])]);
        assert!(matches!(
            reconstruct_characters(&empty_cols),
            Err(RefineError::InvalidSegmentation { .. })
        ));

        let short_groups = word("abc", 0.0, 10.0, 4, vec![group(&["a", "b"], &[0, 1])]);
        assert!(matches!(
            reconstruct_characters(&short_groups),
            Err(RefineError::InvalidSegmentation { .. })
        ));
    }

    #[test]
    fn test_inverted_word_box_is_rejected() {
        let w = word("a", 50.0, 10.0, 1, vec![group(&["a"], &[0])]);
        assert!(matches!(
            reconstruct_character_boxes(&w),
            Err(RefineError::InvalidGeometry { .. })
        ));
    }
}
