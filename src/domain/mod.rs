//! Domain records exchanged between the detectors and the post-processing stages.
//!
//! - [`Region`] - a detected layout element, and [`RawRegion`] its unvalidated wire form
//! - [`WordDetection`] - a recognized word with its segmentation hint
//! - [`CharacterBox`] - one reconstructed character

pub mod character;
pub mod region;
pub mod word;

pub use character::{CharRecord, CharacterBox};
pub use region::{LayoutCategory, RawRegion, Region};
pub use word::{
    CharacterGroup, Quad, RawWord, SegmentationHint, WordDetection, strip_style_tags,
};
