//! Error handling for the post-processing engine.

mod types;

pub use types::{ProcessingStage, RefineError, RefineResult};
