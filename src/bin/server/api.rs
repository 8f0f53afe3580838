//! Post-processing logic shared between CLI and server modes.

use std::collections::BTreeMap;
use std::sync::Arc;

use layout_refine::core::{PipelineConfig, RefineResult};
use layout_refine::pipeline::{
    LayoutPage, LayoutPageResult, LayoutPostprocessor, OcrPage, OcrPageResult, OcrPostprocessor,
};
use serde::{Deserialize, Serialize};

/// A batch of pages as accepted on the wire: `{"pages": [...]}`, a bare list, or one page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PageBatch<P> {
    Wrapped { pages: Vec<P> },
    Many(Vec<P>),
    One(P),
}

impl<P> PageBatch<P> {
    pub fn into_pages(self) -> Vec<P> {
        match self {
            PageBatch::Wrapped { pages } | PageBatch::Many(pages) => pages,
            PageBatch::One(page) => vec![page],
        }
    }
}

/// Request to post-process layout detections
pub type LayoutRequest = PageBatch<LayoutPage>;

/// Request to reconstruct OCR character boxes
pub type OcrRequest = PageBatch<OcrPage>;

/// Response carrying per-page results keyed by image id
#[derive(Debug, Serialize)]
pub struct BatchResponse<R> {
    pub success: bool,
    pub results: BTreeMap<String, R>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<f64>,
}

impl<R> BatchResponse<R> {
    pub fn ok(results: BTreeMap<String, R>, processing_time_ms: f64) -> Self {
        Self {
            success: true,
            results,
            error: None,
            processing_time_ms: Some(processing_time_ms),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            results: BTreeMap::new(),
            error: Some(message),
            processing_time_ms: None,
        }
    }
}

pub type LayoutResponse = BatchResponse<LayoutPageResult>;
pub type OcrResponse = BatchResponse<OcrPageResult>;

/// Both post-processors, built once from the pipeline configuration.
#[derive(Debug)]
pub struct RefineEngine {
    layout: LayoutPostprocessor,
    ocr: OcrPostprocessor,
}

impl RefineEngine {
    pub fn new(config: &PipelineConfig) -> RefineResult<Self> {
        Ok(Self {
            layout: LayoutPostprocessor::new(config.layout.clone(), config.parallel.clone())?,
            ocr: OcrPostprocessor::new(config.ocr.clone(), config.parallel.clone())?,
        })
    }

    pub fn process_layout(
        &self,
        request: LayoutRequest,
    ) -> RefineResult<BTreeMap<String, LayoutPageResult>> {
        self.layout.process_pages(request.into_pages())
    }

    pub fn process_ocr(
        &self,
        request: OcrRequest,
    ) -> RefineResult<BTreeMap<String, OcrPageResult>> {
        self.ocr.process_pages(request.into_pages())
    }
}

/// Thread-safe engine wrapped in Arc
pub type SharedEngine = Arc<RefineEngine>;
