//! CLI mode: post-process a JSON dump of model output.

use std::fmt::Display;
use std::path::Path;
use std::time::Instant;

use layout_refine::core::RefineError;
use serde::Serialize;
use tracing::info;

use crate::api::{
    BatchResponse, LayoutRequest, LayoutResponse, OcrRequest, OcrResponse, RefineEngine,
};

/// Output format of the CLI subcommands
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
}

fn read_request<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RefineError> {
    info!("Loading {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Deduplicate and sort the layout detections stored in `path`
pub fn process_layout_file(
    path: &Path,
    engine: &RefineEngine,
    format: OutputFormat,
) -> Result<(), RefineError> {
    let request: LayoutRequest = read_request(path)?;

    let start = Instant::now();
    let results = engine.process_layout(request)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    info!("Processed {} page(s) in {:.2}ms", results.len(), elapsed_ms);

    output(&LayoutResponse::ok(results, elapsed_ms), format)
}

/// Reconstruct the character boxes of the OCR output stored in `path`
pub fn process_ocr_file(
    path: &Path,
    engine: &RefineEngine,
    format: OutputFormat,
) -> Result<(), RefineError> {
    let request: OcrRequest = read_request(path)?;

    let start = Instant::now();
    let results = engine.process_ocr(request)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    info!("Processed {} page(s) in {:.2}ms", results.len(), elapsed_ms);

    output(&OcrResponse::ok(results, elapsed_ms), format)
}

fn output<R: Serialize + Display>(
    response: &BatchResponse<R>,
    format: OutputFormat,
) -> Result<(), RefineError> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(response)?);
        }
        OutputFormat::Pretty => {
            println!("\n=== Results ===");
            if let Some(ms) = response.processing_time_ms {
                println!("Processing time: {ms:.2}ms");
            }
            println!("Pages: {}", response.results.len());
            for (image_id, result) in &response.results {
                println!();
                println!("========== {image_id} ==========");
                print!("{result}");
            }
        }
    }
    Ok(())
}
