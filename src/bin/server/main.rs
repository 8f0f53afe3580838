//! layout-refine server and CLI
//!
//! Post-processes layout detector and text engine output via CLI or HTTP server.
//!
//! # Usage
//!
//! ## CLI Mode
//! ```bash
//! layout-refine-server layout --file page_layout.json --output pretty
//! layout-refine-server ocr --file page_ocr.json --failure-policy skip
//! ```
//!
//! ## Server Mode
//! ```bash
//! layout-refine-server serve --config pipeline.json --port 8080
//! ```

mod api;
mod cli;
mod config;
mod server;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use layout_refine::core::{PipelineConfig, ProcessingStage, RefineError};
use tracing::info;

use crate::api::RefineEngine;
use crate::cli::OutputFormat;
use crate::config::{ConfigArgs, ServerConfig};

#[derive(Parser)]
#[command(name = "layout-refine-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Layout and OCR post-processing via CLI or HTTP server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deduplicate and sort the layout detections in a JSON file
    Layout {
        /// JSON file with one page, a list of pages, or {"pages": [...]}
        #[arg(long)]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        output: OutputFormat,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Reconstruct character boxes for the OCR output in a JSON file
    Ocr {
        /// JSON file with one page, a list of pages, or {"pages": [...]}
        #[arg(long)]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        output: OutputFormat,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(long, short, default_value = "8080", env = "LAYOUT_REFINE_PORT")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0", env = "LAYOUT_REFINE_HOST")]
        host: String,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Loads the configuration and sizes the rayon pool.
fn prepare(args: &ConfigArgs) -> Result<PipelineConfig, RefineError> {
    let config = args.load()?;
    if config
        .parallel
        .install_global_thread_pool()
        .map_err(|e| {
            RefineError::processing(ProcessingStage::Configuration, "thread pool setup", e)
        })?
    {
        info!(
            "Using {} worker thread(s)",
            config.parallel.max_threads.unwrap_or_default()
        );
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    layout_refine::utils::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Layout {
            file,
            output,
            config,
        } => {
            let engine = RefineEngine::new(&prepare(&config)?)?;
            info!("Processing layout file: {}", file.display());
            cli::process_layout_file(&file, &engine, output)?;
        }
        Commands::Ocr {
            file,
            output,
            config,
        } => {
            let engine = RefineEngine::new(&prepare(&config)?)?;
            info!("Processing OCR file: {}", file.display());
            cli::process_ocr_file(&file, &engine, output)?;
        }
        Commands::Serve { port, host, config } => {
            let config = ServerConfig {
                pipeline: prepare(&config)?,
                host,
                port,
            };

            info!("Starting server on {}:{}", config.host, config.port);
            server::run_server(config).await?;
        }
    }

    Ok(())
}
