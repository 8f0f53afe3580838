//! HTTP server for layout and OCR post-processing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use layout_refine::core::RefineError;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::api::{
    BatchResponse, LayoutRequest, LayoutResponse, OcrRequest, OcrResponse, RefineEngine,
    SharedEngine,
};
use crate::config::ServerConfig;

/// Application state shared across handlers
struct AppState {
    engine: SharedEngine,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Run the HTTP server
pub async fn run_server(
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let engine = Arc::new(RefineEngine::new(&config.pipeline)?);
    let state = Arc::new(AppState { engine });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/layout", post(layout_handler))
        .route("/api/v1/layout", post(layout_handler))
        .route("/ocr", post(ocr_handler))
        .route("/api/v1/ocr", post(ocr_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    info!("Server listening on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /health        - Health check");
    info!("  POST /layout        - Layout deduplication and reading order");
    info!("  POST /ocr           - Character box reconstruction");
    info!("  POST /api/v1/...    - Versioned aliases");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Maps a failure to its HTTP status: bad model output is the caller's problem.
fn error_status(error: &RefineError) -> StatusCode {
    if error.is_input_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Runs a CPU-bound job off the async workers and shapes the response.
async fn run_job<R, F>(request_id: &str, job: F) -> (StatusCode, Json<BatchResponse<R>>)
where
    R: Send + 'static,
    F: FnOnce() -> Result<std::collections::BTreeMap<String, R>, RefineError> + Send + 'static,
{
    let start = Instant::now();
    match tokio::task::spawn_blocking(job).await {
        Ok(Ok(results)) => {
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            info!(
                request_id = %request_id,
                pages = results.len(),
                total_ms = elapsed_ms,
                "Request completed"
            );
            (StatusCode::OK, Json(BatchResponse::ok(results, elapsed_ms)))
        }
        Ok(Err(e)) => {
            error!(request_id = %request_id, error = %e, "Post-processing failed");
            (error_status(&e), Json(BatchResponse::error(e.to_string())))
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Worker task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BatchResponse::error(format!("worker task failed: {e}"))),
            )
        }
    }
}

async fn layout_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LayoutRequest>,
) -> (StatusCode, Json<LayoutResponse>) {
    let request_id = uuid::Uuid::new_v4().to_string();
    info!(request_id = %request_id, "Processing layout request");
    let engine = Arc::clone(&state.engine);
    run_job(&request_id, move || engine.process_layout(request)).await
}

async fn ocr_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OcrRequest>,
) -> (StatusCode, Json<OcrResponse>) {
    let request_id = uuid::Uuid::new_v4().to_string();
    info!(request_id = %request_id, "Processing OCR request");
    let engine = Arc::clone(&state.engine);
    run_job(&request_id, move || engine.process_ocr(request)).await
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        }
    }
}
