use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use scribe_core::api_types::HealthResponse;

use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    info!("Health check requested");

    let ocr = state.pipeline.ocr_engine();
    let ocr_available = ocr.is_available().await;
    let rasterizer_available = state.pipeline.rasterizer().is_available().await;

    if !ocr_available {
        tracing::warn!(engine = ocr.name(), "OCR engine is not available");
    }
    if !rasterizer_available {
        tracing::warn!("PDF rasterizer is not available; scanned PDFs will yield warnings");
    }

    // Direct PDF and DOCX extraction still work without either backend.
    let status = if ocr_available && rasterizer_available {
        "ok".to_string()
    } else {
        "degraded".to_string()
    };

    let response = HealthResponse {
        status,
        version: VERSION.to_string(),
        ocr_engine: ocr.name().to_string(),
        ocr_available,
        rasterizer_available,
    };

    (StatusCode::OK, Json(response))
}
