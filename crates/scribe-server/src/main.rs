use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod handlers;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("scribe=info".parse().unwrap()))
        .init();

    let config = scribe_core::AppConfig::from_env();
    let host = config.server_host.clone();
    let port = config.server_port;
    let body_limit = config.max_upload_bytes;

    let pipeline = Arc::new(
        scribe_extraction::DocumentPipeline::from_config(&config)
            .expect("Invalid extraction settings"),
    );

    tracing::info!(
        language = %pipeline.settings().ocr_language,
        min_text_chars = pipeline.settings().min_text_chars,
        raster_scale = pipeline.settings().raster_scale,
        ocr_concurrency = pipeline.settings().ocr_concurrency,
        "Extraction pipeline ready"
    );

    let state = AppState { config, pipeline };

    let app = routes::create_router()
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("{host}:{port}");
    tracing::info!("scribe server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
