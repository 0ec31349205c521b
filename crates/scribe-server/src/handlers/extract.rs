use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use scribe_core::api_types::{ExtractResponse, FailureResponse};
use scribe_core::{FailureKind, ScribeError, SourceDocument, TracingProgress};
use scribe_extraction::guess_media_type;

use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// POST /api/extract: multipart upload with one or more `file` parts.
#[instrument(skip(state, multipart), fields(request_id = tracing::field::Empty))]
pub async fn extract_files(State(state): State<AppState>, multipart: Multipart) -> Response {
    let request_id = Uuid::new_v4();
    tracing::Span::current().record("request_id", tracing::field::display(request_id));

    let files = match read_files(multipart).await {
        Ok(files) => files,
        Err(e) => {
            warn!(error = %e, "Could not read upload");
            return failure(request_id, &e);
        }
    };

    info!(
        files = files.len(),
        max_upload_bytes = state.config.max_upload_bytes,
        "Received extraction request"
    );

    match state.pipeline.extract_files(files, &TracingProgress).await {
        Ok(extraction) => {
            info!(
                used_ocr = extraction.used_ocr(),
                units = extraction.unit_count(),
                warnings = extraction.warnings().len(),
                "Extraction request completed"
            );
            (StatusCode::OK, Json(ExtractResponse::new(request_id, extraction))).into_response()
        }
        Err(e) => {
            if e.is_fatal() {
                error!(error = %e, "Extraction request failed");
            }
            failure(request_id, &e)
        }
    }
}

async fn read_files(mut multipart: Multipart) -> Result<Vec<SourceDocument>, ScribeError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ScribeError::read_failed("upload", e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let media_type = field
            .content_type()
            .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
            .map(str::to_string)
            .or_else(|| file_name.as_deref().and_then(guess_media_type))
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let label = file_name.clone().unwrap_or_else(|| media_type.clone());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ScribeError::read_failed(label, e.body_text()))?;

        let mut document = SourceDocument::new(media_type, bytes.to_vec());
        if let Some(name) = file_name {
            document = document.with_name(name);
        }
        files.push(document);
    }

    Ok(files)
}

fn status_for(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::UnsupportedFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        FailureKind::MixedBatchRejected | FailureKind::EmptyRequest => StatusCode::BAD_REQUEST,
        FailureKind::ReadFailed | FailureKind::NoTextFound => StatusCode::UNPROCESSABLE_ENTITY,
        FailureKind::RasterizationFailed
        | FailureKind::RecognitionFailed
        | FailureKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure(request_id: Uuid, error: &ScribeError) -> Response {
    let body = FailureResponse::from_error(request_id, error);
    (status_for(body.kind), Json(body)).into_response()
}
