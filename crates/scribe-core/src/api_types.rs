use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FailureKind, ScribeError};
use crate::result::{Extraction, ExtractionWarning};

// --- Health ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ocr_engine: String,
    pub ocr_available: bool,
    pub rasterizer_available: bool,
}

// --- Extraction ---

/// The extraction's own fields (`type`, `text`, `used_ocr`, `warnings`, ...)
/// sit at the top level next to the request id.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub request_id: Uuid,
    #[serde(flatten)]
    pub result: Extraction,
}

impl ExtractResponse {
    pub fn new(request_id: Uuid, result: Extraction) -> Self {
        Self { request_id, result }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FailureResponse {
    pub request_id: Uuid,
    pub kind: FailureKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ExtractionWarning>,
}

impl FailureResponse {
    pub fn from_error(request_id: Uuid, error: &ScribeError) -> Self {
        Self {
            request_id,
            kind: error.kind(),
            message: error.to_string(),
            warnings: error.warnings().to_vec(),
        }
    }
}
