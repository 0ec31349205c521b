use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub const MEDIA_TYPE_PDF: &str = "application/pdf";
pub const MEDIA_TYPE_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MEDIA_TYPE_JPEG: &str = "image/jpeg";
pub const MEDIA_TYPE_PNG: &str = "image/png";

/// Raw bytes of one uploaded file plus the media type the uploader declared.
///
/// The bytes are shared behind an `Arc` so blocking parse/render steps can own
/// a handle without copying the file.
#[derive(Clone)]
pub struct SourceDocument {
    pub name: Option<String>,
    pub media_type: String,
    bytes: Arc<[u8]>,
}

impl SourceDocument {
    pub fn new(media_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: None,
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn shared_bytes(&self) -> Arc<[u8]> {
        self.bytes.clone()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_image(&self) -> bool {
        normalize_media_type(&self.media_type).starts_with("image/")
    }

    /// Name used in logs and warnings: the file name when known, else the media type.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.media_type)
    }
}

impl fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceDocument")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Lower-cased essence of a media type, with any `; param=...` suffix removed.
pub fn normalize_media_type(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Ordered set of files submitted together.
#[derive(Debug, Clone, Default)]
pub struct BatchRequest {
    pub documents: Vec<SourceDocument>,
}

impl BatchRequest {
    pub fn new(documents: Vec<SourceDocument>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Media types of the files that break the "all images" rule.
    pub fn non_images(&self) -> Vec<String> {
        non_image_types(&self.documents)
    }
}

pub fn non_image_types(documents: &[SourceDocument]) -> Vec<String> {
    documents
        .iter()
        .filter(|d| !d.is_image())
        .map(|d| d.media_type.clone())
        .collect()
}

impl From<Vec<SourceDocument>> for BatchRequest {
    fn from(documents: Vec<SourceDocument>) -> Self {
        Self::new(documents)
    }
}

/// Which extraction path a file takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Pdf,
    Docx,
    Image,
    Unsupported { media_type: String },
}
