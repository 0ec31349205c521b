use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Page could not be rendered to a bitmap.
    RasterizationFailed,
    /// OCR failed for a page or file.
    RecognitionFailed,
    /// A file inside a batch could not be decoded at all.
    ReadFailed,
    /// The text layer of a single page could not be read.
    TextLayerFailed,
    /// The unit was processed but yielded no text.
    EmptyUnit,
}

/// A recoverable, per-unit problem. The unit (page or file) contributed no text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionWarning {
    pub kind: WarningKind,
    pub unit: String,
    pub message: String,
}

impl ExtractionWarning {
    pub fn new(kind: WarningKind, unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            unit: unit.into(),
            message: message.into(),
        }
    }

    pub fn page(kind: WarningKind, page_number: usize, message: impl Into<String>) -> Self {
        Self::new(kind, format!("page {page_number}"), message)
    }

    pub fn file(kind: WarningKind, file_number: usize, message: impl Into<String>) -> Self {
        Self::new(kind, format!("file {file_number}"), message)
    }
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WarningKind::RasterizationFailed => {
                write!(f, "could not rasterize {}: {}", self.unit, self.message)
            }
            WarningKind::RecognitionFailed => {
                write!(f, "could not recognize text in {}: {}", self.unit, self.message)
            }
            WarningKind::ReadFailed => write!(f, "could not read {}: {}", self.unit, self.message),
            WarningKind::TextLayerFailed => {
                write!(f, "could not read text layer of {}: {}", self.unit, self.message)
            }
            WarningKind::EmptyUnit => write!(f, "no text found in {}", self.unit),
        }
    }
}

/// Text extracted from one SourceDocument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text: String,
    pub used_ocr: bool,
    pub page_count: usize,
    pub warnings: Vec<ExtractionWarning>,
    pub extracted_at: DateTime<Utc>,
}

impl ExtractionResult {
    pub fn new(
        text: String,
        used_ocr: bool,
        page_count: usize,
        warnings: Vec<ExtractionWarning>,
    ) -> Self {
        Self {
            text,
            used_ocr,
            page_count,
            warnings,
            extracted_at: Utc::now(),
        }
    }
}

/// Text extracted from a batch submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Per-file texts in submission order, separated by a blank line.
    pub text: String,
    pub used_ocr: bool,
    pub file_count: usize,
    /// One per image, or the pages of a lone non-image document.
    pub page_count: usize,
    /// Number of files that contributed a text segment.
    pub segment_count: usize,
    pub warnings: Vec<ExtractionWarning>,
    pub extracted_at: DateTime<Utc>,
}

impl BatchResult {
    /// A one-file batch, carrying the single-file metadata over unchanged.
    pub fn from_single(result: ExtractionResult) -> Self {
        Self {
            segment_count: usize::from(!result.text.trim().is_empty()),
            text: result.text,
            used_ocr: result.used_ocr,
            file_count: 1,
            page_count: result.page_count,
            warnings: result.warnings,
            extracted_at: result.extracted_at,
        }
    }
}

/// Outcome of a submission of one or more files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Extraction {
    Single(ExtractionResult),
    Batch(BatchResult),
}

impl Extraction {
    pub fn text(&self) -> &str {
        match self {
            Self::Single(r) => &r.text,
            Self::Batch(r) => &r.text,
        }
    }

    pub fn warnings(&self) -> &[ExtractionWarning] {
        match self {
            Self::Single(r) => &r.warnings,
            Self::Batch(r) => &r.warnings,
        }
    }

    pub fn used_ocr(&self) -> bool {
        match self {
            Self::Single(r) => r.used_ocr,
            Self::Batch(r) => r.used_ocr,
        }
    }

    /// Pages for a single document, files for a batch.
    pub fn unit_count(&self) -> usize {
        match self {
            Self::Single(r) => r.page_count,
            Self::Batch(r) => r.file_count,
        }
    }
}
