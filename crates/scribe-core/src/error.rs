use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::result::ExtractionWarning;

#[derive(Error, Debug)]
pub enum ScribeError {
    #[error("Unsupported file type: {media_type}. Please upload a PDF, DOCX, JPG, or PNG file.")]
    UnsupportedFormat { media_type: String },

    #[error("Multiple files can only be submitted when every file is an image ({file_count} files, not images: {})", .offending.join(", "))]
    MixedBatchRejected {
        file_count: usize,
        offending: Vec<String>,
    },

    #[error("Could not read {unit}: {reason}")]
    ReadFailed { unit: String, reason: String },

    #[error("No text could be found in the submitted file(s)")]
    NoTextFound { warnings: Vec<ExtractionWarning> },

    #[error("No files were submitted")]
    EmptyRequest,

    #[error("Rasterization error: {0}")]
    Rasterization(String),

    #[error("Recognition error: {0}")]
    Recognition(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Small, enumerable failure kind surfaced to callers alongside the message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnsupportedFormat,
    MixedBatchRejected,
    ReadFailed,
    NoTextFound,
    EmptyRequest,
    RasterizationFailed,
    RecognitionFailed,
    Internal,
}

impl ScribeError {
    pub fn read_failed(unit: impl Into<String>, reason: impl ToString) -> Self {
        Self::ReadFailed {
            unit: unit.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::UnsupportedFormat { .. } => FailureKind::UnsupportedFormat,
            Self::MixedBatchRejected { .. } => FailureKind::MixedBatchRejected,
            Self::ReadFailed { .. } => FailureKind::ReadFailed,
            Self::NoTextFound { .. } => FailureKind::NoTextFound,
            Self::EmptyRequest => FailureKind::EmptyRequest,
            Self::Rasterization(_) => FailureKind::RasterizationFailed,
            Self::Recognition(_) => FailureKind::RecognitionFailed,
            Self::Config(_) | Self::Internal(_) => FailureKind::Internal,
        }
    }

    /// `NoTextFound` means every stage ran and produced nothing; it is a
    /// terminal state rather than a failure to process.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::NoTextFound { .. })
    }

    /// Warnings collected before the request ended, if any.
    pub fn warnings(&self) -> &[ExtractionWarning] {
        match self {
            Self::NoTextFound { warnings } => warnings,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, ScribeError>;
