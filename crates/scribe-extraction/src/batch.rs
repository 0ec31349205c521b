use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use scribe_core::document::non_image_types;
use scribe_core::{
    BatchRequest, BatchResult, ExtractionWarning, OcrEngine, OcrInput, PipelineSettings,
    ProgressEvent, ProgressObserver, Result, ScribeError, SourceDocument, WarningKind,
};

/// Runs OCR over uploaded image files and merges the results.
///
/// Files are recognised through a bounded pool of `ocr_concurrency` workers
/// (1 by default, which is strictly sequential). Outcomes are re-sorted by file
/// index before merging, so the text order never depends on completion order.
#[derive(Clone)]
pub struct BatchCoordinator {
    ocr: Arc<dyn OcrEngine>,
    language: String,
    concurrency: usize,
}

/// Outcome of one file, tagged with its zero-based position in the request.
pub type FileOutcome = (usize, Result<String>);

impl BatchCoordinator {
    pub fn new(ocr: Arc<dyn OcrEngine>, settings: &PipelineSettings) -> Self {
        Self {
            ocr,
            language: settings.ocr_language.clone(),
            concurrency: settings.ocr_concurrency.max(1),
        }
    }

    /// Rejects empty requests, and multi-file requests containing anything
    /// other than images. Runs before any extraction work.
    pub fn validate(documents: &[SourceDocument]) -> Result<()> {
        if documents.is_empty() {
            return Err(ScribeError::EmptyRequest);
        }
        if documents.len() > 1 {
            let offending = non_image_types(documents);
            if !offending.is_empty() {
                tracing::warn!(
                    files = documents.len(),
                    offending = ?offending,
                    "Rejecting mixed batch"
                );
                return Err(ScribeError::MixedBatchRejected {
                    file_count: documents.len(),
                    offending,
                });
            }
        }
        Ok(())
    }

    /// Recognises every file and returns outcomes in file order.
    pub async fn recognize_all(
        &self,
        documents: &[SourceDocument],
        progress: &dyn ProgressObserver,
    ) -> Vec<FileOutcome> {
        let total = documents.len();

        let mut outcomes: Vec<FileOutcome> = stream::iter(documents.iter().cloned().enumerate())
            .map(|(index, document)| async move {
                progress.on_progress(&ProgressEvent::OcrImage {
                    file: index + 1,
                    total,
                });
                (index, self.recognize_one(index, &document).await)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        outcomes.sort_by_key(|(index, _)| *index);
        outcomes
    }

    async fn recognize_one(&self, index: usize, document: &SourceDocument) -> Result<String> {
        if document.is_empty() {
            return Err(ScribeError::read_failed(document.label(), "file is empty"));
        }
        image::guess_format(document.bytes()).map_err(|e| {
            ScribeError::read_failed(document.label(), format!("not a readable image: {e}"))
        })?;

        tracing::debug!(
            file_index = index,
            file = document.label(),
            bytes = document.len(),
            engine = self.ocr.name(),
            "Recognising image"
        );
        self.ocr
            .recognize(OcrInput::Encoded(document.shared_bytes()), &self.language)
            .await
    }

    /// Validate, iterate, finalize. Per-file failures become warnings; only
    /// validation failures and "nothing recognised anywhere" end the request.
    pub async fn run(
        &self,
        batch: BatchRequest,
        progress: &dyn ProgressObserver,
    ) -> Result<BatchResult> {
        Self::validate(&batch.documents)?;
        tracing::info!(files = batch.len(), "Starting image batch");

        let outcomes = self.recognize_all(&batch.documents, progress).await;

        let mut segments = Vec::with_capacity(outcomes.len());
        let mut warnings = Vec::new();
        for (index, outcome) in outcomes {
            match outcome {
                Ok(text) if text.trim().is_empty() => {
                    warnings.push(ExtractionWarning::file(WarningKind::EmptyUnit, index + 1, ""));
                }
                Ok(text) => segments.push(text.trim().to_string()),
                Err(e) => {
                    tracing::warn!(file_index = index, error = %e, "Image failed in batch");
                    warnings.push(file_warning(index, &e));
                }
            }
        }

        let text = segments.join("\n\n");
        if text.is_empty() {
            tracing::warn!(
                files = batch.len(),
                warnings = warnings.len(),
                "No text found in any image"
            );
            return Err(ScribeError::NoTextFound { warnings });
        }

        if warnings.is_empty() {
            tracing::info!(files = batch.len(), chars = text.len(), "Image batch complete");
        } else {
            tracing::warn!(
                succeeded = segments.len(),
                warnings = warnings.len(),
                "Image batch completed with partial failures"
            );
        }

        Ok(BatchResult {
            text,
            used_ocr: true,
            file_count: batch.len(),
            page_count: batch.len(),
            segment_count: segments.len(),
            warnings,
            extracted_at: Utc::now(),
        })
    }
}

/// Warning for a file that contributed no text.
pub fn file_warning(index: usize, error: &ScribeError) -> ExtractionWarning {
    match error {
        ScribeError::ReadFailed { reason, .. } => {
            ExtractionWarning::file(WarningKind::ReadFailed, index + 1, reason.clone())
        }
        ScribeError::Recognition(message) => {
            ExtractionWarning::file(WarningKind::RecognitionFailed, index + 1, message.clone())
        }
        other => ExtractionWarning::file(WarningKind::RecognitionFailed, index + 1, other.to_string()),
    }
}
