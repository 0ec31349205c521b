use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use scribe_core::{
    AppConfig, BatchRequest, BatchResult, Extraction, ExtractionPipeline, ExtractionResult,
    ExtractionWarning, NoopProgress, OcrEngine, OcrInput, PageRasterizer, PageText,
    PdfTextLayer, PipelineSettings, ProgressEvent, ProgressObserver, Result, ScribeError,
    SourceDocument, Strategy, TracingProgress, WarningKind,
};

use crate::batch::{file_warning, BatchCoordinator};
use crate::classify::FormatClassifier;
use crate::direct::{DirectTextExtractor, PdfText};
use crate::ocr::TesseractEngine;
use crate::pdf::LopdfTextLayer;
use crate::quality::{GateVerdict, QualityGate};
use crate::raster::PdfiumRasterizer;

/// Document ingestion pipeline: classify, extract directly, gate, fall back to
/// rasterize + OCR, and merge.
///
/// Holds no per-request state, so one instance can serve concurrent requests.
/// Within a request every page and file is handled in index order.
pub struct DocumentPipeline {
    direct: DirectTextExtractor,
    rasterizer: Arc<dyn PageRasterizer>,
    ocr: Arc<dyn OcrEngine>,
    gate: QualityGate,
    batch: BatchCoordinator,
    settings: PipelineSettings,
    progress: Arc<dyn ProgressObserver>,
}

impl DocumentPipeline {
    pub fn new(
        text_layer: Arc<dyn PdfTextLayer>,
        rasterizer: Arc<dyn PageRasterizer>,
        ocr: Arc<dyn OcrEngine>,
        settings: PipelineSettings,
    ) -> Result<Self> {
        let settings = settings.validated()?;
        Ok(Self {
            direct: DirectTextExtractor::new(text_layer),
            rasterizer,
            batch: BatchCoordinator::new(ocr.clone(), &settings),
            ocr,
            gate: QualityGate::new(settings.min_text_chars),
            settings,
            progress: Arc::new(NoopProgress),
        })
    }

    /// lopdf text layer, pdfium rendering, tesseract recognition.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(LopdfTextLayer),
            Arc::new(PdfiumRasterizer::from_config(config)),
            Arc::new(TesseractEngine::from_config(config)),
            config.pipeline_settings()?,
        )?
        .with_progress(Arc::new(TracingProgress)))
    }

    /// Default observer for calls that do not pass their own.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn ocr_engine(&self) -> &Arc<dyn OcrEngine> {
        &self.ocr
    }

    pub fn rasterizer(&self) -> &Arc<dyn PageRasterizer> {
        &self.rasterizer
    }

    /// Entry point for an upload of one or more files. A single file of any
    /// supported type yields `Extraction::Single`; several files must all be
    /// images and yield `Extraction::Batch`.
    pub async fn extract_files(
        &self,
        files: Vec<SourceDocument>,
        progress: &dyn ProgressObserver,
    ) -> Result<Extraction> {
        BatchCoordinator::validate(&files)?;

        let mut files = files;
        if files.len() == 1 {
            if let Some(document) = files.pop() {
                return self
                    .extract_with_progress(document, progress)
                    .await
                    .map(Extraction::Single);
            }
        }

        self.extract_batch_with_progress(BatchRequest::new(files), progress)
            .await
            .map(Extraction::Batch)
    }

    pub async fn extract_with_progress(
        &self,
        document: SourceDocument,
        progress: &dyn ProgressObserver,
    ) -> Result<ExtractionResult> {
        let strategy = FormatClassifier::route(&document)?;
        tracing::info!(
            file = document.label(),
            media_type = %document.media_type,
            bytes = document.len(),
            strategy = ?strategy,
            "Starting text extraction"
        );
        progress.on_progress(&ProgressEvent::Started { file_count: 1 });

        let result = match strategy {
            Strategy::Pdf => self.extract_pdf(&document, progress).await,
            Strategy::Docx => self.extract_docx(&document).await,
            Strategy::Image => self.extract_image(document, progress).await,
            Strategy::Unsupported { media_type } => {
                Err(ScribeError::UnsupportedFormat { media_type })
            }
        };

        match &result {
            Ok(extraction) => {
                tracing::info!(
                    used_ocr = extraction.used_ocr,
                    pages = extraction.page_count,
                    chars = extraction.text.len(),
                    warnings = extraction.warnings.len(),
                    "Text extraction complete"
                );
                progress.on_progress(&ProgressEvent::Finished {
                    chars: extraction.text.chars().count(),
                });
            }
            Err(e) if e.is_fatal() => tracing::error!(error = %e, "Text extraction failed"),
            Err(e) => tracing::warn!(error = %e, "Text extraction found no text"),
        }
        result
    }

    pub async fn extract_batch_with_progress(
        &self,
        batch: BatchRequest,
        progress: &dyn ProgressObserver,
    ) -> Result<BatchResult> {
        BatchCoordinator::validate(&batch.documents)?;

        // One file is not a batch; it gets the single-file rules and metadata.
        if batch.len() == 1 {
            let document = batch.documents[0].clone();
            let result = self.extract_with_progress(document, progress).await?;
            return Ok(BatchResult::from_single(result));
        }

        progress.on_progress(&ProgressEvent::Started {
            file_count: batch.len(),
        });
        let result = self.batch.run(batch, progress).await?;
        progress.on_progress(&ProgressEvent::Finished {
            chars: result.text.chars().count(),
        });
        Ok(result)
    }

    /// Two phases: read the whole text layer and judge it once, then commit
    /// the entire document to either the direct text or page-by-page OCR.
    async fn extract_pdf(
        &self,
        document: &SourceDocument,
        progress: &dyn ProgressObserver,
    ) -> Result<ExtractionResult> {
        let direct = self.direct.pdf(document).await?;
        let page_count = direct.page_count();
        let verdict = self.gate.assess(&direct.text);

        tracing::debug!(
            pages = page_count,
            chars = verdict.chars(),
            threshold = self.gate.threshold(),
            needs_ocr = verdict.needs_ocr(),
            "Assessed PDF text layer"
        );

        let (text, warnings, used_ocr) = match verdict {
            GateVerdict::Accept { .. } => {
                let warnings = direct_page_warnings(&direct);
                (direct.text, warnings, false)
            }
            GateVerdict::OcrFallback { chars } => {
                tracing::info!(
                    chars,
                    threshold = self.gate.threshold(),
                    pages = page_count,
                    "Minimal text extracted, running OCR on every page"
                );
                progress.on_progress(&ProgressEvent::MinimalText {
                    chars,
                    threshold: self.gate.threshold(),
                });
                let (text, warnings) = self.ocr_pdf_pages(document, page_count, progress).await;
                progress.on_progress(&ProgressEvent::OcrComplete { pages: page_count });
                (text, warnings, true)
            }
        };

        finalize(text, used_ocr, page_count, warnings)
    }

    /// Render and recognise each page in turn. A page that fails at either
    /// step adds a warning and no text; the loop always continues.
    async fn ocr_pdf_pages(
        &self,
        document: &SourceDocument,
        page_count: usize,
        progress: &dyn ProgressObserver,
    ) -> (String, Vec<ExtractionWarning>) {
        let mut text = String::new();
        let mut warnings = Vec::new();

        // One load of the document serves every page.
        let mut session = self.rasterizer.open(document.shared_bytes()).await;
        if let Err(e) = &session {
            tracing::warn!(error = %e, "Could not open PDF for rendering");
        }

        for page_index in 0..page_count {
            let page_number = page_index + 1;
            progress.on_progress(&ProgressEvent::OcrPage {
                page: page_number,
                total: page_count,
            });

            let rendered = match &mut session {
                Ok(session) => {
                    session
                        .render_page(page_index, self.settings.raster_scale)
                        .await
                }
                Err(e) => Err(ScribeError::Rasterization(unit_message(e))),
            };
            let image = match rendered {
                Ok(image) => image,
                Err(e) => {
                    tracing::warn!(page = page_number, error = %e, "Could not rasterize page");
                    warnings.push(ExtractionWarning::page(
                        WarningKind::RasterizationFailed,
                        page_number,
                        unit_message(&e),
                    ));
                    continue;
                }
            };

            match self
                .ocr
                .recognize(OcrInput::Bitmap(image), &self.settings.ocr_language)
                .await
            {
                Ok(page_text) => {
                    if page_text.trim().is_empty() {
                        warnings.push(ExtractionWarning::page(
                            WarningKind::EmptyUnit,
                            page_number,
                            "",
                        ));
                    }
                    tracing::debug!(page = page_number, chars = page_text.len(), "Recognised page");
                    text.push_str(&page_text);
                    text.push('\n');
                }
                Err(e) => {
                    tracing::warn!(page = page_number, error = %e, "Could not recognise page");
                    warnings.push(ExtractionWarning::page(
                        WarningKind::RecognitionFailed,
                        page_number,
                        unit_message(&e),
                    ));
                }
            }
        }

        (text, warnings)
    }

    async fn extract_docx(&self, document: &SourceDocument) -> Result<ExtractionResult> {
        if document.is_empty() {
            return Err(ScribeError::read_failed(document.label(), "file is empty"));
        }
        let text = self.direct.docx(document).await?;
        finalize(text, false, 0, Vec::new())
    }

    /// A single image goes through the same per-file step as a batch. Here an
    /// unreadable file is fatal, since it is the whole request.
    async fn extract_image(
        &self,
        document: SourceDocument,
        progress: &dyn ProgressObserver,
    ) -> Result<ExtractionResult> {
        let outcomes = self
            .batch
            .recognize_all(std::slice::from_ref(&document), progress)
            .await;

        let mut warnings = Vec::new();
        let mut text = String::new();
        for (index, outcome) in outcomes {
            match outcome {
                Ok(recognised) => {
                    if recognised.trim().is_empty() {
                        warnings.push(ExtractionWarning::file(WarningKind::EmptyUnit, index + 1, ""));
                    }
                    text = recognised;
                }
                Err(e @ ScribeError::ReadFailed { .. }) => return Err(e),
                Err(e) => warnings.push(file_warning(index, &e)),
            }
        }

        finalize(text, true, 1, warnings)
    }
}

#[async_trait]
impl ExtractionPipeline for DocumentPipeline {
    async fn extract(&self, document: SourceDocument) -> Result<ExtractionResult> {
        self.extract_with_progress(document, &*self.progress).await
    }

    async fn extract_batch(&self, batch: BatchRequest) -> Result<BatchResult> {
        self.extract_batch_with_progress(batch, &*self.progress).await
    }
}

fn finalize(
    text: String,
    used_ocr: bool,
    page_count: usize,
    warnings: Vec<ExtractionWarning>,
) -> Result<ExtractionResult> {
    if text.trim().is_empty() {
        return Err(ScribeError::NoTextFound { warnings });
    }
    Ok(ExtractionResult {
        text,
        used_ocr,
        page_count,
        warnings,
        extracted_at: Utc::now(),
    })
}

/// Pages of an accepted text layer that contributed nothing.
fn direct_page_warnings(direct: &PdfText) -> Vec<ExtractionWarning> {
    direct
        .pages
        .iter()
        .enumerate()
        .filter_map(|(index, page)| match page {
            PageText::Unreadable(reason) => Some(ExtractionWarning::page(
                WarningKind::TextLayerFailed,
                index + 1,
                reason.clone(),
            )),
            PageText::Text(text) if text.trim().is_empty() => Some(ExtractionWarning::page(
                WarningKind::EmptyUnit,
                index + 1,
                "",
            )),
            PageText::Text(_) => None,
        })
        .collect()
}

/// Message of a per-unit error without the variant prefix.
fn unit_message(error: &ScribeError) -> String {
    match error {
        ScribeError::Rasterization(message) | ScribeError::Recognition(message) => message.clone(),
        other => other.to_string(),
    }
}
