use std::sync::Arc;

use scribe_core::{PageText, PdfTextLayer, Result, ScribeError, SourceDocument};

use crate::docx::read_docx_text;

/// Direct-extraction output for a whole PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfText {
    pub pages: Vec<PageText>,
    /// Page texts in page order, each followed by a newline.
    pub text: String,
}

impl PdfText {
    pub fn from_pages(pages: Vec<PageText>) -> Self {
        let mut text = String::new();
        for page in &pages {
            text.push_str(page.as_str());
            text.push('\n');
        }
        Self { pages, text }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Reads embedded text without rendering or recognition.
#[derive(Clone)]
pub struct DirectTextExtractor {
    text_layer: Arc<dyn PdfTextLayer>,
}

impl DirectTextExtractor {
    pub fn new(text_layer: Arc<dyn PdfTextLayer>) -> Self {
        Self { text_layer }
    }

    /// An image-only PDF yields empty page texts, not an error.
    pub async fn pdf(&self, document: &SourceDocument) -> Result<PdfText> {
        if document.is_empty() {
            return Err(ScribeError::read_failed(document.label(), "file is empty"));
        }
        let pages = self.text_layer.read_pages(document.shared_bytes()).await?;
        Ok(PdfText::from_pages(pages))
    }

    /// Whole-document text in one step; a DOCX has no page structure.
    pub async fn docx(&self, document: &SourceDocument) -> Result<String> {
        let bytes = document.shared_bytes();
        tokio::task::spawn_blocking(move || read_docx_text(&bytes))
            .await
            .map_err(|e| ScribeError::Internal(format!("Task join error: {e}")))?
    }
}
