use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// Direct-extraction output for one PDF page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageText {
    Text(String),
    /// The page exists but its content could not be decoded.
    Unreadable(String),
}

impl PageText {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Unreadable(_) => "",
        }
    }
}

/// Reads the embedded text layer of a PDF, one entry per page in page order.
#[async_trait]
pub trait PdfTextLayer: Send + Sync {
    /// Fails with `ReadFailed` when the bytes are not a parseable PDF. An
    /// image-only PDF is not a failure: its pages come back as empty text.
    async fn read_pages(&self, pdf: Arc<[u8]>) -> Result<Vec<PageText>>;
}
