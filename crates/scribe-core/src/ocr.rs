use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::raster::PageImage;

/// What gets handed to the recognizer: an uploaded image file as-is, or a
/// freshly rendered page bitmap.
#[derive(Debug)]
pub enum OcrInput {
    Encoded(Arc<[u8]>),
    Bitmap(PageImage),
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the backend can run at all (binary installed, model loaded).
    async fn is_available(&self) -> bool;

    /// Returns the recognized text, possibly empty. Errors are
    /// `ScribeError::Recognition` and only concern this one input.
    async fn recognize(&self, input: OcrInput, language: &str) -> Result<String>;
}
