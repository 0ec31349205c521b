use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, ScribeError};

/// An RGBA8 bitmap of one rendered PDF page.
///
/// Lives only between rendering and recognition; handing it to an
/// [`OcrEngine`](crate::ocr::OcrEngine) moves it, so the pixel buffer is freed
/// as soon as recognition finishes or is abandoned.
pub struct PageImage {
    pub page_index: usize,
    pub width: u32,
    pub height: u32,
    pixels: Vec<u8>,
}

impl PageImage {
    pub fn new(page_index: usize, width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(ScribeError::Rasterization(format!(
                "pixel buffer for page {} has {} bytes, expected {expected}",
                page_index + 1,
                pixels.len()
            )));
        }
        Ok(Self {
            page_index,
            width,
            height,
            pixels,
        })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

impl fmt::Debug for PageImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageImage")
            .field("page_index", &self.page_index)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Renders PDF pages to bitmaps.
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    /// Whether the rendering backend can be loaded at all.
    async fn is_available(&self) -> bool;

    /// Loads `pdf` once for rendering. Failure here means no page of the
    /// document can be rendered.
    async fn open(&self, pdf: Arc<[u8]>) -> Result<Box<dyn RenderSession>>;
}

/// One loaded document. `&mut self` keeps rendering to one page at a time;
/// the document is released when the session is dropped.
#[async_trait]
pub trait RenderSession: Send {
    /// `page_index` is zero-based. Failure is per page and recoverable.
    async fn render_page(&mut self, page_index: usize, scale: f32) -> Result<PageImage>;
}
