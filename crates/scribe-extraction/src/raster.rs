//! Page rendering via pdfium.
//!
//! The pdfium library is bound once per process and never unloaded. Each
//! opened document gets its own blocking worker thread that owns the loaded
//! `PdfDocument` and renders the pages it is asked for, one at a time. If the
//! library cannot be found, opening fails and the pipeline records a warning
//! for every page.

use std::sync::{mpsc, Arc, Mutex, OnceLock};

use async_trait::async_trait;
use pdfium_render::prelude::*;
use tokio::sync::oneshot;

use scribe_core::{AppConfig, PageImage, PageRasterizer, RenderSession, Result, ScribeError};

static PDFIUM: OnceLock<Pdfium> = OnceLock::new();
static BINDING: Mutex<()> = Mutex::new(());

/// The process-wide pdfium instance, bound on first use.
///
/// `Pdfium::new` initialises the library's global state and dropping it tears
/// that state down, so exactly one instance may exist and it must outlive
/// every document.
fn shared_pdfium(library_path: Option<&str>) -> Result<&'static Pdfium> {
    if let Some(pdfium) = PDFIUM.get() {
        return Ok(pdfium);
    }

    let _guard = BINDING
        .lock()
        .map_err(|_| ScribeError::Rasterization("pdfium binding lock poisoned".into()))?;
    if let Some(pdfium) = PDFIUM.get() {
        return Ok(pdfium);
    }

    let bindings = match library_path {
        Some(path) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path)),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("/usr/lib"))
            })
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                    "/usr/local/lib",
                ))
            })
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| ScribeError::Rasterization(format!("Failed to bind pdfium: {e}")))?;

    tracing::info!("Bound pdfium library");
    Ok(PDFIUM.get_or_init(|| Pdfium::new(bindings)))
}

#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    library_path: Option<String>,
}

impl PdfiumRasterizer {
    pub fn new(library_path: Option<String>) -> Self {
        Self { library_path }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.pdfium_library_path.clone())
    }
}

#[async_trait]
impl PageRasterizer for PdfiumRasterizer {
    async fn is_available(&self) -> bool {
        let library_path = self.library_path.clone();
        tokio::task::spawn_blocking(move || shared_pdfium(library_path.as_deref()).is_ok())
            .await
            .unwrap_or(false)
    }

    async fn open(&self, pdf: Arc<[u8]>) -> Result<Box<dyn RenderSession>> {
        let library_path = self.library_path.clone();
        let (requests, inbox) = mpsc::channel();
        let (ready, opened) = oneshot::channel();

        tokio::task::spawn_blocking(move || {
            render_worker(library_path.as_deref(), &pdf, inbox, ready)
        });

        let pages = opened
            .await
            .map_err(|_| ScribeError::Rasterization("render worker exited".into()))??;
        tracing::debug!(pages, "Opened PDF for rendering");

        Ok(Box::new(PdfiumSession { requests }))
    }
}

struct RenderRequest {
    page_index: usize,
    scale: f32,
    reply: oneshot::Sender<Result<PageImage>>,
}

pub struct PdfiumSession {
    requests: mpsc::Sender<RenderRequest>,
}

#[async_trait]
impl RenderSession for PdfiumSession {
    async fn render_page(&mut self, page_index: usize, scale: f32) -> Result<PageImage> {
        let (reply, rendered) = oneshot::channel();
        self.requests
            .send(RenderRequest {
                page_index,
                scale,
                reply,
            })
            .map_err(|_| ScribeError::Rasterization("render worker exited".into()))?;

        let image = rendered
            .await
            .map_err(|_| ScribeError::Rasterization("render worker exited".into()))??;

        tracing::debug!(
            page = page_index + 1,
            width = image.width,
            height = image.height,
            scale,
            "Rendered page"
        );
        Ok(image)
    }
}

/// Loads the document once, reports its page count, then serves render
/// requests until the session is dropped.
fn render_worker(
    library_path: Option<&str>,
    pdf: &[u8],
    inbox: mpsc::Receiver<RenderRequest>,
    ready: oneshot::Sender<Result<usize>>,
) {
    let loaded = shared_pdfium(library_path).and_then(|pdfium| {
        pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| ScribeError::Rasterization(format!("Failed to load PDF: {e}")))
    });
    let document = match loaded {
        Ok(document) => document,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    if ready.send(Ok(document.pages().len() as usize)).is_err() {
        return;
    }
    while let Ok(request) = inbox.recv() {
        let rendered = render(&document, request.page_index, request.scale);
        // A dropped receiver means the caller gave up on this page.
        let _ = request.reply.send(rendered);
    }
}

fn render(document: &PdfDocument<'_>, page_index: usize, scale: f32) -> Result<PageImage> {
    let index = PdfPageIndex::try_from(page_index)
        .map_err(|e| ScribeError::Rasterization(format!("Page index {page_index}: {e}")))?;
    let page = document.pages().get(index).map_err(|e| {
        ScribeError::Rasterization(format!("Page {} not found: {e}", page_index + 1))
    })?;

    let config = PdfRenderConfig::new().scale_page_by_factor(scale);
    let bitmap = page.render_with_config(&config).map_err(|e| {
        ScribeError::Rasterization(format!(
            "Failed to render page {}: {e}",
            page_index + 1
        ))
    })?;

    let rgba = bitmap.as_image().to_rgba8();
    let (width, height) = rgba.dimensions();
    PageImage::new(page_index, width, height, rgba.into_raw())
}
