//! Scripted stand-ins for the pipeline's backends, and in-memory fixtures.
//!
//! The fakes count every call so tests can assert that a stage never ran.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use scribe_core::{
    OcrEngine, OcrInput, PageImage, PageRasterizer, PageText, PdfTextLayer, PipelineSettings,
    ProgressEvent, ProgressObserver, RenderSession, Result, ScribeError,
};
use scribe_extraction::DocumentPipeline;

pub const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

// ---------------------------------------------------------------------------
// PdfTextLayer
// ---------------------------------------------------------------------------

pub struct ScriptedTextLayer {
    pages: Vec<PageText>,
    unreadable: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedTextLayer {
    pub fn with_pages(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|p| PageText::Text(p.to_string())).collect(),
            unreadable: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_page_texts(pages: Vec<PageText>) -> Self {
        Self {
            pages,
            unreadable: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails as if the file were not a PDF.
    pub fn corrupt(reason: &str) -> Self {
        Self {
            pages: Vec::new(),
            unreadable: Some(reason.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PdfTextLayer for ScriptedTextLayer {
    async fn read_pages(&self, _pdf: Arc<[u8]>) -> Result<Vec<PageText>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.unreadable {
            Some(reason) => Err(ScribeError::read_failed("PDF", reason)),
            None => Ok(self.pages.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// PageRasterizer
// ---------------------------------------------------------------------------

/// Renders a 1x1 bitmap per page; pages listed in `failing` cannot get a surface.
pub struct ScriptedRasterizer {
    log: Arc<RasterLog>,
    unopenable: bool,
}

#[derive(Default)]
struct RasterLog {
    failing: HashSet<usize>,
    opens: AtomicUsize,
    rendered: Mutex<Vec<usize>>,
    scales: Mutex<Vec<f32>>,
}

impl ScriptedRasterizer {
    pub fn new() -> Self {
        Self::failing_pages(&[])
    }

    /// `pages` are zero-based indices.
    pub fn failing_pages(pages: &[usize]) -> Self {
        Self {
            log: Arc::new(RasterLog {
                failing: pages.iter().copied().collect(),
                ..RasterLog::default()
            }),
            unopenable: false,
        }
    }

    /// Every document fails to load, as when the rendering library is missing.
    pub fn unopenable() -> Self {
        Self {
            unopenable: true,
            ..Self::new()
        }
    }

    pub fn opens(&self) -> usize {
        self.log.opens.load(Ordering::SeqCst)
    }

    /// Zero-based page indices in the order they were requested.
    pub fn rendered(&self) -> Vec<usize> {
        self.log.rendered.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.log.rendered.lock().unwrap().len()
    }

    pub fn scales(&self) -> Vec<f32> {
        self.log.scales.lock().unwrap().clone()
    }
}

impl Default for ScriptedRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageRasterizer for ScriptedRasterizer {
    async fn is_available(&self) -> bool {
        !self.unopenable
    }

    async fn open(&self, _pdf: Arc<[u8]>) -> Result<Box<dyn RenderSession>> {
        self.log.opens.fetch_add(1, Ordering::SeqCst);
        if self.unopenable {
            return Err(ScribeError::Rasterization(
                "Failed to bind pdfium: library not found".into(),
            ));
        }
        Ok(Box::new(ScriptedSession {
            log: self.log.clone(),
        }))
    }
}

struct ScriptedSession {
    log: Arc<RasterLog>,
}

#[async_trait]
impl RenderSession for ScriptedSession {
    async fn render_page(&mut self, page_index: usize, scale: f32) -> Result<PageImage> {
        self.log.rendered.lock().unwrap().push(page_index);
        self.log.scales.lock().unwrap().push(scale);
        if self.log.failing.contains(&page_index) {
            return Err(ScribeError::Rasterization(
                "unable to acquire a drawing surface".into(),
            ));
        }
        PageImage::new(page_index, 1, 1, vec![0, 0, 0, 255])
    }
}

// ---------------------------------------------------------------------------
// OcrEngine
// ---------------------------------------------------------------------------

/// Bitmaps recognise as `"ocr page N"`. Encoded images built with
/// [`labeled_png`] recognise as `"text of LABEL"`; a label starting with
/// `fail` errors, `blank` yields nothing, and `slow` finishes late.
pub struct ScriptedOcr {
    failing_pages: HashSet<usize>,
    calls: AtomicUsize,
    languages: Mutex<Vec<String>>,
}

impl ScriptedOcr {
    pub fn new() -> Self {
        Self::failing_pages(&[])
    }

    /// `pages` are zero-based indices.
    pub fn failing_pages(pages: &[usize]) -> Self {
        Self {
            failing_pages: pages.iter().copied().collect(),
            calls: AtomicUsize::new(0),
            languages: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn languages(&self) -> Vec<String> {
        self.languages.lock().unwrap().clone()
    }
}

impl Default for ScriptedOcr {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrEngine for ScriptedOcr {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn recognize(&self, input: OcrInput, language: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.languages.lock().unwrap().push(language.to_string());

        match input {
            OcrInput::Bitmap(page) => {
                if self.failing_pages.contains(&page.page_index) {
                    return Err(ScribeError::Recognition("recognizer crashed".into()));
                }
                Ok(format!("ocr page {}", page.page_index + 1))
            }
            OcrInput::Encoded(bytes) => {
                let label = String::from_utf8_lossy(&bytes[PNG_SIGNATURE.len().min(bytes.len())..])
                    .to_string();
                if label.starts_with("fail") {
                    return Err(ScribeError::Recognition(format!("could not read {label}")));
                }
                if label.starts_with("blank") {
                    return Ok("  \n".into());
                }
                if label.starts_with("slow") {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
                Ok(format!("text of {label}\n"))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressObserver for RecordingProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

pub struct Harness {
    pub text_layer: Arc<ScriptedTextLayer>,
    pub rasterizer: Arc<ScriptedRasterizer>,
    pub ocr: Arc<ScriptedOcr>,
    pub pipeline: DocumentPipeline,
}

impl Harness {
    pub fn new(text_layer: ScriptedTextLayer, rasterizer: ScriptedRasterizer, ocr: ScriptedOcr) -> Self {
        Self::with_settings(text_layer, rasterizer, ocr, PipelineSettings::default())
    }

    pub fn with_settings(
        text_layer: ScriptedTextLayer,
        rasterizer: ScriptedRasterizer,
        ocr: ScriptedOcr,
        settings: PipelineSettings,
    ) -> Self {
        let text_layer = Arc::new(text_layer);
        let rasterizer = Arc::new(rasterizer);
        let ocr = Arc::new(ocr);
        let pipeline = DocumentPipeline::new(
            text_layer.clone(),
            rasterizer.clone(),
            ocr.clone(),
            settings,
        )
        .expect("default settings are valid");
        Self {
            text_layer,
            rasterizer,
            ocr,
            pipeline,
        }
    }

    /// Pipeline whose PDF backend reports `pages` as the text layer.
    pub fn pdf(pages: &[&str]) -> Self {
        Self::new(
            ScriptedTextLayer::with_pages(pages),
            ScriptedRasterizer::new(),
            ScriptedOcr::new(),
        )
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Bytes that sniff as PNG and tell [`ScriptedOcr`] what to return.
pub fn labeled_png(label: &str) -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend_from_slice(label.as_bytes());
    bytes
}

/// Minimal wordprocessingml package with one run per paragraph.
pub fn docx_package(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let options = zip::write::SimpleFileOptions::default();
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(b"<Types/>").unwrap();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(document.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

/// A real PDF with one text object per page, readable by lopdf.
pub fn text_pdf(pages: &[&str]) -> Vec<u8> {
    let pages: Vec<[&str; 1]> = pages.iter().map(|page| [*page]).collect();
    let pages: Vec<&[&str]> = pages.iter().map(|page| page.as_slice()).collect();
    text_pdf_runs(&pages)
}

/// A real PDF whose pages each hold one text object with a `Tj` per run.
pub fn text_pdf_runs(pages: &[&[&str]]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for runs in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 11.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        for run in runs.iter() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*run)]));
            operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
        }
        operations.push(Operation::new("ET", vec![]));
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}
