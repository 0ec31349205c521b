pub mod api_types;
pub mod config;
pub mod document;
pub mod error;
pub mod extraction;
pub mod ocr;
pub mod progress;
pub mod raster;
pub mod result;
pub mod text_layer;

pub use config::{AppConfig, PipelineSettings};
pub use document::{normalize_media_type, BatchRequest, SourceDocument, Strategy};
pub use error::{FailureKind, Result, ScribeError};
pub use extraction::ExtractionPipeline;
pub use ocr::{OcrEngine, OcrInput};
pub use progress::{ChannelProgress, NoopProgress, ProgressEvent, ProgressObserver, TracingProgress};
pub use raster::{PageImage, PageRasterizer, RenderSession};
pub use result::{BatchResult, Extraction, ExtractionResult, ExtractionWarning, WarningKind};
pub use text_layer::{PageText, PdfTextLayer};
