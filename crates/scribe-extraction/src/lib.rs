pub mod batch;
pub mod classify;
pub mod direct;
pub mod docx;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod quality;
pub mod raster;

pub use batch::BatchCoordinator;
pub use classify::{classify, guess_media_type, FormatClassifier};
pub use direct::{DirectTextExtractor, PdfText};
pub use ocr::{encode_png, TesseractEngine};
pub use pdf::LopdfTextLayer;
pub use pipeline::DocumentPipeline;
pub use quality::{GateVerdict, QualityGate};
pub use raster::PdfiumRasterizer;
