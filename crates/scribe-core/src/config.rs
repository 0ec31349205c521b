use serde::{Deserialize, Serialize};

use crate::error::{Result, ScribeError};

/// Direct extraction shorter than this (trimmed, in characters) sends the
/// whole PDF through OCR.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 100;
/// Scale factor applied when rendering PDF pages for OCR.
pub const DEFAULT_RASTER_SCALE: f32 = 1.5;
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub ocr_language: String,
    pub min_text_chars: usize,
    pub raster_scale: f32,
    pub ocr_concurrency: usize,
    pub tesseract_path: String,
    pub ocr_timeout_secs: u64,
    pub pdfium_library_path: Option<String>,
    pub max_upload_bytes: usize,
    pub server_host: String,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ocr_language: DEFAULT_OCR_LANGUAGE.into(),
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            raster_scale: DEFAULT_RASTER_SCALE,
            ocr_concurrency: 1,
            tesseract_path: "tesseract".into(),
            ocr_timeout_secs: 120,
            pdfium_library_path: None,
            max_upload_bytes: 25 * 1024 * 1024,
            server_host: "0.0.0.0".into(),
            server_port: 8080,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ocr_language: std::env::var("SCRIBE_OCR_LANGUAGE")
                .unwrap_or(defaults.ocr_language),
            min_text_chars: env_parse("SCRIBE_MIN_TEXT_CHARS").unwrap_or(defaults.min_text_chars),
            raster_scale: env_parse("SCRIBE_RASTER_SCALE").unwrap_or(defaults.raster_scale),
            ocr_concurrency: env_parse("SCRIBE_OCR_CONCURRENCY")
                .unwrap_or(defaults.ocr_concurrency),
            tesseract_path: std::env::var("SCRIBE_TESSERACT_PATH")
                .unwrap_or(defaults.tesseract_path),
            ocr_timeout_secs: env_parse("SCRIBE_OCR_TIMEOUT_SECS")
                .unwrap_or(defaults.ocr_timeout_secs),
            pdfium_library_path: std::env::var("SCRIBE_PDFIUM_PATH").ok(),
            max_upload_bytes: env_parse("SCRIBE_MAX_UPLOAD_BYTES")
                .unwrap_or(defaults.max_upload_bytes),
            server_host: std::env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env_parse("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Pipeline tunables, validated. Also rejects a zero OCR timeout, which
    /// would fail every recognition call.
    pub fn pipeline_settings(&self) -> Result<PipelineSettings> {
        if self.ocr_timeout_secs == 0 {
            return Err(ScribeError::Config(
                "ocr_timeout_secs must be at least 1".into(),
            ));
        }
        PipelineSettings {
            min_text_chars: self.min_text_chars,
            raster_scale: self.raster_scale,
            ocr_language: self.ocr_language.clone(),
            ocr_concurrency: self.ocr_concurrency,
        }
        .validated()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// The tunables the extraction pipeline reads on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub min_text_chars: usize,
    pub raster_scale: f32,
    pub ocr_language: String,
    /// Upper bound on concurrent OCR calls within one image batch.
    pub ocr_concurrency: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            raster_scale: DEFAULT_RASTER_SCALE,
            ocr_language: DEFAULT_OCR_LANGUAGE.into(),
            ocr_concurrency: 1,
        }
    }
}

impl PipelineSettings {
    pub fn validated(self) -> Result<Self> {
        if self.ocr_concurrency == 0 {
            return Err(ScribeError::Config(
                "ocr_concurrency must be at least 1".into(),
            ));
        }
        if !(self.raster_scale.is_finite() && self.raster_scale > 0.0) {
            return Err(ScribeError::Config(format!(
                "raster_scale must be positive, got {}",
                self.raster_scale
            )));
        }
        if self.ocr_language.trim().is_empty() {
            return Err(ScribeError::Config("ocr_language must not be empty".into()));
        }
        Ok(self)
    }
}
