//! Tesseract OCR backend.
//!
//! Runs the `tesseract` binary with the image piped through stdin and the text
//! read back from stdout, so nothing touches the filesystem. The child process
//! is killed if the recognition future is dropped or times out.

use std::io::Cursor;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use image::{ImageFormat, RgbaImage};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use scribe_core::{AppConfig, OcrEngine, OcrInput, PageImage, Result, ScribeError};

pub struct TesseractEngine {
    binary: String,
    timeout: Duration,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.tesseract_path.clone(),
            Duration::from_secs(config.ocr_timeout_secs),
        )
    }

    async fn run(&self, image: &[u8], language: &str) -> Result<String> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", language, "--psm", "3"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ScribeError::Recognition(format!("Failed to run {}: {e}", self.binary))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ScribeError::Recognition("tesseract stdin unavailable".into()))?;

        let feed = async move {
            let written = stdin.write_all(image).await;
            drop(stdin);
            written
        };

        let (written, output) =
            tokio::time::timeout(self.timeout, async { tokio::join!(feed, child.wait_with_output()) })
                .await
                .map_err(|_| {
                    ScribeError::Recognition(format!(
                        "tesseract timed out after {}s",
                        self.timeout.as_secs()
                    ))
                })?;

        let output = output
            .map_err(|e| ScribeError::Recognition(format!("Failed to wait for tesseract: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScribeError::Recognition(format!(
                "Tesseract failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }
        written.map_err(|e| {
            ScribeError::Recognition(format!("Failed to send image to tesseract: {e}"))
        })?;

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn recognize(&self, input: OcrInput, language: &str) -> Result<String> {
        match input {
            OcrInput::Encoded(bytes) => self.run(&bytes, language).await,
            OcrInput::Bitmap(page) => {
                let png = encode_png(page)?;
                self.run(&png, language).await
            }
        }
    }
}

/// Encodes a rendered page as PNG, consuming its pixel buffer.
pub fn encode_png(page: PageImage) -> Result<Vec<u8>> {
    let page_number = page.page_index + 1;
    let (width, height) = (page.width, page.height);
    let buffer = RgbaImage::from_raw(width, height, page.into_pixels()).ok_or_else(|| {
        ScribeError::Recognition(format!("Bitmap for page {page_number} has the wrong size"))
    })?;

    let mut out = Vec::new();
    buffer
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| {
            ScribeError::Recognition(format!("Failed to encode page {page_number}: {e}"))
        })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png_round_trips_dimensions() {
        let page = PageImage::new(0, 3, 2, vec![255; 3 * 2 * 4]).unwrap();
        let png = encode_png(page).unwrap();

        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }

    #[tokio::test]
    async fn test_missing_binary_is_recognition_error() {
        let engine = TesseractEngine::new(
            "/nonexistent/scribe-tesseract",
            Duration::from_secs(5),
        );
        assert!(!engine.is_available().await);

        let err = engine
            .recognize(OcrInput::Encoded(vec![0u8; 8].into()), "eng")
            .await
            .unwrap_err();
        assert!(matches!(err, ScribeError::Recognition(_)));
    }
}
