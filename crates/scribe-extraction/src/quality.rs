use scribe_core::config::DEFAULT_MIN_TEXT_CHARS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// Direct extraction is trusted as-is.
    Accept { chars: usize },
    /// The document reads as image-like; every page goes through OCR.
    OcrFallback { chars: usize },
}

impl GateVerdict {
    pub fn needs_ocr(&self) -> bool {
        matches!(self, Self::OcrFallback { .. })
    }

    pub fn chars(&self) -> usize {
        match self {
            Self::Accept { chars } | Self::OcrFallback { chars } => *chars,
        }
    }
}

/// Document-wide check on the direct-extraction output of a PDF.
///
/// The decision is made once from the whole document's text, never per page,
/// so a document is either entirely direct or entirely OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityGate {
    min_chars: usize,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TEXT_CHARS)
    }
}

impl QualityGate {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    pub fn threshold(&self) -> usize {
        self.min_chars
    }

    /// Character count after trimming leading and trailing whitespace.
    pub fn measured_chars(text: &str) -> usize {
        text.trim().chars().count()
    }

    pub fn assess(&self, text: &str) -> GateVerdict {
        let chars = Self::measured_chars(text);
        if chars < self.min_chars {
            GateVerdict::OcrFallback { chars }
        } else {
            GateVerdict::Accept { chars }
        }
    }
}
