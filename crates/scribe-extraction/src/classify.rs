use scribe_core::document::{normalize_media_type, MEDIA_TYPE_DOCX, MEDIA_TYPE_PDF};
use scribe_core::{Result, ScribeError, SourceDocument, Strategy};

/// Maps a declared media type to the extraction path it takes.
pub fn classify(media_type: &str) -> Strategy {
    let essence = normalize_media_type(media_type);
    match essence.as_str() {
        MEDIA_TYPE_PDF => Strategy::Pdf,
        MEDIA_TYPE_DOCX => Strategy::Docx,
        t if t.len() > "image/".len() && t.starts_with("image/") => Strategy::Image,
        _ => Strategy::Unsupported {
            media_type: media_type.to_string(),
        },
    }
}

pub struct FormatClassifier;

impl FormatClassifier {
    /// Like [`classify`], but an unsupported type is an error carrying the
    /// media type as the uploader declared it.
    pub fn route(document: &SourceDocument) -> Result<Strategy> {
        match classify(&document.media_type) {
            Strategy::Unsupported { media_type } => {
                tracing::warn!(
                    media_type = %media_type,
                    file = document.label(),
                    "Unsupported media type"
                );
                Err(ScribeError::UnsupportedFormat { media_type })
            }
            strategy => Ok(strategy),
        }
    }
}

/// Media type implied by a file name's extension, for uploads that arrive
/// without a declared type.
pub fn guess_media_type(file_name: &str) -> Option<String> {
    mime_guess::from_path(file_name)
        .first()
        .map(|mime| mime.essence_str().to_string())
}
