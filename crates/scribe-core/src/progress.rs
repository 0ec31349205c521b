//! Advisory progress notifications.
//!
//! Observers receive human-readable events while a request runs. They never
//! influence the extracted text or its ordering.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started { file_count: usize },
    MinimalText { chars: usize, threshold: usize },
    OcrPage { page: usize, total: usize },
    OcrComplete { pages: usize },
    OcrImage { file: usize, total: usize },
    Finished { chars: usize },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { file_count: 1 } => write!(f, "Processing File..."),
            Self::Started { file_count } => write!(f, "Processing {file_count} Files..."),
            Self::MinimalText { .. } => write!(
                f,
                "Minimal Text Extracted. Attempting OCR on PDF pages. This might take longer."
            ),
            Self::OcrPage { page, total } => {
                write!(f, "Processing PDF Page {page}/{total} with OCR...")
            }
            Self::OcrComplete { .. } => write!(f, "PDF OCR Complete"),
            Self::OcrImage { total: 1, .. } => write!(f, "Processing Image with OCR..."),
            Self::OcrImage { file, total } => {
                write!(f, "Processing Image {file}/{total} with OCR...")
            }
            Self::Finished { .. } => write!(f, "File Processed"),
        }
    }
}

pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

/// Forwards events to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        tracing::info!(progress = ?event, "{event}");
    }
}

/// Pushes events into an unbounded channel so a consumer can stream them.
/// A dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressObserver for ChannelProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        let _ = self.tx.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_user_messages() {
        assert_eq!(
            ProgressEvent::OcrPage { page: 2, total: 5 }.to_string(),
            "Processing PDF Page 2/5 with OCR..."
        );
        assert_eq!(
            ProgressEvent::OcrImage { file: 1, total: 1 }.to_string(),
            "Processing Image with OCR..."
        );
        assert_eq!(
            ProgressEvent::OcrImage { file: 2, total: 3 }.to_string(),
            "Processing Image 2/3 with OCR..."
        );
        assert_eq!(
            ProgressEvent::Started { file_count: 1 }.to_string(),
            "Processing File..."
        );
    }

    #[test]
    fn test_channel_progress_delivers_in_order() {
        let (observer, mut rx) = ChannelProgress::new();
        observer.on_progress(&ProgressEvent::Started { file_count: 1 });
        observer.on_progress(&ProgressEvent::Finished { chars: 10 });

        assert_eq!(rx.try_recv().unwrap(), ProgressEvent::Started { file_count: 1 });
        assert_eq!(rx.try_recv().unwrap(), ProgressEvent::Finished { chars: 10 });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_progress_tolerates_closed_receiver() {
        let (observer, rx) = ChannelProgress::new();
        drop(rx);
        observer.on_progress(&ProgressEvent::OcrComplete { pages: 1 });
    }
}
