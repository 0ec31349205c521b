use scribe_core::{
    BatchRequest, ChannelProgress, Extraction, ExtractionPipeline, PipelineSettings,
    ProgressEvent, ScribeError, SourceDocument, WarningKind,
};
use scribe_extraction::{DocumentPipeline, LopdfTextLayer};
use scribe_tests::{
    docx_package, labeled_png, text_pdf, text_pdf_runs, Harness, RecordingProgress, ScriptedOcr,
    ScriptedRasterizer, ScriptedTextLayer,
};
use std::sync::Arc;

const PDF: &str = "application/pdf";
const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const PNG: &str = "image/png";

fn pdf_doc() -> SourceDocument {
    SourceDocument::new(PDF, b"%PDF-1.5 scripted".to_vec()).with_name("report.pdf")
}

fn png_doc(label: &str) -> SourceDocument {
    SourceDocument::new(PNG, labeled_png(label)).with_name(format!("{label}.png"))
}

// ---------------------------------------------------------------------------
// PDF: quality gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pdf_with_rich_text_layer_never_runs_ocr() {
    let first = "a".repeat(60);
    let second = "b".repeat(60);
    let h = Harness::pdf(&[&first, &second]);

    let result = h.pipeline.extract(pdf_doc()).await.unwrap();

    assert!(!result.used_ocr);
    assert_eq!(result.page_count, 2);
    assert_eq!(result.text, format!("{first}\n{second}\n"));
    assert!(result.warnings.is_empty());
    assert_eq!(h.text_layer.calls(), 1);
    assert_eq!(h.rasterizer.calls(), 0);
    assert_eq!(h.ocr.calls(), 0);
}

#[tokio::test]
async fn exactly_threshold_chars_is_accepted() {
    let page = format!("  {}  ", "x".repeat(100));
    let h = Harness::pdf(&[&page]);

    let result = h.pipeline.extract(pdf_doc()).await.unwrap();

    assert!(!result.used_ocr);
    assert_eq!(h.ocr.calls(), 0);
}

#[tokio::test]
async fn one_char_below_threshold_ocrs_every_page() {
    let page = "x".repeat(99);
    let h = Harness::pdf(&[&page, "", ""]);

    let result = h.pipeline.extract(pdf_doc()).await.unwrap();

    assert!(result.used_ocr);
    assert_eq!(result.page_count, 3);
    // The page that did have text is rendered and recognised too.
    assert_eq!(h.rasterizer.rendered(), vec![0, 1, 2]);
    assert_eq!(h.ocr.calls(), 3);
    assert_eq!(result.text, "ocr page 1\nocr page 2\nocr page 3\n");
}

#[tokio::test]
async fn threshold_counts_characters_not_bytes() {
    // 60 two-byte characters: 120 bytes, 60 chars.
    let page = "é".repeat(60);
    let h = Harness::pdf(&[&page]);

    let result = h.pipeline.extract(pdf_doc()).await.unwrap();

    assert!(result.used_ocr);
}

#[tokio::test]
async fn scanned_pdf_renders_at_configured_scale_and_language() {
    let settings = PipelineSettings {
        raster_scale: 2.0,
        ocr_language: "deu".into(),
        ..PipelineSettings::default()
    };
    let h = Harness::with_settings(
        ScriptedTextLayer::with_pages(&["", ""]),
        ScriptedRasterizer::new(),
        ScriptedOcr::new(),
        settings,
    );

    let result = h.pipeline.extract(pdf_doc()).await.unwrap();

    assert!(result.used_ocr);
    assert_eq!(h.rasterizer.scales(), vec![2.0, 2.0]);
    assert_eq!(h.ocr.languages(), vec!["deu".to_string(), "deu".to_string()]);
}

#[tokio::test]
async fn default_scale_is_one_and_a_half() {
    let h = Harness::pdf(&[""]);

    h.pipeline.extract(pdf_doc()).await.unwrap();

    assert_eq!(h.rasterizer.scales(), vec![1.5]);
    assert_eq!(h.ocr.languages(), vec!["eng".to_string()]);
}

// ---------------------------------------------------------------------------
// PDF: OCR fallback ordering and partial failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ocr_output_follows_page_order() {
    let h = Harness::pdf(&["", "", "", "", ""]);

    let result = h.pipeline.extract(pdf_doc()).await.unwrap();

    assert_eq!(h.rasterizer.rendered(), vec![0, 1, 2, 3, 4]);
    let lines: Vec<&str> = result.text.lines().collect();
    assert_eq!(
        lines,
        vec!["ocr page 1", "ocr page 2", "ocr page 3", "ocr page 4", "ocr page 5"]
    );
}

#[tokio::test]
async fn scanned_pdf_is_loaded_for_rendering_once() {
    let h = Harness::pdf(&["", "", "", "", ""]);

    h.pipeline.extract(pdf_doc()).await.unwrap();

    assert_eq!(h.rasterizer.opens(), 1);
    assert_eq!(h.rasterizer.calls(), 5);
}

#[tokio::test]
async fn pdf_that_cannot_be_opened_for_rendering_warns_per_page() {
    let h = Harness::new(
        ScriptedTextLayer::with_pages(&["", "", ""]),
        ScriptedRasterizer::unopenable(),
        ScriptedOcr::new(),
    );

    let err = h.pipeline.extract(pdf_doc()).await.unwrap_err();

    match err {
        ScribeError::NoTextFound { warnings } => {
            let units: Vec<&str> = warnings.iter().map(|w| w.unit.as_str()).collect();
            assert_eq!(units, vec!["page 1", "page 2", "page 3"]);
            assert!(warnings
                .iter()
                .all(|w| w.kind == WarningKind::RasterizationFailed));
        }
        other => panic!("expected NoTextFound, got {other:?}"),
    }
    assert_eq!(h.rasterizer.opens(), 1);
    assert_eq!(h.ocr.calls(), 0);
}

#[tokio::test]
async fn page_that_cannot_be_rendered_is_skipped_with_warning() {
    let h = Harness::new(
        ScriptedTextLayer::with_pages(&["", "", "", "", ""]),
        ScriptedRasterizer::failing_pages(&[2]),
        ScriptedOcr::new(),
    );

    let result = h.pipeline.extract(pdf_doc()).await.unwrap();

    assert_eq!(
        result.text,
        "ocr page 1\nocr page 2\nocr page 4\nocr page 5\n"
    );
    assert_eq!(h.rasterizer.rendered(), vec![0, 1, 2, 3, 4]);
    assert_eq!(h.ocr.calls(), 4);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, WarningKind::RasterizationFailed);
    assert_eq!(result.warnings[0].unit, "page 3");
}

#[tokio::test]
async fn page_that_cannot_be_recognised_is_skipped_with_warning() {
    let h = Harness::new(
        ScriptedTextLayer::with_pages(&["", "", ""]),
        ScriptedRasterizer::new(),
        ScriptedOcr::failing_pages(&[0]),
    );

    let result = h.pipeline.extract(pdf_doc()).await.unwrap();

    assert_eq!(result.text, "ocr page 2\nocr page 3\n");
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, WarningKind::RecognitionFailed);
    assert_eq!(result.warnings[0].unit, "page 1");
}

#[tokio::test]
async fn every_page_failing_reports_no_text_with_warnings() {
    let h = Harness::new(
        ScriptedTextLayer::with_pages(&["", ""]),
        ScriptedRasterizer::failing_pages(&[0, 1]),
        ScriptedOcr::new(),
    );

    let err = h.pipeline.extract(pdf_doc()).await.unwrap_err();

    assert!(!err.is_fatal());
    match err {
        ScribeError::NoTextFound { warnings } => {
            assert_eq!(warnings.len(), 2);
            assert!(warnings
                .iter()
                .all(|w| w.kind == WarningKind::RasterizationFailed));
        }
        other => panic!("expected NoTextFound, got {other:?}"),
    }
    assert_eq!(h.ocr.calls(), 0);
}

#[tokio::test]
async fn unparseable_pdf_fails_before_rendering() {
    let h = Harness::new(
        ScriptedTextLayer::corrupt("invalid file header"),
        ScriptedRasterizer::new(),
        ScriptedOcr::new(),
    );

    let err = h.pipeline.extract(pdf_doc()).await.unwrap_err();

    assert!(matches!(err, ScribeError::ReadFailed { .. }));
    assert!(err.is_fatal());
    assert_eq!(h.rasterizer.calls(), 0);
    assert_eq!(h.ocr.calls(), 0);
}

#[tokio::test]
async fn zero_byte_pdf_is_read_failure() {
    let h = Harness::pdf(&["unused"]);

    let err = h
        .pipeline
        .extract(SourceDocument::new(PDF, Vec::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, ScribeError::ReadFailed { .. }));
    assert_eq!(h.text_layer.calls(), 0);
}

#[tokio::test]
async fn real_pdf_text_layer_feeds_the_gate() {
    let sentence = "The quick brown fox jumps over the lazy dog while the cat watches";
    let bytes = text_pdf(&[sentence, sentence]);
    let rasterizer = Arc::new(ScriptedRasterizer::new());
    let ocr = Arc::new(ScriptedOcr::new());
    let pipeline = DocumentPipeline::new(
        Arc::new(LopdfTextLayer),
        rasterizer.clone(),
        ocr.clone(),
        PipelineSettings::default(),
    )
    .unwrap();

    let result = pipeline
        .extract(SourceDocument::new(PDF, bytes))
        .await
        .unwrap();

    assert!(!result.used_ocr);
    assert_eq!(result.page_count, 2);
    assert!(result.text.contains("quick brown fox"));
    assert_eq!(ocr.calls(), 0);
    assert_eq!(rasterizer.calls(), 0);
}

#[tokio::test]
async fn runs_within_one_text_object_are_separated() {
    let letters: Vec<String> = (0..60)
        .map(|i| ((b'a' + (i % 26) as u8) as char).to_string())
        .collect();
    let runs: Vec<&str> = letters.iter().map(String::as_str).collect();
    let bytes = text_pdf_runs(&[runs.as_slice(), &["Jane", "Doe"]]);
    let ocr = Arc::new(ScriptedOcr::new());
    let pipeline = DocumentPipeline::new(
        Arc::new(LopdfTextLayer),
        Arc::new(ScriptedRasterizer::new()),
        ocr.clone(),
        PipelineSettings::default(),
    )
    .unwrap();

    let result = pipeline
        .extract(SourceDocument::new(PDF, bytes))
        .await
        .unwrap();

    // 60 letters and 59 separators on page one clear the threshold alone.
    assert!(!result.used_ocr);
    assert_eq!(ocr.calls(), 0);
    assert!(result.text.ends_with("\nJane Doe\n"));
    assert!(result.text.starts_with("a b c "));
}

// ---------------------------------------------------------------------------
// DOCX and single images
// ---------------------------------------------------------------------------

#[tokio::test]
async fn docx_is_read_without_ocr() {
    let h = Harness::pdf(&[]);
    let doc = SourceDocument::new(DOCX, docx_package(&["First paragraph", "Second paragraph"]));

    let result = h.pipeline.extract(doc).await.unwrap();

    assert!(!result.used_ocr);
    assert_eq!(result.page_count, 0);
    assert_eq!(result.text.trim_end(), "First paragraph\n\nSecond paragraph");
    assert_eq!(h.ocr.calls(), 0);
    assert_eq!(h.text_layer.calls(), 0);
}

#[tokio::test]
async fn docx_without_text_reports_no_text() {
    let h = Harness::pdf(&[]);
    let doc = SourceDocument::new(DOCX, docx_package(&[]));

    let err = h.pipeline.extract(doc).await.unwrap_err();

    assert!(matches!(err, ScribeError::NoTextFound { .. }));
}

#[tokio::test]
async fn damaged_docx_is_read_failure() {
    let h = Harness::pdf(&[]);
    let doc = SourceDocument::new(DOCX, b"PK\x03\x04 truncated".to_vec());

    let err = h.pipeline.extract(doc).await.unwrap_err();

    assert!(matches!(err, ScribeError::ReadFailed { .. }));
}

#[tokio::test]
async fn single_image_is_recognised() {
    let h = Harness::pdf(&[]);

    let result = h.pipeline.extract(png_doc("receipt")).await.unwrap();

    assert!(result.used_ocr);
    assert_eq!(result.page_count, 1);
    assert_eq!(result.text.trim(), "text of receipt");
    assert_eq!(h.ocr.calls(), 1);
}

#[tokio::test]
async fn any_image_subtype_is_routed_to_ocr() {
    let h = Harness::pdf(&[]);
    let doc = SourceDocument::new("image/x-portable-pixmap", labeled_png("scan"));

    let result = h.pipeline.extract(doc).await.unwrap();

    assert!(result.used_ocr);
}

#[tokio::test]
async fn zero_byte_single_image_is_read_failure() {
    let h = Harness::pdf(&[]);

    let err = h
        .pipeline
        .extract(SourceDocument::new(PNG, Vec::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, ScribeError::ReadFailed { .. }));
    assert_eq!(h.ocr.calls(), 0);
}

#[tokio::test]
async fn single_image_recognition_failure_reports_no_text() {
    let h = Harness::pdf(&[]);

    let err = h.pipeline.extract(png_doc("fail-blurry")).await.unwrap_err();

    match err {
        ScribeError::NoTextFound { warnings } => {
            assert_eq!(warnings.len(), 1);
            assert_eq!(warnings[0].kind, WarningKind::RecognitionFailed);
        }
        other => panic!("expected NoTextFound, got {other:?}"),
    }
}

#[tokio::test]
async fn unsupported_type_touches_no_backend() {
    let h = Harness::pdf(&["text"]);

    let err = h
        .pipeline
        .extract(SourceDocument::new("text/plain", b"hello".to_vec()))
        .await
        .unwrap_err();

    match err {
        ScribeError::UnsupportedFormat { media_type } => assert_eq!(media_type, "text/plain"),
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
    assert_eq!(h.text_layer.calls(), 0);
    assert_eq!(h.ocr.calls(), 0);
}

// ---------------------------------------------------------------------------
// Image batches
// ---------------------------------------------------------------------------

#[tokio::test]
async fn batch_joins_segments_in_submission_order() {
    let h = Harness::pdf(&[]);
    let batch = BatchRequest::new(vec![png_doc("one"), png_doc("two"), png_doc("three")]);

    let result = h.pipeline.extract_batch(batch).await.unwrap();

    assert_eq!(result.text, "text of one\n\ntext of two\n\ntext of three");
    assert_eq!(result.file_count, 3);
    assert_eq!(result.segment_count, 3);
    assert!(result.warnings.is_empty());
    assert!(result.used_ocr);
}

#[tokio::test]
async fn batch_with_zero_byte_file_is_partial_success() {
    let h = Harness::pdf(&[]);
    let batch = BatchRequest::new(vec![
        png_doc("one"),
        SourceDocument::new(PNG, Vec::new()),
        png_doc("three"),
    ]);

    let result = h.pipeline.extract_batch(batch).await.unwrap();

    assert_eq!(result.text, "text of one\n\ntext of three");
    assert_eq!(result.segment_count, 2);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, WarningKind::ReadFailed);
    assert_eq!(result.warnings[0].unit, "file 2");
    assert_eq!(h.ocr.calls(), 2);
}

#[tokio::test]
async fn batch_failures_become_one_warning_each() {
    let h = Harness::pdf(&[]);
    let labels = ["a", "fail-b", "c", "fail-d", "e", "fail-f"];
    let batch = BatchRequest::new(labels.iter().map(|l| png_doc(l)).collect());

    let result = h.pipeline.extract_batch(batch).await.unwrap();

    assert_eq!(result.segment_count, 3);
    assert_eq!(result.warnings.len(), 3);
    assert_eq!(result.text, "text of a\n\ntext of c\n\ntext of e");
    let units: Vec<&str> = result.warnings.iter().map(|w| w.unit.as_str()).collect();
    assert_eq!(units, vec!["file 2", "file 4", "file 6"]);
}

#[tokio::test]
async fn batch_with_undecodable_bytes_warns_for_that_file() {
    let h = Harness::pdf(&[]);
    let batch = BatchRequest::new(vec![
        png_doc("one"),
        SourceDocument::new(PNG, b"definitely not an image".to_vec()),
    ]);

    let result = h.pipeline.extract_batch(batch).await.unwrap();

    assert_eq!(result.segment_count, 1);
    assert_eq!(result.warnings[0].kind, WarningKind::ReadFailed);
    assert_eq!(h.ocr.calls(), 1);
}

#[tokio::test]
async fn batch_blank_image_adds_empty_warning() {
    let h = Harness::pdf(&[]);
    let batch = BatchRequest::new(vec![png_doc("blank"), png_doc("two")]);

    let result = h.pipeline.extract_batch(batch).await.unwrap();

    assert_eq!(result.text, "text of two");
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, WarningKind::EmptyUnit);
}

#[tokio::test]
async fn batch_with_nothing_recognised_reports_no_text() {
    let h = Harness::pdf(&[]);
    let batch = BatchRequest::new(vec![png_doc("fail-1"), png_doc("fail-2")]);

    let err = h.pipeline.extract_batch(batch).await.unwrap_err();

    match err {
        ScribeError::NoTextFound { warnings } => assert_eq!(warnings.len(), 2),
        other => panic!("expected NoTextFound, got {other:?}"),
    }
}

#[tokio::test]
async fn mixed_batch_is_rejected_before_any_work() {
    let h = Harness::pdf(&["unused"]);
    let batch = BatchRequest::new(vec![
        png_doc("one"),
        pdf_doc(),
        SourceDocument::new(DOCX, docx_package(&["x"])),
    ]);

    let err = h.pipeline.extract_batch(batch).await.unwrap_err();

    match err {
        ScribeError::MixedBatchRejected {
            file_count,
            offending,
        } => {
            assert_eq!(file_count, 3);
            assert_eq!(offending, vec![PDF.to_string(), DOCX.to_string()]);
        }
        other => panic!("expected MixedBatchRejected, got {other:?}"),
    }
    assert_eq!(h.ocr.calls(), 0);
    assert_eq!(h.text_layer.calls(), 0);
    assert_eq!(h.rasterizer.calls(), 0);
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let h = Harness::pdf(&[]);

    let err = h
        .pipeline
        .extract_batch(BatchRequest::new(Vec::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, ScribeError::EmptyRequest));
}

#[tokio::test]
async fn lone_pdf_in_batch_uses_single_file_path() {
    let text = "y".repeat(150);
    let h = Harness::pdf(&[&text]);

    let result = h
        .pipeline
        .extract_batch(BatchRequest::new(vec![pdf_doc()]))
        .await
        .unwrap();

    assert_eq!(result.file_count, 1);
    assert_eq!(result.segment_count, 1);
    assert_eq!(result.text, format!("{text}\n"));
    assert!(!result.used_ocr);
    assert_eq!(result.page_count, 1);
    assert_eq!(h.ocr.calls(), 0);
}

#[tokio::test]
async fn lone_scanned_pdf_in_batch_reports_ocr() {
    let h = Harness::pdf(&["", ""]);

    let result = h
        .pipeline
        .extract_batch(BatchRequest::new(vec![pdf_doc()]))
        .await
        .unwrap();

    assert!(result.used_ocr);
    assert_eq!(result.page_count, 2);
}

#[tokio::test]
async fn lone_zero_byte_image_in_batch_is_read_failure() {
    let h = Harness::pdf(&[]);

    let via_batch = h
        .pipeline
        .extract_batch(BatchRequest::new(vec![SourceDocument::new(PNG, Vec::new())]))
        .await
        .unwrap_err();
    let via_single = h
        .pipeline
        .extract(SourceDocument::new(PNG, Vec::new()))
        .await
        .unwrap_err();

    assert!(matches!(via_batch, ScribeError::ReadFailed { .. }));
    assert!(via_batch.is_fatal());
    assert_eq!(via_batch.kind(), via_single.kind());
    assert_eq!(h.ocr.calls(), 0);
}

#[tokio::test]
async fn concurrent_batch_keeps_submission_order() {
    let settings = PipelineSettings {
        ocr_concurrency: 4,
        ..PipelineSettings::default()
    };
    let h = Harness::with_settings(
        ScriptedTextLayer::with_pages(&[]),
        ScriptedRasterizer::new(),
        ScriptedOcr::new(),
        settings,
    );
    // The first file finishes last.
    let batch = BatchRequest::new(vec![png_doc("slow-first"), png_doc("second"), png_doc("third")]);

    let result = h.pipeline.extract_batch(batch).await.unwrap();

    assert_eq!(
        result.text,
        "text of slow-first\n\ntext of second\n\ntext of third"
    );
}

// ---------------------------------------------------------------------------
// Upload entry point
// ---------------------------------------------------------------------------

#[tokio::test]
async fn extract_files_shapes_result_by_file_count() {
    let h = Harness::pdf(&[]);
    let progress = RecordingProgress::default();

    let single = h
        .pipeline
        .extract_files(vec![png_doc("solo")], &progress)
        .await
        .unwrap();
    assert!(matches!(single, Extraction::Single(_)));
    assert_eq!(single.unit_count(), 1);

    let batch = h
        .pipeline
        .extract_files(vec![png_doc("a"), png_doc("b")], &progress)
        .await
        .unwrap();
    assert!(matches!(batch, Extraction::Batch(_)));
    assert_eq!(batch.unit_count(), 2);
    assert_eq!(batch.text(), "text of a\n\ntext of b");
}

#[tokio::test]
async fn extract_files_rejects_empty_upload() {
    let h = Harness::pdf(&[]);

    let err = h
        .pipeline
        .extract_files(Vec::new(), &RecordingProgress::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ScribeError::EmptyRequest));
}

#[tokio::test]
async fn repeated_extraction_is_stable() {
    let h = Harness::new(
        ScriptedTextLayer::with_pages(&["short", "", ""]),
        ScriptedRasterizer::failing_pages(&[1]),
        ScriptedOcr::new(),
    );

    let first = h.pipeline.extract(pdf_doc()).await.unwrap();
    let second = h.pipeline.extract(pdf_doc()).await.unwrap();

    assert_eq!(first.text, second.text);
    assert_eq!(first.used_ocr, second.used_ocr);
    assert_eq!(first.page_count, second.page_count);
    assert_eq!(first.warnings, second.warnings);
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scanned_pdf_reports_each_page() {
    let h = Harness::pdf(&["", "", "", "", ""]);
    let (progress, mut rx) = ChannelProgress::new();

    h.pipeline
        .extract_with_progress(pdf_doc(), &progress)
        .await
        .unwrap();
    drop(progress);

    let mut messages = Vec::new();
    while let Some(event) = rx.recv().await {
        messages.push(event.to_string());
    }
    assert!(messages.contains(&"Processing PDF Page 2/5 with OCR...".to_string()));
    assert!(messages.contains(&"PDF OCR Complete".to_string()));
    assert!(messages[1].starts_with("Minimal Text Extracted"));
    assert_eq!(messages.last().map(String::as_str), Some("File Processed"));
}

#[tokio::test]
async fn progress_does_not_change_the_result() {
    let h = Harness::pdf(&["", ""]);
    let recorder = RecordingProgress::default();

    let observed = h
        .pipeline
        .extract_with_progress(pdf_doc(), &recorder)
        .await
        .unwrap();
    let silent = h.pipeline.extract(pdf_doc()).await.unwrap();

    assert_eq!(observed.text, silent.text);
    let pages: Vec<_> = recorder
        .events()
        .into_iter()
        .filter(|e| matches!(e, ProgressEvent::OcrPage { .. }))
        .collect();
    assert_eq!(
        pages,
        vec![
            ProgressEvent::OcrPage { page: 1, total: 2 },
            ProgressEvent::OcrPage { page: 2, total: 2 },
        ]
    );
}

#[tokio::test]
async fn rich_pdf_emits_no_ocr_progress() {
    let text = "z".repeat(200);
    let h = Harness::pdf(&[&text]);
    let recorder = RecordingProgress::default();

    h.pipeline
        .extract_with_progress(pdf_doc(), &recorder)
        .await
        .unwrap();

    assert_eq!(
        recorder.events(),
        vec![
            ProgressEvent::Started { file_count: 1 },
            ProgressEvent::Finished { chars: 201 },
        ]
    );
}
