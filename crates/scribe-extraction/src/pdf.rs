//! PDF text layer via lopdf.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use scribe_core::{PageText, PdfTextLayer, Result, ScribeError};

/// Pure-Rust text-layer reader. Parsing happens on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfTextLayer;

#[async_trait]
impl PdfTextLayer for LopdfTextLayer {
    async fn read_pages(&self, pdf: Arc<[u8]>) -> Result<Vec<PageText>> {
        tokio::task::spawn_blocking(move || read_pages(&pdf))
            .await
            .map_err(|e| ScribeError::Internal(format!("Task join error: {e}")))?
    }
}

/// Parses `pdf` and returns each page's text runs, joined by single spaces,
/// in increasing page order.
pub fn read_pages(pdf: &[u8]) -> Result<Vec<PageText>> {
    let document = Document::load_mem(pdf).map_err(|e| ScribeError::read_failed("PDF", e))?;

    // BTreeMap keyed by 1-based page number, so iteration is in page order
    let pages = document.get_pages();
    tracing::debug!(pages = pages.len(), "Parsed PDF page tree");

    let pages = pages
        .into_iter()
        .map(|(number, page_id)| match page_runs(&document, page_id) {
            Ok(runs) => PageText::Text(runs.join(" ")),
            Err(e) => {
                tracing::warn!(page = number, error = %e, "Could not decode page text layer");
                PageText::Unreadable(e.to_string())
            }
        })
        .collect();

    Ok(pages)
}

/// One decoded string per text-showing operation, in content-stream order.
///
/// `Document::extract_text` concatenates every string inside a `BT`/`ET`
/// block, so runs are collected here instead, using the same per-font
/// encoding lookup.
fn page_runs(document: &Document, page_id: ObjectId) -> lopdf::Result<Vec<String>> {
    let encodings: BTreeMap<Vec<u8>, &str> = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect();
    let content = Content::decode(&document.get_page_content(page_id)?)?;

    let mut encoding = None;
    let mut runs = Vec::new();
    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                encoding = operation
                    .operands
                    .first()
                    .and_then(|font| font.as_name().ok())
                    .and_then(|font| encodings.get(font).copied());
            }
            "Tj" | "TJ" | "'" | "\"" => {
                let mut run = String::new();
                for operand in &operation.operands {
                    push_operand(&mut run, encoding, operand);
                }
                runs.push(run);
            }
            _ => {}
        }
    }
    Ok(runs)
}

/// Strings are decoded; inside a `TJ` array a large negative kerning offset
/// stands for a word gap.
fn push_operand(run: &mut String, encoding: Option<&str>, operand: &Object) {
    match operand {
        Object::String(bytes, _) => run.push_str(&Document::decode_text(encoding, bytes)),
        Object::Array(items) => {
            for item in items {
                match item {
                    Object::Integer(offset) if *offset < -100 => run.push(' '),
                    Object::Real(offset) if *offset < -100.0 => run.push(' '),
                    Object::String(..) => push_operand(run, encoding, item),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}
