//! Raw text from a wordprocessingml package.
//!
//! Paragraph text is emitted in document order, each paragraph followed by a
//! blank line. Tabs and breaks inside runs are kept; formatting is dropped.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use scribe_core::{Result, ScribeError};

const DOCUMENT_PART: &str = "word/document.xml";

pub fn read_docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ScribeError::read_failed("DOCX", e))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ScribeError::read_failed("DOCX", format!("{DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ScribeError::read_failed("DOCX", format!("{DOCUMENT_PART}: {e}")))?;

    document_text(&xml)
}

/// Paragraph under construction. Text boxes nest whole paragraphs inside a
/// run, so paragraphs form a stack and each tracks its own run state.
#[derive(Default)]
struct OpenParagraph {
    text: String,
    in_run: bool,
}

fn document_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut open: Vec<OpenParagraph> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => open.push(OpenParagraph::default()),
                b"r" => {
                    if let Some(paragraph) = open.last_mut() {
                        paragraph.in_run = true;
                    }
                }
                b"t" => in_text = open.last().is_some_and(|p| p.in_run),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"p" => out.push_str("\n\n"),
                b"tab" => push_in_run(&mut open, '\t'),
                b"br" | b"cr" => push_in_run(&mut open, '\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| ScribeError::read_failed("DOCX", e))?;
                if let Some(paragraph) = open.last_mut() {
                    paragraph.text.push_str(&text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(paragraph) = open.pop() {
                        out.push_str(&paragraph.text);
                        out.push_str("\n\n");
                    }
                }
                b"r" => {
                    if let Some(paragraph) = open.last_mut() {
                        paragraph.in_run = false;
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ScribeError::read_failed(
                    "DOCX",
                    format!(
                        "malformed {DOCUMENT_PART} at byte {}: {e}",
                        reader.buffer_position()
                    ),
                ))
            }
            _ => {}
        }
    }

    Ok(out)
}

fn push_in_run(open: &mut [OpenParagraph], c: char) {
    if let Some(paragraph) = open.last_mut().filter(|p| p.in_run) {
        paragraph.text.push(c);
    }
}
