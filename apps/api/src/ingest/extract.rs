//! Text extraction for uploaded CV files.
//!
//! PDF goes through `pdf-extract`. DOCX is a ZIP archive whose `word/document.xml`
//! is walked with `quick-xml`, keeping only `<w:t>` text and ending a line at each
//! paragraph. Plain text is decoded lossily. All three are then normalised to
//! trimmed, single-spaced lines with at most one blank line in a row.
//!
//! Everything here blocks; callers run it on the blocking pool.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::ingest::{ImportError, SourceFormat};

const DOCUMENT_XML: &str = "word/document.xml";

pub fn extract_text(format: SourceFormat, bytes: &[u8]) -> Result<String, ImportError> {
    let raw = match format {
        SourceFormat::Pdf => pdf_text(bytes)?,
        SourceFormat::Docx => docx_text(bytes)?,
        SourceFormat::Txt => String::from_utf8_lossy(bytes).into_owned(),
    };
    Ok(normalize(&raw))
}

fn pdf_text(bytes: &[u8]) -> Result<String, ImportError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ImportError::Unreadable(format!("invalid PDF: {e}")))
}

fn docx_text(bytes: &[u8]) -> Result<String, ImportError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ImportError::Unreadable(format!("not a DOCX archive: {e}")))?;
    let mut entry = archive
        .by_name(DOCUMENT_XML)
        .map_err(|_| ImportError::Unreadable(format!("{DOCUMENT_XML} is missing")))?;
    let mut xml = Vec::new();
    entry
        .read_to_end(&mut xml)
        .map_err(|e| ImportError::Unreadable(format!("failed to read {DOCUMENT_XML}: {e}")))?;
    paragraph_text(&xml)
}

/// Flattens WordprocessingML to text, one line per paragraph.
fn paragraph_text(xml: &[u8]) -> Result<String, ImportError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut out = String::new();
    // Only <w:t> carries visible text; <w:instrText> holds field codes.
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" => out.push(' '),
                b"br" | b"cr" | b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|e| ImportError::Unreadable(format!("malformed text run: {e}")))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ImportError::Unreadable(format!(
                    "malformed {DOCUMENT_XML}: {e}"
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut after_blank = true;
    for line in raw.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            if !after_blank {
                out.push('\n');
                after_blank = true;
            }
            continue;
        }
        out.push_str(&line);
        out.push('\n');
        after_blank = false;
    }
    out.trim_end().to_string()
}
