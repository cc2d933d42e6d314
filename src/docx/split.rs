//! Split a document at its first explicit page break.
//!
//! Produces two stand-alone packages: one with the content before the
//! break, one with the content after it. Both keep every other part of the
//! original package unchanged, so styles, numbering, and media survive.

use crate::error::{Error, Result};
use crate::package::{DocxPackage, DOCUMENT_PART};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Split a `.docx` at the first `<w:br w:type="page"/>`.
///
/// Returns the serialized first-page package and the remainder package.
pub fn split_at_first_page_break(data: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let pkg = DocxPackage::from_bytes(data.to_vec())?;
    let xml = pkg.read_xml(DOCUMENT_PART)?;
    let (first, rest) = split_document_xml(&xml)?;

    let mut first_pkg = DocxPackage::from_bytes(data.to_vec())?;
    first_pkg.replace_xml(DOCUMENT_PART, first);
    let mut rest_pkg = DocxPackage::from_bytes(data.to_vec())?;
    rest_pkg.replace_xml(DOCUMENT_PART, rest);

    Ok((first_pkg.to_bytes()?, rest_pkg.to_bytes()?))
}

/// Split `word/document.xml` markup at the first explicit page break.
///
/// The break usually sits inside `w:r` inside `w:p`, so a raw string split
/// would leave both halves malformed. Instead the open-element stack at the
/// break position is closed off in the first half and re-opened (without
/// attributes) in the second, which keeps the original prologue and the
/// original closing tags.
pub fn split_document_xml(xml: &str) -> Result<(String, String)> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut stack: Vec<String> = Vec::new();
    let mut body_open_end: Option<usize> = None;
    let mut pending_br: Option<usize> = None;

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                stack.push(name);
                if e.name().as_ref() == b"w:body" {
                    body_open_end = Some(reader.buffer_position() as usize);
                }
                if e.name().as_ref() == b"w:br" && is_page_break(e) {
                    // Expanded form: span ends at the matching </w:br>.
                    pending_br = Some(offset);
                }
            }
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == b"w:br" && is_page_break(e) {
                    let end = reader.buffer_position() as usize;
                    return build_halves(xml, &stack, offset, end, body_open_end);
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"w:br" {
                    if let Some(start) = pending_br.take() {
                        stack.pop();
                        let end = reader.buffer_position() as usize;
                        return build_halves(xml, &stack, start, end, body_open_end);
                    }
                }
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Err(Error::PageBreakNotFound)
}

fn is_page_break(e: &BytesStart<'_>) -> bool {
    e.attributes().flatten().any(|attr| {
        matches!(attr.key.as_ref(), b"w:type" | b"type")
            && attr.unescape_value().map(|v| v == "page").unwrap_or(false)
    })
}

fn build_halves(
    xml: &str,
    stack: &[String],
    br_start: usize,
    br_end: usize,
    body_open_end: Option<usize>,
) -> Result<(String, String)> {
    let body_open_end = body_open_end.ok_or_else(|| {
        Error::InvalidData("page break found outside w:body".to_string())
    })?;

    let mut first = String::with_capacity(br_start + 64);
    first.push_str(&xml[..br_start]);
    for name in stack.iter().rev() {
        first.push_str("</");
        first.push_str(name);
        first.push('>');
    }

    // Re-open the elements between w:body and the break, minus attributes.
    let body_idx = stack
        .iter()
        .position(|n| n == "w:body")
        .ok_or_else(|| Error::InvalidData("page break found outside w:body".to_string()))?;
    let mut rest = String::with_capacity(xml.len() - br_end + body_open_end + 64);
    rest.push_str(&xml[..body_open_end]);
    for name in &stack[body_idx + 1..] {
        rest.push('<');
        rest.push_str(name);
        rest.push('>');
    }
    rest.push_str(&xml[br_end..]);

    Ok((first, rest))
}
