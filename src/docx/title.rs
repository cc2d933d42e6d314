//! Title placeholder rewriting.
//!
//! The title usually lives in a structured content control (`w:sdt`) whose
//! `w:sdtPr` carries a `w:tag` or `w:alias` naming it. Documents without a
//! control are handled by a paragraph-style fallback. SDT first, style
//! second, first match wins.

use super::{escape_xml, splice, w_val};
use crate::error::Result;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Default tag/alias of the title content control.
pub const DEFAULT_TITLE_TAG: &str = "TituloDocumento";

/// Default paragraph style identifiers tried by the fallback.
pub const DEFAULT_TITLE_STYLES: [&str; 2] = ["TituloDocumento", "Title"];

/// Rewrite the text of the first content control tagged `tag_or_alias`.
///
/// The first `w:t` inside the control's `w:sdtContent` is replaced with the
/// new text (`xml:space="preserve"` so surrounding spaces survive). A
/// matching control with no text node gets a fresh `w:p/w:r/w:t`. Returns
/// `None` when no control matches, leaving the input untouched.
pub fn set_sdt_text(xml: &str, tag_or_alias: &str, new_text: &str) -> Result<Option<String>> {
    let replacement = format!(
        "<w:t xml:space=\"preserve\">{}</w:t>",
        escape_xml(new_text)
    );

    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut sdt_depth = 0u32;
    // Depth of the sdt whose sdtPr we are currently inside.
    let mut pr_of: Option<u32> = None;
    // Depth of the first matched sdt.
    let mut matched: Option<u32> = None;
    let mut in_content = false;
    let mut pending_t: Option<usize> = None;
    let mut content_close: Option<usize> = None;

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:sdt" => sdt_depth += 1,
                b"w:sdtPr" => pr_of = Some(sdt_depth),
                b"w:sdtContent" if matched == Some(sdt_depth) && !in_content => in_content = true,
                b"w:t" if in_content => pending_t = Some(offset),
                b"w:tag" | b"w:alias"
                    if matched.is_none()
                        && pr_of == Some(sdt_depth)
                        && w_val(e).as_deref() == Some(tag_or_alias) =>
                {
                    matched = Some(sdt_depth);
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tag" | b"w:alias"
                    if matched.is_none()
                        && pr_of == Some(sdt_depth)
                        && w_val(e).as_deref() == Some(tag_or_alias) =>
                {
                    matched = Some(sdt_depth);
                }
                b"w:t" if in_content => {
                    let end = reader.buffer_position() as usize;
                    return Ok(Some(splice(xml, offset, end, &replacement)));
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:sdtPr" => pr_of = None,
                b"w:t" => {
                    if let Some(start) = pending_t.take() {
                        let end = reader.buffer_position() as usize;
                        return Ok(Some(splice(xml, start, end, &replacement)));
                    }
                }
                // Only the matched control's own content end counts; nested
                // controls inside it close their content at a deeper depth.
                b"w:sdtContent" if in_content && matched == Some(sdt_depth) => {
                    in_content = false;
                    content_close = Some(offset);
                }
                b"w:sdt" => {
                    if matched == Some(sdt_depth) {
                        // Matched control closed without a text node.
                        let para = format!("<w:p><w:r>{replacement}</w:r></w:p>");
                        let out = match content_close {
                            Some(at) => splice(xml, at, at, &para),
                            None => splice(
                                xml,
                                offset,
                                offset,
                                &format!("<w:sdtContent>{para}</w:sdtContent>"),
                            ),
                        };
                        return Ok(Some(out));
                    }
                    sdt_depth = sdt_depth.saturating_sub(1);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(None)
}

/// Fallback: rewrite the first paragraph whose `w:pPr/w:pStyle` is one of
/// `styles`.
///
/// Direct `w:r` children of the paragraph are removed and a single new run
/// appended, keeping paragraph properties and any non-run content in place.
/// Returns `None` when no paragraph matches.
pub fn set_paragraph_text_by_style(
    xml: &str,
    styles: &[String],
    new_text: &str,
) -> Result<Option<String>> {
    if styles.is_empty() {
        return Ok(None);
    }
    let new_run = format!(
        "<w:r><w:t xml:space=\"preserve\">{}</w:t></w:r>",
        escape_xml(new_text)
    );

    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut in_p = false;
    // Element depth below the open paragraph; 0 means direct children.
    let mut depth_in_p = 0u32;
    let mut matched = false;
    let mut run_spans: Vec<(usize, usize)> = Vec::new();
    let mut run_start: Option<usize> = None;

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if !in_p {
                    if e.name().as_ref() == b"w:p" {
                        in_p = true;
                        depth_in_p = 0;
                        matched = false;
                        run_spans.clear();
                        run_start = None;
                    }
                } else {
                    match e.name().as_ref() {
                        b"w:pStyle" if !matched && style_matches(e, styles) => matched = true,
                        b"w:r" if matched && depth_in_p == 0 => run_start = Some(offset),
                        _ => {}
                    }
                    depth_in_p += 1;
                }
            }
            Ok(Event::Empty(ref e)) if in_p => match e.name().as_ref() {
                b"w:pStyle" if !matched && style_matches(e, styles) => matched = true,
                b"w:r" if matched && depth_in_p == 0 => {
                    run_spans.push((offset, reader.buffer_position() as usize));
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if in_p => {
                if depth_in_p == 0 {
                    // Closing the paragraph itself.
                    if matched {
                        return Ok(Some(rebuild_paragraph(xml, &run_spans, offset, &new_run)));
                    }
                    in_p = false;
                } else {
                    depth_in_p -= 1;
                    if depth_in_p == 0 && e.name().as_ref() == b"w:r" {
                        if let Some(start) = run_start.take() {
                            run_spans.push((start, reader.buffer_position() as usize));
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(None)
}

fn style_matches(e: &quick_xml::events::BytesStart<'_>, styles: &[String]) -> bool {
    w_val(e).is_some_and(|v| styles.iter().any(|s| s == &v))
}

/// Copy the paragraph dropping the removed run spans, then append the new
/// run just before `</w:p>`.
fn rebuild_paragraph(
    xml: &str,
    run_spans: &[(usize, usize)],
    p_close: usize,
    new_run: &str,
) -> String {
    let mut out = String::with_capacity(xml.len() + new_run.len());
    let mut cursor = 0usize;
    for &(start, end) in run_spans {
        out.push_str(&xml[cursor..start]);
        cursor = end;
    }
    out.push_str(&xml[cursor..p_close]);
    out.push_str(new_run);
    out.push_str(&xml[p_close..]);
    out
}
