//! Diagnostics for structured content controls.
//!
//! Used by the `inspect` CLI command and by debug logging to show which
//! tags and aliases a document actually carries when a title edit finds
//! nothing to match.

use super::w_val;
use crate::error::Result;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;

const SAMPLE_LEN: usize = 60;

/// One structured content control found in a part.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SdtInfo {
    pub tag: Option<String>,
    pub alias: Option<String>,
    /// First text fragment inside the control, truncated.
    pub sample_text: String,
}

/// Enumerate the content controls of a WordprocessingML part, in document
/// order.
pub fn list_sdt_controls(xml: &str) -> Result<Vec<SdtInfo>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut controls: Vec<SdtInfo> = Vec::new();
    // Indices of currently open controls, outermost first.
    let mut open: Vec<usize> = Vec::new();
    // Control owning the sdtPr we are inside, if any.
    let mut pr_of: Option<usize> = None;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:sdt" => {
                    controls.push(SdtInfo::default());
                    open.push(controls.len() - 1);
                }
                b"w:sdtPr" => pr_of = open.last().copied(),
                b"w:t" => in_text = true,
                b"w:tag" | b"w:alias" => record_name(&mut controls, pr_of, e),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if matches!(e.name().as_ref(), b"w:tag" | b"w:alias") {
                    record_name(&mut controls, pr_of, e);
                }
            }
            Ok(Event::Text(ref e)) if in_text && !open.is_empty() => {
                let text = e.unescape().unwrap_or_default();
                for &i in &open {
                    if controls[i].sample_text.is_empty() {
                        controls[i].sample_text = text.chars().take(SAMPLE_LEN).collect();
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:sdt" => {
                    open.pop();
                }
                b"w:sdtPr" => pr_of = None,
                b"w:t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(controls)
}

fn record_name(
    controls: &mut [SdtInfo],
    pr_of: Option<usize>,
    e: &quick_xml::events::BytesStart<'_>,
) {
    let Some(i) = pr_of else { return };
    let slot = if e.name().as_ref() == b"w:tag" {
        &mut controls[i].tag
    } else {
        &mut controls[i].alias
    };
    if slot.is_none() {
        *slot = w_val(e);
    }
}
