//! WordprocessingML editing operations.
//!
//! All edits are performed by scanning the part with a quick-xml event
//! reader and splicing replacement markup at byte offsets, so everything
//! outside the edited span round-trips verbatim. No schema validation is
//! attempted.

pub mod inspect;
pub mod properties;
pub mod split;
pub mod table;
pub mod title;

use quick_xml::events::BytesStart;

/// Escape text for insertion into XML content or attribute values.
pub(crate) fn escape_xml(s: &str) -> String {
    quick_xml::escape::escape(s).into_owned()
}

/// Replace `xml[start..end]` with `replacement`.
pub(crate) fn splice(xml: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(xml.len() - (end - start) + replacement.len());
    out.push_str(&xml[..start]);
    out.push_str(replacement);
    out.push_str(&xml[end..]);
    out
}

/// Read the `w:val` attribute of an element, tolerating a missing prefix.
pub(crate) fn w_val(e: &BytesStart<'_>) -> Option<String> {
    for attr in e.attributes().flatten() {
        if matches!(attr.key.as_ref(), b"w:val" | b"val") {
            return attr.unescape_value().ok().map(|v| v.into_owned());
        }
    }
    None
}
