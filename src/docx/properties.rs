//! Core document properties (`docProps/core.xml`).

use super::{escape_xml, splice};
use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Set the `dc:title` of the core-properties part.
///
/// Replaces the text of an existing `dc:title`, or inserts the element
/// before the root close when the document has none. The `dc` prefix is
/// declared on `cp:coreProperties` in every OOXML core part.
pub fn set_core_title(core_xml: &str, title: &str) -> Result<String> {
    let escaped = escape_xml(title);

    let mut reader = Reader::from_str(core_xml);
    let mut buf = Vec::new();

    let mut depth = 0u32;
    let mut title_text_start: Option<usize> = None;

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                if e.name().as_ref() == b"dc:title" {
                    title_text_start = Some(reader.buffer_position() as usize);
                }
            }
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == b"dc:title" {
                    let end = reader.buffer_position() as usize;
                    return Ok(splice(
                        core_xml,
                        offset,
                        end,
                        &format!("<dc:title>{escaped}</dc:title>"),
                    ));
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"dc:title" {
                    if let Some(start) = title_text_start {
                        return Ok(splice(core_xml, start, offset, &escaped));
                    }
                }
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    // Root close with no dc:title seen: insert one here.
                    return Ok(splice(
                        core_xml,
                        offset,
                        offset,
                        &format!("<dc:title>{escaped}</dc:title>"),
                    ));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Err(Error::InvalidData(
        "docProps/core.xml has no root element".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
        <cp:coreProperties \
        xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
        xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\
        <dc:title>Antiguo</dc:title><dc:creator>Pedro</dc:creator></cp:coreProperties>";

    #[test]
    fn test_replace_existing_title() {
        let out = set_core_title(CORE, "Nuevo titulo").unwrap();
        assert!(out.contains("<dc:title>Nuevo titulo</dc:title>"));
        assert!(!out.contains("Antiguo"));
        assert!(out.contains("<dc:creator>Pedro</dc:creator>"));
    }

    #[test]
    fn test_insert_missing_title() {
        let xml = "<cp:coreProperties xmlns:cp=\"c\" xmlns:dc=\"d\">\
                   <dc:creator>Ana</dc:creator></cp:coreProperties>";
        let out = set_core_title(xml, "Nuevo").unwrap();
        assert!(out.contains("<dc:title>Nuevo</dc:title></cp:coreProperties>"));
    }

    #[test]
    fn test_empty_title_element() {
        let xml = "<cp:coreProperties xmlns:cp=\"c\" xmlns:dc=\"d\">\
                   <dc:title/></cp:coreProperties>";
        let out = set_core_title(xml, "Puesto").unwrap();
        assert!(out.contains("<dc:title>Puesto</dc:title>"));
        assert!(!out.contains("<dc:title/>"));
    }

    #[test]
    fn test_title_is_escaped() {
        let out = set_core_title(CORE, "Q1 & Q2 <resumen>").unwrap();
        assert!(out.contains("Q1 &amp; Q2 &lt;resumen&gt;"));
    }
}
