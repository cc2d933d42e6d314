//! Audit-row injection into the document's marker table.

use super::escape_xml;
use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

/// Header texts identifying the audit table in the default configuration.
pub const DEFAULT_HEADERS: [&str; 3] = ["ID", "Autor", "Fecha"];

/// A flat audit record appended to the marker table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRow {
    pub id: String,
    pub author: String,
    pub date: String,
}

impl AuditRow {
    pub fn new(
        id: impl Into<String>,
        author: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            date: date.into(),
        }
    }

    /// Render the row as a `w:tr` fragment, one cell per field.
    ///
    /// The `w` prefix is already bound on the document root, so the fragment
    /// carries no namespace declaration of its own.
    fn to_tr_xml(&self) -> String {
        let mut tr = String::from("<w:tr>");
        for value in [&self.id, &self.author, &self.date] {
            tr.push_str("<w:tc><w:p><w:r><w:t xml:space=\"preserve\">");
            tr.push_str(&escape_xml(value));
            tr.push_str("</w:t></w:r></w:p></w:tc>");
        }
        tr.push_str("</w:tr>");
        tr
    }
}

/// Append an audit row to the first table whose header row contains every
/// header literal.
///
/// Header matching compares the trimmed text of each `w:t` in the table's
/// first row against the wanted literals; the row is spliced in immediately
/// before that table's `</w:tbl>`. Tables nested inside cells are never
/// candidates themselves. The first matching table wins.
pub fn append_audit_row(xml: &str, row: &AuditRow, headers: &[String]) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut tbl_depth = 0u32;
    let mut header_texts: Vec<String> = Vec::new();
    let mut header_row_done = false;
    let mut in_header_row = false;
    let mut in_text = false;

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:tbl" => {
                    if tbl_depth == 0 {
                        header_texts.clear();
                        header_row_done = false;
                    }
                    tbl_depth += 1;
                }
                b"w:tr" if tbl_depth == 1 && !header_row_done => in_header_row = true,
                b"w:t" if in_header_row && tbl_depth == 1 => in_text = true,
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                header_texts.push(e.unescape().unwrap_or_default().into_owned());
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:tbl" if tbl_depth > 0 => {
                    tbl_depth -= 1;
                    if tbl_depth == 0 && headers_match(&header_texts, headers) {
                        let mut out = String::with_capacity(xml.len() + 256);
                        out.push_str(&xml[..offset]);
                        out.push_str(&row.to_tr_xml());
                        out.push_str(&xml[offset..]);
                        return Ok(out);
                    }
                }
                b"w:tr" if in_header_row && tbl_depth == 1 => {
                    in_header_row = false;
                    header_row_done = true;
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Err(Error::TableNotFound(headers.join("/")))
}

fn headers_match(found: &[String], wanted: &[String]) -> bool {
    !wanted.is_empty()
        && wanted
            .iter()
            .all(|h| found.iter().any(|t| t.trim() == h.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        DEFAULT_HEADERS.iter().map(|s| s.to_string()).collect()
    }

    fn table(cells: &[&str]) -> String {
        let tcs: String = cells
            .iter()
            .map(|c| format!("<w:tc><w:p><w:r><w:t>{c}</w:t></w:r></w:p></w:tc>"))
            .collect();
        format!("<w:tbl><w:tr>{tcs}</w:tr></w:tbl>")
    }

    fn doc(body: &str) -> String {
        format!(
            "<w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        )
    }

    #[test]
    fn test_append_increases_row_count() {
        let xml = doc(&table(&["ID", "Autor", "Fecha"]));
        let row = AuditRow::new("1233", "Pedro", "12/08/2025");
        let out = append_audit_row(&xml, &row, &headers()).unwrap();

        assert_eq!(out.matches("<w:tr>").count(), 2);
        assert!(out.contains("<w:t xml:space=\"preserve\">Pedro</w:t>"));
        // New row lands inside the table.
        let tbl_end = out.find("</w:tbl>").unwrap();
        assert!(out.find("Pedro").unwrap() < tbl_end);
    }

    #[test]
    fn test_skips_non_matching_tables() {
        let other = table(&["Nombre", "Valor"]);
        let target = table(&["ID", "Autor", "Fecha"]);
        let xml = doc(&format!("{other}{target}"));
        let row = AuditRow::new("1", "Ana", "01/01/2026");
        let out = append_audit_row(&xml, &row, &headers()).unwrap();

        // The first (non-matching) table is untouched.
        let first_end = out.find("</w:tbl>").unwrap();
        assert!(out.find("Ana").unwrap() > first_end);
    }

    #[test]
    fn test_nested_table_is_not_a_candidate() {
        // Outer table has the wrong headers; a nested table inside a cell
        // has matching ones but must be skipped.
        let nested = table(&["ID", "Autor", "Fecha"]);
        let xml = doc(&format!(
            "<w:tbl><w:tr><w:tc>{nested}</w:tc></w:tr></w:tbl>"
        ));
        let row = AuditRow::new("1", "Ana", "01/01/2026");
        let err = append_audit_row(&xml, &row, &headers()).unwrap_err();
        assert!(matches!(err, Error::TableNotFound(_)));
    }

    #[test]
    fn test_nested_header_text_does_not_complete_outer_row() {
        // The outer first row holds only "ID"; the rest of the literals come
        // from a table nested in one of its cells and must not count toward
        // the outer table's header match.
        let nested = table(&["Autor", "Fecha"]);
        let outer = format!(
            "<w:tbl><w:tr>\
             <w:tc><w:p><w:r><w:t>ID</w:t></w:r></w:p></w:tc>\
             <w:tc>{nested}</w:tc>\
             </w:tr></w:tbl>"
        );
        let target = table(&["ID", "Autor", "Fecha"]);
        let xml = doc(&format!("{outer}{target}"));
        let row = AuditRow::new("5", "Mar", "03/03/2026");
        let out = append_audit_row(&xml, &row, &headers()).unwrap();

        // The row lands in the second, genuinely matching table.
        let outer_end = out.rfind("</w:tbl>").unwrap();
        assert!(out.find("Mar").unwrap() > out.find("</w:tbl>").unwrap());
        assert!(out.find("Mar").unwrap() < outer_end);
    }

    #[test]
    fn test_row_values_are_escaped() {
        let xml = doc(&table(&["ID", "Autor", "Fecha"]));
        let row = AuditRow::new("1", "A & B <Co>", "01/01/2026");
        let out = append_audit_row(&xml, &row, &headers()).unwrap();
        assert!(out.contains("A &amp; B &lt;Co&gt;"));
        assert!(!out.contains("A & B <Co>"));
    }

    #[test]
    fn test_no_table_is_an_error() {
        let xml = doc("<w:p><w:r><w:t>no tables here</w:t></w:r></w:p>");
        let row = AuditRow::new("1", "Ana", "01/01/2026");
        let err = append_audit_row(&xml, &row, &headers()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No table with header row [ID/Autor/Fecha] found in word/document.xml"
        );
    }

    #[test]
    fn test_header_match_ignores_surrounding_whitespace() {
        let xml = doc(&table(&[" ID ", "Autor", " Fecha"]));
        let row = AuditRow::new("9", "Luz", "02/02/2026");
        assert!(append_audit_row(&xml, &row, &headers()).is_ok());
    }
}
