//! The stamp operation: audit row plus title rewrite across the package.
//!
//! Mirrors the single user action of the original tool: one pass over the
//! package that appends the audit row, rewrites the title placeholder in
//! the body (and headers, footers, and core properties), and re-serializes.
//! Errors are terminal for the action; the input bytes are never touched.

use crate::docx::table::{self, AuditRow};
use crate::docx::{inspect, properties, title};
use crate::error::Result;
use crate::package::{DocxPackage, CORE_PART, DOCUMENT_PART};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Options for a stamp operation.
#[derive(Debug, Clone)]
pub struct StampOptions {
    /// Row appended to the marker table.
    pub row: AuditRow,
    /// New document title.
    pub title: String,
    /// Header literals identifying the marker table.
    pub table_headers: Vec<String>,
    /// Tag or alias of the title content control.
    pub title_tag: String,
    /// Paragraph styles tried when no content control matches.
    pub title_styles: Vec<String>,
}

impl StampOptions {
    /// Options with the default table headers, title tag, and styles.
    pub fn new(row: AuditRow, title: impl Into<String>) -> Self {
        Self {
            row,
            title: title.into(),
            table_headers: table::DEFAULT_HEADERS.iter().map(|s| s.to_string()).collect(),
            title_tag: title::DEFAULT_TITLE_TAG.to_string(),
            title_styles: title::DEFAULT_TITLE_STYLES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// What a stamp operation actually changed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StampReport {
    pub row_appended: bool,
    /// Title rewritten through a content control in the body.
    pub document_sdt: bool,
    /// Title rewritten through the paragraph-style fallback.
    pub style_fallback: bool,
    pub headers_updated: usize,
    pub footers_updated: usize,
    pub core_updated: bool,
}

/// Apply the stamp transform to a `.docx` held in memory.
pub fn stamp_bytes(data: &[u8], options: &StampOptions) -> Result<(Vec<u8>, StampReport)> {
    let mut pkg = DocxPackage::from_bytes(data.to_vec())?;
    let mut report = StampReport::default();

    let doc_xml = pkg.read_xml(DOCUMENT_PART)?;
    if log::log_enabled!(log::Level::Debug) {
        for info in inspect::list_sdt_controls(&doc_xml)? {
            log::debug!(
                "{DOCUMENT_PART}: sdt tag={:?} alias={:?} text={:?}",
                info.tag,
                info.alias,
                info.sample_text
            );
        }
    }

    let mut updated = table::append_audit_row(&doc_xml, &options.row, &options.table_headers)?;
    report.row_appended = true;

    match title::set_sdt_text(&updated, &options.title_tag, &options.title)? {
        Some(with_title) => {
            updated = with_title;
            report.document_sdt = true;
        }
        None => {
            match title::set_paragraph_text_by_style(
                &updated,
                &options.title_styles,
                &options.title,
            )? {
                Some(with_title) => {
                    updated = with_title;
                    report.style_fallback = true;
                }
                None => log::warn!(
                    "no title placeholder matched tag {:?} or styles {:?}",
                    options.title_tag,
                    options.title_styles
                ),
            }
        }
    }
    pkg.replace_xml(DOCUMENT_PART, updated);

    for part in pkg.header_parts() {
        let xml = pkg.read_xml(&part)?;
        if let Some(updated) = title::set_sdt_text(&xml, &options.title_tag, &options.title)? {
            pkg.replace_xml(&part, updated);
            report.headers_updated += 1;
        }
    }
    for part in pkg.footer_parts() {
        let xml = pkg.read_xml(&part)?;
        if let Some(updated) = title::set_sdt_text(&xml, &options.title_tag, &options.title)? {
            pkg.replace_xml(&part, updated);
            report.footers_updated += 1;
        }
    }

    if pkg.exists(CORE_PART) {
        let core = pkg.read_xml(CORE_PART)?;
        pkg.replace_xml(CORE_PART, properties::set_core_title(&core, &options.title)?);
        report.core_updated = true;
    }

    log::info!(
        "stamped document: sdt={} fallback={} headers={} footers={} core={}",
        report.document_sdt,
        report.style_fallback,
        report.headers_updated,
        report.footers_updated,
        report.core_updated
    );

    Ok((pkg.to_bytes()?, report))
}

/// Apply the stamp transform to a `.docx` file on disk.
pub fn stamp_file(
    path: impl AsRef<Path>,
    options: &StampOptions,
) -> Result<(Vec<u8>, StampReport)> {
    let data = fs::read(path.as_ref())?;
    stamp_bytes(&data, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = StampOptions::new(AuditRow::new("1", "Ana", "01/01/2026"), "Titulo");
        assert_eq!(options.table_headers, vec!["ID", "Autor", "Fecha"]);
        assert_eq!(options.title_tag, "TituloDocumento");
        assert_eq!(options.title_styles, vec!["TituloDocumento", "Title"]);
    }
}
