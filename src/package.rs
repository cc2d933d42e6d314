//! In-memory ZIP container for Word documents.
//!
//! A [`DocxPackage`] holds the original archive bytes plus a set of staged
//! part replacements. Serialization copies every original entry in order,
//! substituting staged parts, so markup we never touched round-trips
//! byte-for-byte.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Core properties part (title, creator, dates).
pub const CORE_PART: &str = "docProps/core.xml";

/// A Word document opened as a ZIP package with staged edits.
pub struct DocxPackage {
    archive: RefCell<ZipArchive<Cursor<Vec<u8>>>>,
    overrides: HashMap<String, Vec<u8>>,
}

impl DocxPackage {
    /// Open a package from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    /// Open a package from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
            overrides: HashMap::new(),
        })
    }

    /// Read a part as an XML string, honoring staged replacements.
    ///
    /// Handles UTF-8 (with or without BOM) and UTF-16 LE/BE parts; the XML
    /// declaration is rewritten to UTF-8 after transcoding so downstream
    /// parsing sees a consistent encoding.
    pub fn read_xml(&self, part: &str) -> Result<String> {
        if let Some(data) = self.overrides.get(part) {
            return decode_xml_bytes(data);
        }
        let bytes = self.read_original(part)?;
        decode_xml_bytes(&bytes)
    }

    /// Read a part as raw bytes, honoring staged replacements.
    pub fn read_binary(&self, part: &str) -> Result<Vec<u8>> {
        if let Some(data) = self.overrides.get(part) {
            return Ok(data.clone());
        }
        self.read_original(part)
    }

    fn read_original(&self, part: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut entry = archive
            .by_name(part)
            .map_err(|_| Error::MissingPart(part.to_string()))?;
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Check whether a part exists in the package.
    pub fn exists(&self, part: &str) -> bool {
        self.overrides.contains_key(part)
            || self.archive.borrow().file_names().any(|n| n == part)
    }

    /// List all part names in the package.
    pub fn list_parts(&self) -> Vec<String> {
        let archive = self.archive.borrow();
        archive.file_names().map(String::from).collect()
    }

    /// Header parts (`word/header1.xml`, `word/header2.xml`, ...), sorted.
    pub fn header_parts(&self) -> Vec<String> {
        self.numbered_parts("word/header")
    }

    /// Footer parts (`word/footer1.xml`, ...), sorted.
    pub fn footer_parts(&self) -> Vec<String> {
        self.numbered_parts("word/footer")
    }

    fn numbered_parts(&self, prefix: &str) -> Vec<String> {
        let mut parts: Vec<String> = self
            .list_parts()
            .into_iter()
            .filter(|n| {
                n.strip_prefix(prefix)
                    .and_then(|rest| rest.strip_suffix(".xml"))
                    .is_some_and(|num| !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()))
            })
            .collect();
        parts.sort();
        parts
    }

    /// Stage an XML part replacement.
    pub fn replace_xml(&mut self, part: &str, xml: String) {
        self.overrides.insert(part.to_string(), xml.into_bytes());
    }

    /// Stage a binary part replacement.
    pub fn replace_binary(&mut self, part: &str, data: Vec<u8>) {
        self.overrides.insert(part.to_string(), data);
    }

    /// Serialize the package, applying staged replacements.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut archive = self.archive.borrow_mut();
        for i in 0..archive.len() {
            let (name, data) = {
                let mut entry = archive.by_index(i)?;
                let name = entry.name().to_string();
                if name.ends_with('/') {
                    (name, None)
                } else if let Some(staged) = self.overrides.get(&name) {
                    (name, Some(staged.clone()))
                } else {
                    let mut data = Vec::new();
                    entry.read_to_end(&mut data)?;
                    (name, Some(data))
                }
            };

            match data {
                Some(data) => {
                    writer.start_file(name, options)?;
                    writer.write_all(&data)?;
                }
                None => {
                    writer.add_directory(name, options)?;
                }
            }
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }

    /// Serialize the package to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path.as_ref(), self.to_bytes()?)?;
        Ok(())
    }
}

impl std::fmt::Debug for DocxPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocxPackage")
            .field("parts", &self.list_parts().len())
            .field("staged", &self.overrides.len())
            .finish()
    }
}

/// Decode XML bytes handling UTF-8 (with/without BOM) and UTF-16 LE/BE.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(bytes[3..].to_vec())
            .map_err(|e| Error::InvalidData(format!("invalid UTF-8 after BOM: {e}")));
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Ok(fix_encoding_declaration(&decode_utf16(&bytes[2..], false)?));
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Ok(fix_encoding_declaration(&decode_utf16(&bytes[2..], true)?));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        // No BOM and not valid UTF-8: null bytes next to ASCII suggest UTF-16.
        Err(_) if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 => {
            Ok(fix_encoding_declaration(&decode_utf16(bytes, false)?))
        }
        Err(_) if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 => {
            Ok(fix_encoding_declaration(&decode_utf16(bytes, true)?))
        }
        Err(_) => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn decode_utf16(bytes: &[u8], big_endian: bool) -> Result<String> {
    let len = bytes.len() & !1;
    let units = (0..len).step_by(2).map(|i| {
        let pair = [bytes[i], bytes[i + 1]];
        if big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        }
    });
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::InvalidData(format!("invalid UTF-16 in XML part: {e}")))
}

/// Rewrite `encoding="UTF-16"` to UTF-8 in the XML declaration.
///
/// After transcoding to a Rust string the declaration would otherwise lie
/// about the encoding and confuse quick-xml.
fn fix_encoding_declaration(content: &str) -> String {
    if let Some(end) = content.find("?>") {
        if content.starts_with("<?xml") {
            let decl = content[..end + 2]
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");
            return format!("{}{}", decl, &content[end + 2..]);
        }
    }
    content.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in parts {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_read_and_replace_roundtrip() {
        let data = minimal_package(&[
            ("[Content_Types].xml", "<Types/>"),
            (DOCUMENT_PART, "<w:document><w:body/></w:document>"),
            ("word/media/image1.png", "not really a png"),
        ]);

        let mut pkg = DocxPackage::from_bytes(data).unwrap();
        assert!(pkg.exists(DOCUMENT_PART));
        assert!(!pkg.exists(CORE_PART));

        pkg.replace_xml(DOCUMENT_PART, "<w:document><w:body><w:p/></w:body></w:document>".into());
        // Staged content is visible before serialization.
        assert!(pkg.read_xml(DOCUMENT_PART).unwrap().contains("<w:p/>"));

        let out = pkg.to_bytes().unwrap();
        let reopened = DocxPackage::from_bytes(out).unwrap();
        assert!(reopened.read_xml(DOCUMENT_PART).unwrap().contains("<w:p/>"));
        // Untouched parts survive unchanged.
        assert_eq!(
            reopened.read_binary("word/media/image1.png").unwrap(),
            b"not really a png"
        );
        assert_eq!(reopened.list_parts().len(), 3);
    }

    #[test]
    fn test_exists_checks_archive_and_staged_parts() {
        let data = minimal_package(&[(DOCUMENT_PART, "<w:document/>")]);
        let mut pkg = DocxPackage::from_bytes(data).unwrap();

        assert!(pkg.exists(DOCUMENT_PART));
        assert!(!pkg.exists(CORE_PART));

        pkg.replace_xml(CORE_PART, "<cp:coreProperties/>".into());
        assert!(pkg.exists(CORE_PART));
    }

    #[test]
    fn test_missing_part() {
        let data = minimal_package(&[(DOCUMENT_PART, "<w:document/>")]);
        let pkg = DocxPackage::from_bytes(data).unwrap();
        let err = pkg.read_xml("word/styles.xml").unwrap_err();
        assert!(matches!(err, Error::MissingPart(_)));
    }

    #[test]
    fn test_header_and_footer_parts() {
        let data = minimal_package(&[
            (DOCUMENT_PART, "<w:document/>"),
            ("word/header2.xml", "<w:hdr/>"),
            ("word/header1.xml", "<w:hdr/>"),
            ("word/footer1.xml", "<w:ftr/>"),
            ("word/headerX.xml", "<w:hdr/>"),
        ]);
        let pkg = DocxPackage::from_bytes(data).unwrap();
        assert_eq!(
            pkg.header_parts(),
            vec!["word/header1.xml".to_string(), "word/header2.xml".to_string()]
        );
        assert_eq!(pkg.footer_parts(), vec!["word/footer1.xml".to_string()]);
    }

    #[test]
    fn test_decode_xml_bytes_encodings() {
        // UTF-16 LE with BOM
        let utf16_le = b"\xFF\xFE<\0?\0x\0m\0l\0>\0";
        assert_eq!(decode_xml_bytes(utf16_le).unwrap(), "<?xml>");

        // UTF-16 BE with BOM
        let utf16_be = b"\xFE\xFF\0<\0?\0x\0m\0l\0>";
        assert_eq!(decode_xml_bytes(utf16_be).unwrap(), "<?xml>");

        // UTF-8 BOM
        assert_eq!(decode_xml_bytes(b"\xEF\xBB\xBF<?xml>").unwrap(), "<?xml>");

        // Plain UTF-8
        assert_eq!(decode_xml_bytes(b"<?xml>").unwrap(), "<?xml>");
    }

    #[test]
    fn test_fix_encoding_declaration() {
        let fixed =
            fix_encoding_declaration("<?xml version=\"1.0\" encoding=\"UTF-16\"?><doc/>");
        assert_eq!(fixed, "<?xml version=\"1.0\" encoding=\"UTF-8\"?><doc/>");
    }
}
