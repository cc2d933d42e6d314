//! Error types for the docstamp library.

use std::io;
use thiserror::Error;

/// Result type alias for docstamp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing or transferring documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing the ZIP container.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required package part is missing (e.g. word/document.xml).
    #[error("Missing part: {0}")]
    MissingPart(String),

    /// No table with the expected header row was found.
    #[error("No table with header row [{0}] found in word/document.xml")]
    TableNotFound(String),

    /// No explicit page break to split the document at.
    #[error("No explicit page break found in the document")]
    PageBreakNotFound,

    /// Invalid or malformed data in the document.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A document was not found in the store.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Network or protocol error talking to the remote store.
    #[cfg(feature = "remote")]
    #[error("HTTP error: {0}")]
    Http(String),

    /// The remote store rejected an upload.
    #[cfg(feature = "remote")]
    #[error("Upload failed ({status}): {body}")]
    UploadRejected { status: u16, body: String },
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

#[cfg(feature = "remote")]
impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingPart("word/document.xml".to_string());
        assert_eq!(err.to_string(), "Missing part: word/document.xml");

        let err = Error::TableNotFound("ID/Autor/Fecha".to_string());
        assert!(err.to_string().contains("ID/Autor/Fecha"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
