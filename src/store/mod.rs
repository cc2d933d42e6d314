//! Document-store clients.
//!
//! A [`DocumentStore`] is the seam between the editing pipeline and wherever
//! the documents actually live: a content-management site over REST, or a
//! plain directory for offline use and tests.

pub mod local;

#[cfg(feature = "remote")]
pub mod rest;

use crate::error::Result;
use serde::{Deserialize, Serialize};

pub use local::LocalStore;

#[cfg(feature = "remote")]
pub use rest::RestStore;

/// One document in a store folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEntry {
    /// File name, e.g. `informe.docx`.
    pub name: String,
    /// Store-specific path used for download.
    pub path: String,
}

/// Listing, download, and upload against a document folder.
pub trait DocumentStore {
    /// List the `.docx` documents in a folder.
    fn list_documents(&self, folder: &str) -> Result<Vec<DocumentEntry>>;

    /// Download a document by its store path.
    fn download(&self, path: &str) -> Result<Vec<u8>>;

    /// Upload a document into a folder, overwriting any existing file.
    /// Returns the stored path.
    fn upload(&self, folder: &str, name: &str, data: &[u8]) -> Result<String>;
}

/// Derive the output name for a stamped document: `informe.docx` with suffix
/// `-edited` becomes `informe-edited.docx`.
pub fn stamped_name(original: &str, suffix: &str) -> String {
    // A case-insensitive ".docx" suffix is ASCII, so the slice is safe.
    let stem = if original.to_ascii_lowercase().ends_with(".docx") {
        &original[..original.len() - 5]
    } else {
        original
    };
    format!("{stem}{suffix}.docx")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamped_name() {
        assert_eq!(stamped_name("informe.docx", "-edited"), "informe-edited.docx");
        assert_eq!(stamped_name("INFORME.DOCX", "-edited"), "INFORME-edited.docx");
        assert_eq!(stamped_name("Acta.Docx", "-resto"), "Acta-resto.docx");
        assert_eq!(stamped_name("sin-extension", "-pag1"), "sin-extension-pag1.docx");
    }
}
