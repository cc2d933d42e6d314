//! Directory-backed document store.

use super::{DocumentEntry, DocumentStore};
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Store rooted at a local directory; folders are paths below the root.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn folder_path(&self, folder: &str) -> PathBuf {
        if folder.is_empty() || folder == "." {
            self.root.clone()
        } else {
            self.root.join(folder)
        }
    }
}

fn is_docx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("docx"))
}

impl DocumentStore for LocalStore {
    fn list_documents(&self, folder: &str) -> Result<Vec<DocumentEntry>> {
        let dir = self.folder_path(folder);
        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_docx(&path) {
                entries.push(DocumentEntry {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    path: path.to_string_lossy().into_owned(),
                });
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn download(&self, path: &str) -> Result<Vec<u8>> {
        let resolved = if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.root.join(path)
        };
        Ok(fs::read(resolved)?)
    }

    fn upload(&self, folder: &str, name: &str, data: &[u8]) -> Result<String> {
        let dir = self.folder_path(folder);
        fs::create_dir_all(&dir)?;
        let path = dir.join(name);
        fs::write(&path, data)?;
        Ok(path.to_string_lossy().into_owned())
    }
}
