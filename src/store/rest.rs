//! REST client for a content-management document library.
//!
//! Speaks the site's `_api/web` surface: folder file listing filtered to
//! `.docx`, `$value` binary download, and `AddUsingPath(...,Overwrite=true)`
//! upload. One blocking request per operation; the host API carries no
//! pagination for folder listings of this size.

use super::{DocumentEntry, DocumentStore};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const ACCEPT_JSON: &str = "application/json;odata=nometadata";

/// Blocking REST store bound to one site.
pub struct RestStore {
    client: reqwest::blocking::Client,
    site_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileListing {
    value: Vec<FileItem>,
}

#[derive(Debug, Deserialize)]
struct FileItem {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "ServerRelativeUrl")]
    server_relative_url: String,
}

impl RestStore {
    /// Create a store for a site, with an optional bearer token.
    pub fn new(site_url: &str, token: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("docstamp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            site_url: site_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn get(&self, url: Url) -> reqwest::blocking::RequestBuilder {
        self.request(self.client.get(url))
    }

    fn post(&self, url: Url) -> reqwest::blocking::RequestBuilder {
        self.request(self.client.post(url))
    }

    fn request(&self, builder: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        let builder = builder.header(reqwest::header::ACCEPT, ACCEPT_JSON);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// Folder listing URL: `.docx` only, names and server-relative paths.
fn list_url(site_url: &str, folder: &str) -> Result<Url> {
    // Url::parse percent-encodes what the query cannot carry raw (spaces in
    // folder names, most notably).
    Ok(Url::parse(&format!(
        "{site_url}/_api/web/GetFolderByServerRelativeUrl(@p)/Files\
         ?$select=Name,ServerRelativeUrl&$filter=substringof('.docx',Name)&@p='{folder}'"
    ))?)
}

fn download_url(site_url: &str, path: &str) -> Result<Url> {
    Ok(Url::parse(&format!(
        "{site_url}/_api/web/GetFileByServerRelativePath(DecodedUrl='{path}')/$value"
    ))?)
}

fn upload_url(site_url: &str, folder: &str, name: &str) -> Result<Url> {
    Ok(Url::parse(&format!(
        "{site_url}/_api/web/GetFolderByServerRelativePath(DecodedUrl='{folder}')\
         /Files/AddUsingPath(DecodedUrl='{name}',Overwrite=true)"
    ))?)
}

impl DocumentStore for RestStore {
    fn list_documents(&self, folder: &str) -> Result<Vec<DocumentEntry>> {
        let url = list_url(&self.site_url, folder)?;
        let response = self.get(url).send()?.error_for_status()?;
        let body = response.text()?;
        let listing: FileListing = serde_json::from_str(&body)
            .map_err(|e| Error::Http(format!("bad listing payload: {e}")))?;

        Ok(listing
            .value
            .into_iter()
            .map(|f| DocumentEntry {
                name: f.name,
                path: f.server_relative_url,
            })
            .collect())
    }

    fn download(&self, path: &str) -> Result<Vec<u8>> {
        let url = download_url(&self.site_url, path)?;
        let response = self.get(url).send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::DocumentNotFound(path.to_string()));
        }
        let response = response.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }

    fn upload(&self, folder: &str, name: &str, data: &[u8]) -> Result<String> {
        let url = upload_url(&self.site_url, folder, name)?;
        let response = self.post(url).body(data.to_vec()).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::UploadRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(format!("{}/{}", folder.trim_end_matches('/'), name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = "https://example.org/sites/pruebas";

    #[test]
    fn test_list_url_encodes_folder() {
        let url = list_url(SITE, "/sites/pruebas/Documentos compartidos").unwrap();
        let s = url.as_str();
        assert!(s.contains("GetFolderByServerRelativeUrl(@p)/Files"));
        assert!(s.contains("substringof"));
        // Space in the folder name is percent-encoded, not lost.
        assert!(s.contains("Documentos%20compartidos"));
    }

    #[test]
    fn test_download_url() {
        let url = download_url(SITE, "/sites/pruebas/docs/informe.docx").unwrap();
        assert!(url
            .as_str()
            .ends_with("GetFileByServerRelativePath(DecodedUrl='/sites/pruebas/docs/informe.docx')/$value"));
    }

    #[test]
    fn test_upload_url_overwrites() {
        let url = upload_url(SITE, "/sites/pruebas/docs", "informe-edited.docx").unwrap();
        assert!(url.as_str().contains("AddUsingPath(DecodedUrl='informe-edited.docx',Overwrite=true)"));
    }

    #[test]
    fn test_listing_payload_shape() {
        let json = r#"{"value":[
            {"Name":"a.docx","ServerRelativeUrl":"/sites/p/docs/a.docx"},
            {"Name":"b.docx","ServerRelativeUrl":"/sites/p/docs/b.docx"}
        ]}"#;
        let listing: FileListing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.value.len(), 2);
        assert_eq!(listing.value[0].name, "a.docx");
        assert_eq!(listing.value[1].server_relative_url, "/sites/p/docs/b.docx");
    }
}
