//! Addressing remote documents.

use reqwest::Url;

use crate::error::{AppError, Result};

/// Where a document lives: the service base address and the document id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocLocation {
    /// Service base address, including any `/o/<org>` prefix
    pub server: Url,
    pub doc_id: String,
}

impl DocLocation {
    pub fn new(server: Url, doc_id: impl Into<String>) -> Self {
        Self {
            server,
            doc_id: doc_id.into(),
        }
    }

    /// Parse a document url as users copy it from their browser.
    ///
    /// Accepted shapes:
    /// - `https://host/<docId>/<slug>`
    /// - `https://host/doc/<docId>`
    /// - `https://host/o/<org>/<docId>/...`
    /// - `https://host/api/docs/<docId>/...`
    pub fn parse(doc_url: &str) -> Result<Self> {
        let invalid = || AppError::Validation(format!("invalid document url: {doc_url:?}"));

        let url = Url::parse(doc_url.trim()).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(invalid());
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let (prefix, rest) = match segments.as_slice() {
            ["o", org, rest @ ..] => (vec!["o", *org], rest),
            rest => (vec![], rest),
        };

        let doc_id = match rest {
            ["api", "docs", doc, ..] => *doc,
            ["doc", doc, ..] => *doc,
            [doc, ..] => *doc,
            [] => return Err(invalid()),
        };
        if !doc_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(invalid());
        }

        let mut server = url.clone();
        server.set_query(None);
        server.set_fragment(None);
        server.set_path("");
        if let Ok(mut path) = server.path_segments_mut() {
            path.clear().extend(prefix);
        }

        Ok(Self::new(server, doc_id))
    }

    /// Url of an endpoint under this document's api root.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.server.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["api", "docs", self.doc_id.as_str()])
                .extend(segments);
        }
        url
    }
}
