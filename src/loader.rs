use gloo_net::http::Request;

use crate::content::ContentDocument;
use crate::error::ContentError;

/// Something that can produce the page's content document.
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    async fn fetch(&self) -> Result<ContentDocument, ContentError>;
}

/// Fetches the document over HTTP. One request, no retry or timeout.
pub struct HttpContentSource {
    url: String,
}

impl HttpContentSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ContentSource for HttpContentSource {
    async fn fetch(&self) -> Result<ContentDocument, ContentError> {
        let response = Request::get(&self.url)
            .send()
            .await
            .map_err(|e| ContentError::Transport(e.to_string()))?;
        if !response.ok() {
            return Err(ContentError::Status(response.status()));
        }
        let body = response
            .text()
            .await
            .map_err(|e| ContentError::Transport(e.to_string()))?;
        ContentDocument::from_json(&body)
    }
}
