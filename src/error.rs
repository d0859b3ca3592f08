use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failure of a single DOM call. Renderers propagate these with `?` and the
/// page controller logs them; nothing is surfaced to the visitor.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("DOM call failed: {0}")]
    Js(String),
    #[error("reference node is not a child of the parent")]
    NotAChild,
    #[error("node does not support inline styles")]
    NotStyleable,
    #[error("document is not available")]
    NoDocument,
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        DomError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

/// Reasons a content fetch is abandoned. All of them leave the static
/// placeholder markup in place.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("top level of the content document is not an object")]
    NotAnObject,
}
