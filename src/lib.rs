//! Page scripts for the team website: fills the static markup from
//! `content.json`, builds card lists and sections, and wires smooth
//! scrolling, the navbar scroll style and fade-in reveals.

pub mod cards;
pub mod config;
pub mod content;
pub mod dom;
pub mod error;
pub mod loader;
pub mod navbar;
pub mod page;
pub mod render;
pub mod reveal;
pub mod scroll;
pub mod sections;
pub mod verify;

use std::rc::Rc;

use log::error;
use wasm_bindgen_futures::spawn_local;

use config::PageConfig;
use dom::{Dom, WebDom};
use error::DomError;
use loader::HttpContentSource;
use page::PageController;

/// Browser entry point. Once the document is parsed, wires the static page
/// and then fetches and applies the content document.
pub fn run() -> Result<(), DomError> {
    let dom = Rc::new(WebDom::from_global()?);
    let ready_dom = Rc::clone(&dom);
    dom.when_ready(Box::new(move || {
        let page = PageController::new(ready_dom, PageConfig::default());
        if let Err(e) = page.start() {
            error!("Failed to wire page: {}", e);
        }
        spawn_local(async move {
            let source = HttpContentSource::new(page.config().content_url.clone());
            page.load(&source).await;
        });
    }))
}
