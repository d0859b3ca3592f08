use std::rc::Rc;

use log::{error, info, warn};

use crate::config::PageConfig;
use crate::content::ContentDocument;
use crate::dom::Dom;
use crate::error::DomError;
use crate::loader::ContentSource;
use crate::navbar::install_navbar_toggler;
use crate::render::render_document;
use crate::reveal::observe_fade_in;
use crate::scroll::bind_smooth_scroll;
use crate::sections::random_token;

/// Owns everything the page scripts need: the document, the navbar element,
/// the configuration and the source of fallback section tokens.
pub struct PageController<D: Dom> {
    dom: Rc<D>,
    config: PageConfig,
    navbar: Option<D::Node>,
    fallback_token: Box<dyn Fn() -> String>,
}

impl<D: Dom + 'static> PageController<D> {
    /// Looks the navbar up with `config.navbar_selector`.
    pub fn new(dom: Rc<D>, config: PageConfig) -> Self {
        let navbar = dom.query_selector(&config.navbar_selector);
        Self {
            dom,
            config,
            navbar,
            fallback_token: Box::new(random_token),
        }
    }

    pub fn with_navbar(mut self, navbar: Option<D::Node>) -> Self {
        self.navbar = navbar;
        self
    }

    pub fn with_fallback_token(mut self, token: impl Fn() -> String + 'static) -> Self {
        self.fallback_token = Box::new(token);
        self
    }

    pub fn dom(&self) -> &Rc<D> {
        &self.dom
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Wires the static page: smooth scroll for existing anchors, fade-in for
    /// existing cards, and the navbar scroll style.
    pub fn start(&self) -> Result<(), DomError> {
        bind_smooth_scroll(&self.dom, self.config.scroll_offset)?;
        let observed = observe_fade_in(&self.dom, &self.config.fade_in)?;
        match &self.navbar {
            Some(navbar) => {
                install_navbar_toggler(&self.dom, navbar.clone(), self.config.navbar.clone())?
            }
            None => warn!("no element matches {}, navbar style stays fixed", self.config.navbar_selector),
        }
        info!("page started, {} elements waiting to fade in", observed);
        Ok(())
    }

    pub fn render(&self, doc: &ContentDocument) -> Result<(), DomError> {
        render_document(&self.dom, doc, &self.config, self.fallback_token.as_ref())
    }

    /// Fetches and renders the content. Failures are logged and the static
    /// placeholder markup stays in place.
    pub async fn load<S: ContentSource>(&self, source: &S) {
        let doc = match source.fetch().await {
            Ok(doc) => doc,
            Err(e) => {
                error!("Unable to load {}: {}", self.config.content_url, e);
                return;
            }
        };
        if let Err(e) = self.render(&doc) {
            error!("Rendering {} stopped part way: {}", self.config.content_url, e);
        }
    }
}
