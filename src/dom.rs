//! The slice of the browser DOM the page controller needs.
//!
//! Every renderer is written against [`Dom`] so it can run in the browser
//! through [`WebDom`] or natively against the in-memory [`MemoryDom`].

pub mod memory;
pub mod web;

pub use memory::{MemoryDom, NodeId};
pub use web::WebDom;

use crate::error::DomError;

/// Options for a one-shot visibility watcher.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionOptions {
    pub threshold: f64,
    pub root_margin: String,
}

pub trait Dom {
    type Node: Clone + PartialEq + 'static;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// First match in document order. Invalid selectors match nothing.
    fn query_selector(&self, selector: &str) -> Option<Self::Node>;

    fn query_selector_all(&self, selector: &str) -> Vec<Self::Node>;

    /// Matches among the descendants of `scope`.
    fn query_selector_all_in(&self, scope: &Self::Node, selector: &str) -> Vec<Self::Node>;

    fn create_element(&self, tag: &str) -> Result<Self::Node, DomError>;

    fn set_text_content(&self, node: &Self::Node, text: &str);

    /// Replaces the children of `node` with parsed markup.
    fn set_inner_html(&self, node: &Self::Node, markup: &str);

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<(), DomError>;

    fn set_class_name(&self, node: &Self::Node, class: &str);

    fn set_style(&self, node: &Self::Node, property: &str, value: &str) -> Result<(), DomError>;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;

    /// Inserts `child` before `reference`, or appends when `reference` is `None`.
    fn insert_before(
        &self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: Option<&Self::Node>,
    ) -> Result<(), DomError>;

    fn remove(&self, node: &Self::Node);

    /// Element children in order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Distance from the node's top edge to the top of the document.
    fn offset_top(&self, node: &Self::Node) -> f64;

    fn scroll_y(&self) -> f64;

    fn smooth_scroll_to(&self, top: f64);

    /// Registers a click listener. Default navigation is always prevented
    /// before `handler` runs.
    fn on_click(&self, node: &Self::Node, handler: Box<dyn Fn()>) -> Result<(), DomError>;

    fn on_scroll(&self, handler: Box<dyn Fn()>) -> Result<(), DomError>;

    /// Calls `on_visible` once per node the first time it enters the viewport.
    fn observe_intersection(
        &self,
        nodes: &[Self::Node],
        options: &IntersectionOptions,
        on_visible: Box<dyn Fn(&Self::Node)>,
    ) -> Result<(), DomError>;

    /// Runs `handler` now if the document has been parsed, otherwise once
    /// parsing finishes.
    fn when_ready(&self, handler: Box<dyn FnOnce()>) -> Result<(), DomError>;
}
