use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{
    CssStyleDeclaration, Document, Element, Event, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, ScrollBehavior, ScrollToOptions,
    SvgElement, Window,
};

use super::{Dom, IntersectionOptions};
use crate::error::DomError;

/// [`Dom`] over the live browser document.
///
/// Listeners are leaked with `Closure::forget`: they live as long as the page.
pub struct WebDom {
    window: Window,
    document: Document,
}

impl WebDom {
    pub fn new(window: Window) -> Result<Self, DomError> {
        let document = window.document().ok_or(DomError::NoDocument)?;
        Ok(Self { window, document })
    }

    pub fn from_global() -> Result<Self, DomError> {
        Self::new(web_sys::window().ok_or(DomError::NoDocument)?)
    }

    fn collect_nodes(list: web_sys::NodeList) -> Vec<Element> {
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }
}

impl Dom for WebDom {
    type Node = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query_selector(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        self.document
            .query_selector_all(selector)
            .map(Self::collect_nodes)
            .unwrap_or_default()
    }

    fn query_selector_all_in(&self, scope: &Element, selector: &str) -> Vec<Element> {
        scope
            .query_selector_all(selector)
            .map(Self::collect_nodes)
            .unwrap_or_default()
    }

    fn create_element(&self, tag: &str) -> Result<Element, DomError> {
        Ok(self.document.create_element(tag)?)
    }

    fn set_text_content(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_inner_html(&self, node: &Element, markup: &str) {
        node.set_inner_html(markup);
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) -> Result<(), DomError> {
        Ok(node.set_attribute(name, value)?)
    }

    fn set_class_name(&self, node: &Element, class: &str) {
        node.set_class_name(class);
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) -> Result<(), DomError> {
        let style: CssStyleDeclaration = if let Some(html) = node.dyn_ref::<HtmlElement>() {
            html.style()
        } else if let Some(svg) = node.dyn_ref::<SvgElement>() {
            svg.style()
        } else {
            return Err(DomError::NotStyleable);
        };
        Ok(style.set_property(property, value)?)
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<(), DomError> {
        parent.append_child(child)?;
        Ok(())
    }

    fn insert_before(
        &self,
        parent: &Element,
        child: &Element,
        reference: Option<&Element>,
    ) -> Result<(), DomError> {
        let reference: Option<&web_sys::Node> = reference.map(|r| r.as_ref());
        parent.insert_before(child, reference)?;
        Ok(())
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn children(&self, node: &Element) -> Vec<Element> {
        let children = node.children();
        (0..children.length()).filter_map(|i| children.item(i)).collect()
    }

    fn offset_top(&self, node: &Element) -> f64 {
        node.dyn_ref::<HtmlElement>()
            .map(|html| html.offset_top() as f64)
            .unwrap_or_default()
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or_default()
    }

    fn smooth_scroll_to(&self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn on_click(&self, node: &Element, handler: Box<dyn Fn()>) -> Result<(), DomError> {
        let callback = Closure::<dyn Fn(Event)>::new(move |event: Event| {
            event.prevent_default();
            handler();
        });
        node.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())?;
        callback.forget();
        Ok(())
    }

    fn on_scroll(&self, handler: Box<dyn Fn()>) -> Result<(), DomError> {
        let callback = Closure::<dyn Fn()>::new(move || handler());
        self.window
            .add_event_listener_with_callback("scroll", callback.as_ref().unchecked_ref())?;
        callback.forget();
        Ok(())
    }

    fn observe_intersection(
        &self,
        nodes: &[Element],
        options: &IntersectionOptions,
        on_visible: Box<dyn Fn(&Element)>,
    ) -> Result<(), DomError> {
        let callback = Closure::<dyn Fn(Array, IntersectionObserver)>::new(
            move |entries: Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    if entry.is_intersecting() {
                        let target = entry.target();
                        on_visible(&target);
                        observer.unobserve(&target);
                    }
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        for node in nodes {
            observer.observe(node);
        }
        callback.forget();
        Ok(())
    }

    fn when_ready(&self, handler: Box<dyn FnOnce()>) -> Result<(), DomError> {
        if self.document.ready_state() != "loading" {
            handler();
            return Ok(());
        }
        let callback = Closure::once_into_js(move || handler());
        self.document
            .add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())?;
        Ok(())
    }
}
