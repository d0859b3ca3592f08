use std::rc::Rc;

use log::debug;

use crate::dom::Dom;
use crate::error::DomError;

/// In-page links: anything whose `href` starts with `#`.
pub const IN_PAGE_ANCHORS: &str = r##"a[href^="#"]"##;

/// Set on anchors that already carry the smooth-scroll listener.
pub const BOUND_ATTRIBUTE: &str = "data-sc-bound";

/// Attaches the smooth-scroll click listener to every in-page anchor that
/// does not have one yet. Safe to call again after new links are rendered.
///
/// Returns the number of anchors bound by this call.
pub fn bind_smooth_scroll<D>(dom: &Rc<D>, offset: f64) -> Result<usize, DomError>
where
    D: Dom + 'static,
{
    let mut bound = 0;
    for anchor in dom.query_selector_all(IN_PAGE_ANCHORS) {
        if dom.attribute(&anchor, BOUND_ATTRIBUTE).is_some() {
            continue;
        }
        let handler_dom = Rc::clone(dom);
        let target_anchor = anchor.clone();
        dom.on_click(
            &anchor,
            Box::new(move || {
                scroll_to_anchor_target(handler_dom.as_ref(), &target_anchor, offset);
            }),
        )?;
        dom.set_attribute(&anchor, BOUND_ATTRIBUTE, "1")?;
        bound += 1;
    }
    if bound > 0 {
        debug!("bound smooth scroll to {} anchors", bound);
    }
    Ok(bound)
}

/// Smooth-scrolls so the anchor's target sits `offset` below the viewport
/// top. Returns the requested scroll position, or `None` when the anchor has
/// no `href` or its target is not in the document.
pub fn scroll_to_anchor_target<D: Dom>(dom: &D, anchor: &D::Node, offset: f64) -> Option<f64> {
    let href = dom.attribute(anchor, "href")?;
    let target = dom.query_selector(&href)?;
    let top = dom.offset_top(&target) - offset;
    dom.smooth_scroll_to(top);
    Some(top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    #[test]
    fn click_scrolls_target_below_offset() {
        let dom = Rc::new(MemoryDom::new());
        let link = dom.append(dom.body(), "a", &[("href", "#about")]);
        let about = dom.append(dom.body(), "section", &[("id", "about")]);
        dom.set_offset_top(about, 600.0);

        assert_eq!(bind_smooth_scroll(&dom, 80.0).unwrap(), 1);
        assert!(dom.click(link));
        assert_eq!(dom.scroll_requests(), vec![520.0]);
    }

    #[test]
    fn missing_target_still_prevents_navigation() {
        let dom = Rc::new(MemoryDom::new());
        let dangling = dom.append(dom.body(), "a", &[("href", "#nowhere")]);
        let bare = dom.append(dom.body(), "a", &[("href", "#")]);
        bind_smooth_scroll(&dom, 80.0).unwrap();

        assert!(dom.click(dangling));
        assert!(dom.click(bare));
        assert!(dom.scroll_requests().is_empty());
    }

    #[test]
    fn rebinding_never_doubles_listeners() {
        let dom = Rc::new(MemoryDom::new());
        let link = dom.append(dom.body(), "a", &[("href", "#top")]);
        bind_smooth_scroll(&dom, 80.0).unwrap();
        assert_eq!(bind_smooth_scroll(&dom, 80.0).unwrap(), 0);
        assert_eq!(dom.click_listener_count(link), 1);
        assert_eq!(dom.attribute(&link, BOUND_ATTRIBUTE).as_deref(), Some("1"));
    }

    #[test]
    fn external_links_are_left_alone() {
        let dom = Rc::new(MemoryDom::new());
        let link = dom.append(dom.body(), "a", &[("href", "https://example.org/#x")]);
        assert_eq!(bind_smooth_scroll(&dom, 80.0).unwrap(), 0);
        assert!(!dom.click(link));
    }
}
