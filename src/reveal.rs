use std::rc::Rc;

use log::{debug, warn};

use crate::config::FadeInConfig;
use crate::dom::{Dom, IntersectionOptions};
use crate::error::DomError;

/// Hides every statically present card matched by `config.selectors` and
/// reveals each one the first time it scrolls into view.
///
/// Elements that cannot be styled are skipped. Returns the number of elements
/// put under observation.
pub fn observe_fade_in<D>(dom: &Rc<D>, config: &FadeInConfig) -> Result<usize, DomError>
where
    D: Dom + 'static,
{
    let nodes: Vec<D::Node> = dom
        .query_selector_all(&config.selectors.join(", "))
        .into_iter()
        .filter(|node| match hide(dom.as_ref(), node, config) {
            Ok(()) => true,
            Err(e) => {
                warn!("fade-in skipped an element: {}", e);
                false
            }
        })
        .collect();

    let options = IntersectionOptions {
        threshold: config.threshold,
        root_margin: config.root_margin.clone(),
    };
    let handler_dom = Rc::clone(dom);
    dom.observe_intersection(
        &nodes,
        &options,
        Box::new(move |node| {
            if let Err(e) = reveal(handler_dom.as_ref(), node) {
                debug!("fade-in reveal failed: {}", e);
            }
        }),
    )?;
    Ok(nodes.len())
}

fn hide<D: Dom>(dom: &D, node: &D::Node, config: &FadeInConfig) -> Result<(), DomError> {
    dom.set_style(node, "opacity", "0")?;
    dom.set_style(node, "transform", &config.hidden_transform)?;
    dom.set_style(node, "transition", &config.transition)
}

/// Full opacity, no offset.
pub fn reveal<D: Dom>(dom: &D, node: &D::Node) -> Result<(), DomError> {
    dom.set_style(node, "opacity", "1")?;
    dom.set_style(node, "transform", "translateY(0)")
}

/// Shows rendered cards right away instead of waiting for the observer.
pub fn show_immediately<D: Dom>(
    dom: &D,
    node: &D::Node,
    config: &FadeInConfig,
) -> Result<(), DomError> {
    reveal(dom, node)?;
    dom.set_style(node, "transition", &config.transition)
}
