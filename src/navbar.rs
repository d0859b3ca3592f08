use std::rc::Rc;

use log::debug;

use crate::config::{NavbarConfig, NavbarStyle};
use crate::dom::Dom;
use crate::error::DomError;

/// Style for a given vertical scroll offset. No hysteresis.
pub fn style_for_offset(config: &NavbarConfig, scroll_y: f64) -> &NavbarStyle {
    if scroll_y > config.threshold {
        &config.scrolled
    } else {
        &config.resting
    }
}

pub fn apply_navbar_style<D: Dom>(
    dom: &D,
    navbar: &D::Node,
    config: &NavbarConfig,
) -> Result<(), DomError> {
    let style = style_for_offset(config, dom.scroll_y());
    dom.set_style(navbar, "background", &style.background)?;
    dom.set_style(navbar, "box-shadow", &style.box_shadow)
}

/// Restyles `navbar` on every scroll event.
pub fn install_navbar_toggler<D>(
    dom: &Rc<D>,
    navbar: D::Node,
    config: NavbarConfig,
) -> Result<(), DomError>
where
    D: Dom + 'static,
{
    let handler_dom = Rc::clone(dom);
    dom.on_scroll(Box::new(move || {
        if let Err(e) = apply_navbar_style(handler_dom.as_ref(), &navbar, &config) {
            debug!("navbar restyle failed: {}", e);
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::dom::MemoryDom;

    #[test]
    fn threshold_is_exclusive() {
        let config = PageConfig::default().navbar;
        assert_eq!(style_for_offset(&config, 50.0), &config.resting);
        assert_eq!(style_for_offset(&config, 50.5), &config.scrolled);
        assert_eq!(style_for_offset(&config, 0.0), &config.resting);
    }

    #[test]
    fn scroll_events_swap_styles_both_ways() {
        let dom = Rc::new(MemoryDom::new());
        let navbar = dom.append(dom.body(), "nav", &[("class", "navbar")]);
        let config = PageConfig::default().navbar;
        install_navbar_toggler(&dom, navbar, config.clone()).unwrap();

        dom.scroll_window(120.0);
        assert_eq!(
            dom.style(navbar, "background").as_deref(),
            Some("rgba(255, 255, 255, 0.98)")
        );
        assert_eq!(
            dom.style(navbar, "box-shadow").as_deref(),
            Some("0 2px 30px rgba(0, 0, 0, 0.15)")
        );

        dom.scroll_window(10.0);
        assert_eq!(
            dom.style(navbar, "background").as_deref(),
            Some(config.resting.background.as_str())
        );
        assert_eq!(
            dom.style(navbar, "box-shadow").as_deref(),
            Some("0 2px 20px rgba(0, 0, 0, 0.1)")
        );
    }
}
