use log::debug;

use crate::config::{ids, FadeInConfig};
use crate::content::Card;
use crate::dom::Dom;
use crate::error::DomError;
use crate::reveal::show_immediately;

/// How one family of cards is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLayout {
    pub card_class: &'static str,
    pub icon_class: &'static str,
    pub default_icon: &'static str,
    /// Margin property and value applied to the optional image.
    pub image_margin: (&'static str, &'static str),
}

pub const ABOUT_CARDS: CardLayout = CardLayout {
    card_class: "about-card",
    icon_class: "card-icon",
    default_icon: "🤖",
    image_margin: ("margin-top", "8px"),
};

pub const OUTREACH_CARDS: CardLayout = CardLayout {
    card_class: "outreach-card",
    icon_class: "outreach-icon",
    default_icon: "📚",
    image_margin: ("margin-bottom", "8px"),
};

pub const SECTION_CARDS: CardLayout = CardLayout {
    default_icon: "📌",
    ..OUTREACH_CARDS
};

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// `<img>` constrained to its container with rounded corners.
pub(crate) fn build_image<D: Dom>(
    dom: &D,
    src: &str,
    alt: &str,
    margin: (&str, &str),
) -> Result<D::Node, DomError> {
    let img = dom.create_element("img")?;
    dom.set_attribute(&img, "src", src)?;
    dom.set_attribute(&img, "alt", alt)?;
    dom.set_style(&img, "max-width", "100%")?;
    dom.set_style(&img, "border-radius", "8px")?;
    dom.set_style(&img, margin.0, margin.1)?;
    Ok(img)
}

/// One card: optional image first, then icon, title and body. The body is
/// maintainer markup and is injected as-is.
pub fn build_card<D: Dom>(dom: &D, card: &Card, layout: &CardLayout) -> Result<D::Node, DomError> {
    let title = card.title.as_deref().unwrap_or_default();

    let card_el = dom.create_element("div")?;
    dom.set_class_name(&card_el, layout.card_class);

    if let Some(src) = non_empty(&card.image_url) {
        let img = build_image(dom, src, title, layout.image_margin)?;
        dom.append_child(&card_el, &img)?;
    }

    let icon = dom.create_element("div")?;
    dom.set_class_name(&icon, layout.icon_class);
    dom.set_text_content(&icon, non_empty(&card.icon).unwrap_or(layout.default_icon));

    let heading = dom.create_element("h3")?;
    dom.set_text_content(&heading, title);

    let body = dom.create_element("p")?;
    dom.set_inner_html(&body, card.text.as_ref().map(|t| t.as_str()).unwrap_or_default());

    dom.append_child(&card_el, &icon)?;
    dom.append_child(&card_el, &heading)?;
    dom.append_child(&card_el, &body)?;
    Ok(card_el)
}

/// Appends one card per entry to `container` and shows them immediately.
pub fn append_cards<D: Dom>(
    dom: &D,
    container: &D::Node,
    cards: &[Card],
    layout: &CardLayout,
    fade_in: &FadeInConfig,
) -> Result<Vec<D::Node>, DomError> {
    let mut built = Vec::with_capacity(cards.len());
    for card in cards {
        let card_el = build_card(dom, card, layout)?;
        dom.append_child(container, &card_el)?;
        built.push(card_el);
    }
    for card_el in &built {
        show_immediately(dom, card_el, fade_in)?;
    }
    Ok(built)
}

/// Replaces the contents of the element `container_id` with `cards`.
/// A missing container is not an error.
pub fn render_card_list<D: Dom>(
    dom: &D,
    container_id: &str,
    cards: &[Card],
    layout: &CardLayout,
    fade_in: &FadeInConfig,
) -> Result<usize, DomError> {
    let Some(container) = dom.element_by_id(container_id) else {
        debug!("no #{} container, skipping {} cards", container_id, cards.len());
        return Ok(0);
    };
    dom.set_inner_html(&container, "");
    let built = append_cards(dom, &container, cards, layout, fade_in)?;
    Ok(built.len())
}

pub fn render_about<D: Dom>(dom: &D, cards: &[Card], fade_in: &FadeInConfig) -> Result<usize, DomError> {
    render_card_list(dom, ids::ABOUT_CONTENT, cards, &ABOUT_CARDS, fade_in)
}

pub fn render_outreach<D: Dom>(
    dom: &D,
    cards: &[Card],
    fade_in: &FadeInConfig,
) -> Result<usize, DomError> {
    render_card_list(dom, ids::OUTREACH_GRID, cards, &OUTREACH_CARDS, fade_in)
}
