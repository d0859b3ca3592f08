use std::rc::Rc;

use log::{debug, info};
use rand::Rng;

use crate::cards::{append_cards, build_image, non_empty, SECTION_CARDS};
use crate::config::{ids, PageConfig};
use crate::content::{NavPlacement, Section};
use crate::dom::Dom;
use crate::error::DomError;
use crate::scroll::bind_smooth_scroll;

/// Marks nav entries created here so a re-render can remove them.
pub const GENERATED_ATTRIBUTE: &str = "data-generated";
const GENERATED_ENTRIES: &str = r#"li[data-generated="true"]"#;

/// Lowercases `title`, collapses every run of non `[a-z0-9]` characters into
/// one `-` and trims dashes at both ends.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Six lowercase base-36 characters.
pub fn random_token() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..6)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// The explicit `key`, else the title slug. `None` when neither gives one.
pub fn stable_key(section: &Section) -> Option<String> {
    if let Some(key) = non_empty(&section.key) {
        return Some(key.to_string());
    }
    section
        .title
        .as_deref()
        .map(slugify)
        .filter(|slug| !slug.is_empty())
}

/// Key for a section's anchor: [`stable_key`], else a fresh token. Tokens
/// differ on every render; sections that need stable deep links should carry
/// a `key`.
pub fn section_key(section: &Section, fallback: &dyn Fn() -> String) -> String {
    stable_key(section).unwrap_or_else(fallback)
}

pub fn section_id(key: &str) -> String {
    format!("sec-{}", key)
}

fn build_section_block<D: Dom>(
    dom: &D,
    section: &Section,
    id: &str,
    config: &PageConfig,
) -> Result<D::Node, DomError> {
    let title_text = section.title.as_deref().unwrap_or_default();

    let block = dom.create_element("div")?;
    dom.set_class_name(&block, "section-block");
    dom.set_attribute(&block, "id", id)?;

    if let Some(src) = non_empty(&section.image_url) {
        let img = build_image(dom, src, title_text, ("margin-bottom", "12px"))?;
        dom.append_child(&block, &img)?;
    }

    let title = dom.create_element("h2")?;
    dom.set_class_name(&title, "section-title");
    dom.set_text_content(&title, title_text);

    let grid = dom.create_element("div")?;
    dom.set_class_name(&grid, "outreach-grid");
    append_cards(dom, &grid, section.cards(), &SECTION_CARDS, &config.fade_in)?;

    dom.append_child(&block, &title)?;
    dom.append_child(&block, &grid)?;
    Ok(block)
}

/// Inserts `entry` into `nav` according to `placement`. Indexes are clamped
/// to `0..=children`; an index equal to the child count appends.
pub fn insert_nav_entry<D: Dom>(
    dom: &D,
    nav: &D::Node,
    entry: &D::Node,
    placement: NavPlacement,
) -> Result<(), DomError> {
    let children = dom.children(nav);
    let reference = match placement {
        NavPlacement::Start => children.first(),
        NavPlacement::Index(index) => {
            let clamped = index.clamp(0, children.len() as i64) as usize;
            children.get(clamped)
        }
        NavPlacement::End => None,
    };
    dom.insert_before(nav, entry, reference)
}

fn build_nav_entry<D: Dom>(dom: &D, label: &str, id: &str) -> Result<D::Node, DomError> {
    let item = dom.create_element("li")?;
    dom.set_attribute(&item, GENERATED_ATTRIBUTE, "true")?;
    let link = dom.create_element("a")?;
    dom.set_attribute(&link, "href", &format!("#{}", id))?;
    dom.set_text_content(&link, label);
    dom.append_child(&item, &link)?;
    Ok(item)
}

/// Drops the entries from the previous render and adds one per section.
fn patch_nav_menu<D: Dom>(
    dom: &D,
    sections: &[(&Section, String)],
    config: &PageConfig,
) -> Result<(), DomError> {
    let Some(nav) = dom.query_selector(&config.nav_menu_selector) else {
        debug!("no nav menu, section links not generated");
        return Ok(());
    };
    for stale in dom.query_selector_all_in(&nav, GENERATED_ENTRIES) {
        dom.remove(&stale);
    }
    for (section, id) in sections {
        let label = non_empty(&section.title).unwrap_or(config.section_nav_fallback.as_str());
        let entry = build_nav_entry(dom, label, id)?;
        insert_nav_entry(dom, &nav, &entry, section.placement())?;
    }
    Ok(())
}

/// Rebuilds `#sections-root` from `sections`, regenerates their nav entries
/// and binds smooth scrolling to the new links.
///
/// Returns the generated block identifiers in order. A missing root leaves
/// both the page and the nav menu untouched.
pub fn render_sections<D>(
    dom: &Rc<D>,
    sections: &[Section],
    config: &PageConfig,
    fallback: &dyn Fn() -> String,
) -> Result<Vec<String>, DomError>
where
    D: Dom + 'static,
{
    let Some(root) = dom.element_by_id(ids::SECTIONS_ROOT) else {
        debug!("no #{} container, skipping sections", ids::SECTIONS_ROOT);
        return Ok(Vec::new());
    };
    dom.set_inner_html(&root, "");

    let mut rendered = Vec::with_capacity(sections.len());
    for section in sections {
        let id = section_id(&section_key(section, fallback));
        let block = build_section_block(dom.as_ref(), section, &id, config)?;
        dom.append_child(&root, &block)?;
        rendered.push((section, id));
    }

    patch_nav_menu(dom.as_ref(), &rendered, config)?;
    bind_smooth_scroll(dom, config.scroll_offset)?;

    info!("rendered {} sections", rendered.len());
    Ok(rendered.into_iter().map(|(_, id)| id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Card;
    use crate::dom::MemoryDom;

    fn no_token() -> String {
        panic!("fallback token should not be needed")
    }

    fn section(title: Option<&str>, key: Option<&str>) -> Section {
        Section {
            title: title.map(str::to_string),
            key: key.map(str::to_string),
            ..Section::default()
        }
    }

    #[test]
    fn slug_collapses_punctuation_and_trims() {
        assert_eq!(slugify("Our Team!"), "our-team");
        assert_eq!(slugify("  FIRST -- Robotics 2024 "), "first-robotics-2024");
        assert_eq!(slugify("--a--"), "a");
        assert_eq!(slugify("チーム"), "");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
    }

    #[test]
    fn key_prefers_explicit_then_title_then_token() {
        assert_eq!(section_key(&section(Some("Ignored"), Some("team-info")), &no_token), "team-info");
        assert_eq!(section_key(&section(Some("Our Team!"), None), &no_token), "our-team");
        assert_eq!(section_key(&section(Some("Our Team!"), Some("")), &no_token), "our-team");
        assert_eq!(section_key(&section(Some("!!!"), None), &|| "x1y2z3".to_string()), "x1y2z3");
        assert_eq!(section_key(&section(None, None), &|| "abc123".to_string()), "abc123");
    }

    #[test]
    fn random_tokens_are_six_base36_chars() {
        let token = random_token();
        assert_eq!(token.len(), 6);
        assert!(token.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn nav_index_is_clamped() {
        let dom = MemoryDom::new();
        let nav = dom.append(dom.body(), "ul", &[]);
        let first = dom.append(nav, "li", &[]);
        let second = dom.append(nav, "li", &[]);

        let low = dom.create_element("li").unwrap();
        insert_nav_entry(&dom, &nav, &low, NavPlacement::Index(-3)).unwrap();
        let high = dom.create_element("li").unwrap();
        insert_nav_entry(&dom, &nav, &high, NavPlacement::Index(99)).unwrap();
        let middle = dom.create_element("li").unwrap();
        insert_nav_entry(&dom, &nav, &middle, NavPlacement::Index(2)).unwrap();

        assert_eq!(dom.children(&nav), vec![low, first, middle, second, high]);
    }

    #[test]
    fn start_on_empty_nav_appends() {
        let dom = MemoryDom::new();
        let nav = dom.append(dom.body(), "ul", &[]);
        let entry = dom.create_element("li").unwrap();
        insert_nav_entry(&dom, &nav, &entry, NavPlacement::Start).unwrap();
        assert_eq!(dom.children(&nav), vec![entry]);
    }

    #[test]
    fn section_block_layout() {
        let dom = Rc::new(MemoryDom::new());
        let root = dom.append(dom.body(), "div", &[("id", "sections-root")]);
        let sections = vec![Section {
            title: Some("Sponsors".into()),
            image_url: Some("img/sponsors.png".into()),
            cards: Some(vec![Card::default(), Card::default()]),
            ..Section::default()
        }];

        let ids = render_sections(&dom, &sections, &PageConfig::default(), &no_token).unwrap();
        assert_eq!(ids, vec!["sec-sponsors".to_string()]);

        let block = dom.children(&root)[0];
        assert_eq!(dom.attribute(&block, "class").as_deref(), Some("section-block"));
        let parts = dom.children(&block);
        assert_eq!(dom.tag(parts[0]), "img");
        assert_eq!(dom.style(parts[0], "margin-bottom").as_deref(), Some("12px"));
        assert_eq!(dom.tag(parts[1]), "h2");
        assert_eq!(dom.text(parts[1]).as_deref(), Some("Sponsors"));
        assert_eq!(dom.attribute(&parts[2], "class").as_deref(), Some("outreach-grid"));

        let cards = dom.children(&parts[2]);
        assert_eq!(cards.len(), 2);
        assert_eq!(dom.text(dom.children(&cards[0])[0]).as_deref(), Some("📌"));
        assert_eq!(dom.style(cards[1], "opacity").as_deref(), Some("1"));
    }

    #[test]
    fn untitled_section_nav_label_falls_back() {
        let dom = Rc::new(MemoryDom::new());
        dom.append(dom.body(), "div", &[("id", "sections-root")]);
        let nav = dom.append(dom.body(), "ul", &[("class", "nav-menu")]);

        let ids = render_sections(&dom, &[Section::default()], &PageConfig::default(), &|| {
            "q9w8e7".to_string()
        })
        .unwrap();
        assert_eq!(ids, vec!["sec-q9w8e7".to_string()]);

        let entry = dom.children(&nav)[0];
        let link = dom.children(&entry)[0];
        assert_eq!(dom.attribute(&link, "href").as_deref(), Some("#sec-q9w8e7"));
        assert_eq!(dom.text(link).as_deref(), Some("セクション"));
    }

    #[test]
    fn missing_root_skips_nav_too() {
        let dom = Rc::new(MemoryDom::new());
        let nav = dom.append(dom.body(), "ul", &[("class", "nav-menu")]);
        let ids = render_sections(&dom, &[section(Some("A"), None)], &PageConfig::default(), &no_token)
            .unwrap();
        assert!(ids.is_empty());
        assert!(dom.children(&nav).is_empty());
    }
}
