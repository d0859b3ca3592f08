use std::rc::Rc;

use log::{info, warn};

use crate::cards::{render_about, render_outreach};
use crate::config::{ids, PageConfig};
use crate::content::{ContentDocument, PlainBlock, RichBlock, TrustedHtml};
use crate::dom::Dom;
use crate::error::DomError;
use crate::scroll::bind_smooth_scroll;
use crate::sections::render_sections;

/// Sets the text of `#id`. Absent values and missing elements are skipped.
fn set_text<D: Dom>(dom: &D, id: &str, value: Option<&str>) {
    let (Some(value), Some(el)) = (value, dom.element_by_id(id)) else {
        return;
    };
    dom.set_text_content(&el, value);
}

/// Injects maintainer markup into `#id`.
fn set_html<D: Dom>(dom: &D, id: &str, value: Option<&TrustedHtml>) {
    let (Some(value), Some(el)) = (value, dom.element_by_id(id)) else {
        return;
    };
    dom.set_inner_html(&el, value.as_str());
}

fn set_rich_block<D: Dom>(dom: &D, block: Option<&RichBlock>, title_id: &str, text_id: &str) {
    set_text(dom, title_id, block.and_then(|b| b.title.as_deref()));
    set_html(dom, text_id, block.and_then(|b| b.text.as_ref()));
}

fn set_plain_block<D: Dom>(dom: &D, block: Option<&PlainBlock>, title_id: &str, text_id: &str) {
    set_text(dom, title_id, block.and_then(|b| b.title.as_deref()));
    set_text(dom, text_id, block.and_then(|b| b.text.as_deref()));
}

/// Projects one content document onto the page.
///
/// Scalars go to their fixed element ids, card lists and sections are
/// rebuilt, and smooth scrolling is bound to any new anchors. Running it
/// again with the same document yields the same page.
pub fn render_document<D>(
    dom: &Rc<D>,
    doc: &ContentDocument,
    config: &PageConfig,
    fallback_token: &dyn Fn() -> String,
) -> Result<(), DomError>
where
    D: Dom + 'static,
{
    let page = dom.as_ref();

    set_text(page, ids::TEAM_NUMBER, doc.team_number.as_deref());
    set_text(page, ids::TEAM_NAME, doc.team_name.as_deref());
    set_text(page, ids::HERO_TITLE, doc.hero_title.as_deref());
    set_text(page, ids::HERO_SUBTITLE, doc.hero_subtitle.as_deref());
    set_html(page, ids::HERO_DESCRIPTION, doc.hero_description.as_ref());

    set_text(page, ids::ABOUT_TITLE, doc.about_title.as_deref());
    match doc.about_cards() {
        Some(cards) => {
            render_about(page, cards, &config.fade_in)?;
        }
        None => {
            set_rich_block(
                page,
                doc.about_mission.as_ref(),
                ids::ABOUT_MISSION_TITLE,
                ids::ABOUT_MISSION_TEXT,
            );
            set_rich_block(
                page,
                doc.about_values.as_ref(),
                ids::ABOUT_VALUES_TITLE,
                ids::ABOUT_VALUES_TEXT,
            );
            set_rich_block(
                page,
                doc.about_goals.as_ref(),
                ids::ABOUT_GOALS_TITLE,
                ids::ABOUT_GOALS_TEXT,
            );
        }
    }

    if let Some(cards) = doc.outreach_cards() {
        render_outreach(page, cards, &config.fade_in)?;
    }

    if let Some(sections) = &doc.sections {
        render_sections(dom, sections, config, fallback_token)?;
    }

    match &doc.contact {
        Some(contact) => {
            set_plain_block(
                page,
                contact.email.as_ref(),
                ids::CONTACT_EMAIL_TITLE,
                ids::CONTACT_EMAIL_TEXT,
            );
            set_plain_block(
                page,
                contact.social.as_ref(),
                ids::CONTACT_SOCIAL_TITLE,
                ids::CONTACT_SOCIAL_TEXT,
            );
            set_plain_block(
                page,
                contact.team.as_ref(),
                ids::CONTACT_TEAM_TITLE,
                ids::CONTACT_TEAM_TEXT,
            );
        }
        None => warn!("content has no contact block, keeping placeholder contact details"),
    }

    match &doc.footer {
        Some(footer) => {
            set_text(page, ids::FOOTER_TEAM, footer.team_name.as_deref());
            set_text(page, ids::FOOTER_COPY, footer.copy.as_deref());
        }
        None => warn!("content has no footer block, keeping placeholder footer"),
    }

    bind_smooth_scroll(dom, config.scroll_offset)?;
    info!("content applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;
    use serde_json::json;

    fn no_token() -> String {
        "zzzzzz".to_string()
    }

    #[test]
    fn scalar_fields_use_text_or_markup() {
        let dom = Rc::new(MemoryDom::new());
        let number = dom.append_text(dom.body(), "span", &[("id", "team-number")], "0000");
        let description = dom.append(dom.body(), "p", &[("id", "hero-description")]);
        let title = dom.append(dom.body(), "h1", &[("id", "hero-title-text")]);

        let doc = ContentDocument::from_value(json!({
            "teamNumber": 4414,
            "heroTitle": "<b>not markup</b>",
            "heroDescription": "Built in <strong>Osaka</strong>",
        }))
        .unwrap();
        render_document(&dom, &doc, &PageConfig::default(), &no_token).unwrap();

        assert_eq!(dom.text(number).as_deref(), Some("4414"));
        assert_eq!(dom.text(title).as_deref(), Some("<b>not markup</b>"));
        assert_eq!(
            dom.inner_html(description).as_deref(),
            Some("Built in <strong>Osaka</strong>")
        );
    }

    #[test]
    fn legacy_about_blocks_apply_independently() {
        let dom = Rc::new(MemoryDom::new());
        let mission_title = dom.append_text(dom.body(), "h3", &[("id", "about-mission-title")], "M");
        let mission_text = dom.append(dom.body(), "p", &[("id", "about-mission-text")]);
        let values_title = dom.append_text(dom.body(), "h3", &[("id", "about-values-title")], "V");

        let doc = ContentDocument::from_value(json!({
            "aboutMission": { "text": "<i>Inspire</i>" },
        }))
        .unwrap();
        render_document(&dom, &doc, &PageConfig::default(), &no_token).unwrap();

        assert_eq!(dom.text(mission_title).as_deref(), Some("M"));
        assert_eq!(dom.inner_html(mission_text).as_deref(), Some("<i>Inspire</i>"));
        assert_eq!(dom.text(values_title).as_deref(), Some("V"));
    }

    #[test]
    fn missing_contact_and_footer_are_skipped() {
        let dom = Rc::new(MemoryDom::new());
        let footer = dom.append_text(dom.body(), "span", &[("id", "footer-team")], "Team");
        let name = dom.append(dom.body(), "span", &[("id", "team-name")]);

        let doc = ContentDocument::from_value(json!({ "teamName": "Gearheads" })).unwrap();
        render_document(&dom, &doc, &PageConfig::default(), &no_token).unwrap();

        assert_eq!(dom.text(name).as_deref(), Some("Gearheads"));
        assert_eq!(dom.text(footer).as_deref(), Some("Team"));
    }

    #[test]
    fn contact_text_is_never_markup() {
        let dom = Rc::new(MemoryDom::new());
        let email = dom.append(dom.body(), "p", &[("id", "contact-email-text")]);
        let doc = ContentDocument::from_value(json!({
            "contact": { "email": { "text": "<a href='mailto:x@y.z'>x@y.z</a>" } },
        }))
        .unwrap();
        render_document(&dom, &doc, &PageConfig::default(), &no_token).unwrap();
        assert_eq!(dom.inner_html(email), None);
        assert_eq!(
            dom.text(email).as_deref(),
            Some("<a href='mailto:x@y.z'>x@y.z</a>")
        );
    }
}
