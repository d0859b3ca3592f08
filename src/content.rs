use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ContentError;

/// Markup written by the site maintainers and injected without escaping.
///
/// Only the fields typed as `TrustedHtml` reach `innerHTML`; every other
/// string is set as plain text. The content file is not user submitted, so
/// no sanitising happens here. `verify-content` flags script-like markup
/// before it is published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedHtml(String);

impl TrustedHtml {
    pub fn new(markup: impl Into<String>) -> Self {
        TrustedHtml(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The whole editable payload of the page. Every field is optional and an
/// absent field leaves the matching element untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDocument {
    #[serde(default, deserialize_with = "text")]
    pub team_number: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub hero_title: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub hero_subtitle: Option<String>,
    #[serde(default, deserialize_with = "trusted")]
    pub hero_description: Option<TrustedHtml>,

    #[serde(default, deserialize_with = "text")]
    pub about_title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub about: Option<CardGroup>,
    #[serde(default, deserialize_with = "lenient")]
    pub about_mission: Option<RichBlock>,
    #[serde(default, deserialize_with = "lenient")]
    pub about_values: Option<RichBlock>,
    #[serde(default, deserialize_with = "lenient")]
    pub about_goals: Option<RichBlock>,

    #[serde(default, deserialize_with = "lenient")]
    pub outreach: Option<CardGroup>,
    #[serde(default, deserialize_with = "section_list")]
    pub sections: Option<Vec<Section>>,

    #[serde(default, deserialize_with = "lenient")]
    pub contact: Option<Contact>,
    #[serde(default, deserialize_with = "lenient")]
    pub footer: Option<Footer>,
}

impl ContentDocument {
    pub fn from_json(body: &str) -> Result<Self, ContentError> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ContentError> {
        if !value.is_object() {
            return Err(ContentError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Card list for the about block, if the document uses the card form.
    /// When present it replaces the legacy mission/values/goals fields.
    pub fn about_cards(&self) -> Option<&[Card]> {
        self.about.as_ref().and_then(|about| about.cards.as_deref())
    }

    pub fn outreach_cards(&self) -> Option<&[Card]> {
        self.outreach.as_ref().and_then(|outreach| outreach.cards.as_deref())
    }
}

/// `{ "cards": [...] }` wrapper used by `about` and `outreach`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CardGroup {
    #[serde(default, deserialize_with = "card_list")]
    pub cards: Option<Vec<Card>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(default, deserialize_with = "text")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "trusted")]
    pub text: Option<TrustedHtml>,
    #[serde(default, deserialize_with = "text")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default, deserialize_with = "text")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub nav_position: Option<String>,
    #[serde(default, deserialize_with = "nav_index")]
    pub nav_index: Option<i64>,
    #[serde(default, deserialize_with = "card_list")]
    pub cards: Option<Vec<Card>>,
}

/// Where a section's generated nav entry goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPlacement {
    Start,
    Index(i64),
    End,
}

impl Section {
    pub fn placement(&self) -> NavPlacement {
        if self.nav_position.as_deref() == Some("start") {
            return NavPlacement::Start;
        }
        match self.nav_index {
            Some(index) => NavPlacement::Index(index),
            None => NavPlacement::End,
        }
    }

    pub fn cards(&self) -> &[Card] {
        self.cards.as_deref().unwrap_or_default()
    }
}

/// Title plus a body that may carry markup (legacy about blocks).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RichBlock {
    #[serde(default, deserialize_with = "text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "trusted")]
    pub text: Option<TrustedHtml>,
}

/// Title plus a plain-text body (contact entries).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlainBlock {
    #[serde(default, deserialize_with = "text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Contact {
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<PlainBlock>,
    #[serde(default, deserialize_with = "lenient")]
    pub social: Option<PlainBlock>,
    #[serde(default, deserialize_with = "lenient")]
    pub team: Option<PlainBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footer {
    #[serde(default, deserialize_with = "text")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub copy: Option<String>,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn trusted<'de, D>(deserializer: D) -> Result<Option<TrustedHtml>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).map(TrustedHtml))
}

/// Objects of the wrong shape are treated as missing instead of failing the
/// whole document.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

fn lenient_list<T>(value: Value) -> Option<Vec<T>>
where
    T: DeserializeOwned + Default,
{
    match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or_default())
                .collect(),
        ),
        _ => None,
    }
}

fn card_list<'de, D>(deserializer: D) -> Result<Option<Vec<Card>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_list(Value::deserialize(deserializer)?))
}

fn section_list<'de, D>(deserializer: D) -> Result<Option<Vec<Section>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_list(Value::deserialize(deserializer)?))
}

fn nav_index<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let index = match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> ContentDocument {
        ContentDocument::from_value(value).expect("document should parse")
    }

    #[test]
    fn empty_object_is_all_absent() {
        assert_eq!(parse(json!({})), ContentDocument::default());
    }

    #[test]
    fn non_object_documents_are_rejected() {
        assert!(matches!(
            ContentDocument::from_json("[1, 2]"),
            Err(ContentError::NotAnObject)
        ));
        assert!(matches!(
            ContentDocument::from_json("null"),
            Err(ContentError::NotAnObject)
        ));
        assert!(matches!(
            ContentDocument::from_json("{ not json"),
            Err(ContentError::Parse(_))
        ));
    }

    #[test]
    fn numeric_team_number_becomes_text() {
        let doc = parse(json!({ "teamNumber": 1234, "teamName": "Gearheads" }));
        assert_eq!(doc.team_number.as_deref(), Some("1234"));
        assert_eq!(doc.team_name.as_deref(), Some("Gearheads"));
    }

    #[test]
    fn null_and_structured_scalars_are_absent() {
        let doc = parse(json!({ "heroTitle": null, "heroSubtitle": { "x": 1 } }));
        assert_eq!(doc.hero_title, None);
        assert_eq!(doc.hero_subtitle, None);
    }

    #[test]
    fn about_cards_are_exposed_only_for_arrays() {
        let doc = parse(json!({ "about": { "cards": [{ "title": "Build" }] } }));
        let cards = doc.about_cards().expect("cards present");
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title.as_deref(), Some("Build"));

        let doc = parse(json!({ "about": { "cards": "nope" } }));
        assert!(doc.about_cards().is_none());
    }

    #[test]
    fn malformed_list_items_become_empty_cards() {
        let doc = parse(json!({ "outreach": { "cards": ["oops", { "icon": "🎓" }] } }));
        let cards = doc.outreach_cards().expect("cards present");
        assert_eq!(cards[0], Card::default());
        assert_eq!(cards[1].icon.as_deref(), Some("🎓"));
    }

    #[test]
    fn card_text_is_trusted_markup() {
        let doc = parse(json!({ "outreach": { "cards": [{ "text": "<b>hi</b>" }] } }));
        let text = doc.outreach_cards().unwrap()[0].text.clone().unwrap();
        assert_eq!(text.as_str(), "<b>hi</b>");
    }

    #[test]
    fn nav_index_accepts_numbers_and_numeric_strings() {
        let doc = parse(json!({ "sections": [
            { "navIndex": 2 },
            { "navIndex": "3" },
            { "navIndex": " -1 " },
            { "navIndex": 2.0 },
            { "navIndex": 1.7 },
            { "navIndex": "two" },
            { "navIndex": true },
        ]}));
        let indexes: Vec<_> = doc.sections.unwrap().iter().map(|s| s.nav_index).collect();
        assert_eq!(
            indexes,
            vec![Some(2), Some(3), Some(-1), Some(2), None, None, None]
        );
    }

    #[test]
    fn start_position_wins_over_index() {
        let section = Section {
            nav_position: Some("start".into()),
            nav_index: Some(4),
            ..Section::default()
        };
        assert_eq!(section.placement(), NavPlacement::Start);

        let section = Section {
            nav_position: Some("end".into()),
            nav_index: Some(4),
            ..Section::default()
        };
        assert_eq!(section.placement(), NavPlacement::Index(4));
        assert_eq!(Section::default().placement(), NavPlacement::End);
    }

    #[test]
    fn contact_and_footer_parse_nested_fields() {
        let doc = parse(json!({
            "contact": { "email": { "title": "Email", "text": "team@example.org" } },
            "footer": { "teamName": "Gearheads", "copy": "© 2024" }
        }));
        let contact = doc.contact.unwrap();
        assert_eq!(contact.email.unwrap().text.as_deref(), Some("team@example.org"));
        assert!(contact.social.is_none());
        assert_eq!(doc.footer.unwrap().copy.as_deref(), Some("© 2024"));
    }
}
