//! Pre-publish checks for a site directory: required files, JSON shape and
//! script-like strings that would run once injected as markup.

use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::content::ContentDocument;
use crate::sections::stable_key;

pub const REQUIRED_FILES: [&str; 3] = ["index.html", "styles.css", "content.json"];
pub const REQUIRED_KEYS: [&str; 4] = ["teamName", "heroTitle", "heroDescription", "footer"];
const UNSAFE_MARKERS: [&str; 4] = ["<script", "javascript:", "onerror=", "onload="];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "{}", self.message),
            Severity::Warning => write!(f, "warning: {}", self.message),
        }
    }
}

fn is_unsafe(text: &str) -> bool {
    let lower = text.to_lowercase();
    UNSAFE_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn walk(value: &Value, path: &str, findings: &mut Vec<Finding>) {
    match value {
        Value::String(text) if is_unsafe(text) => {
            let preview: String = text.chars().take(80).collect();
            findings.push(Finding::error(format!("Unsafe content at {}: {:?}", path, preview)));
        }
        Value::Object(map) => {
            for (key, child) in map {
                walk(child, &format!("{}/{}", path, key), findings);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                walk(child, &format!("{}[{}]", path, i), findings);
            }
        }
        _ => {}
    }
}

fn check_card_array(data: &Value, group: &str, findings: &mut Vec<Finding>) {
    if let Some(cards) = data.get(group).and_then(|g| g.get("cards")) {
        if !cards.is_array() {
            findings.push(Finding::error(format!("{}.cards should be an array", group)));
        }
    }
}

/// Sections whose anchor would come from a random token on every load.
fn check_section_keys(data: &Value, findings: &mut Vec<Finding>) {
    let sections = match ContentDocument::from_value(data.clone()) {
        Ok(doc) => doc.sections.unwrap_or_default(),
        Err(e) => {
            findings.push(Finding::error(format!("content.json: {}", e)));
            return;
        }
    };
    for (i, section) in sections.iter().enumerate() {
        if stable_key(section).is_none() {
            findings.push(Finding::warning(format!(
                "sections[{}] has no key and its title gives no anchor, its link changes on every load",
                i
            )));
        }
    }
}

/// Checks a parsed `content.json`.
pub fn check_content(data: &Value) -> Vec<Finding> {
    let mut findings = Vec::new();
    if !data.is_object() {
        findings.push(Finding::error("content.json: top-level should be an object"));
        return findings;
    }
    for key in REQUIRED_KEYS {
        if data.get(key).is_none() {
            findings.push(Finding::error(format!("content.json: missing key {}", key)));
        }
    }
    check_card_array(data, "outreach", &mut findings);
    check_card_array(data, "about", &mut findings);
    if data.get("contact").is_none() {
        findings.push(Finding::warning("content.json: no contact block, placeholders stay visible"));
    }
    check_section_keys(data, &mut findings);
    walk(data, "content.json", &mut findings);
    findings
}

/// Checks a site directory: required files, then `content.json` itself.
pub fn verify_site(root: &Path) -> Vec<Finding> {
    let mut findings = Vec::new();
    for file in REQUIRED_FILES {
        if !root.join(file).exists() {
            findings.push(Finding::error(format!("Missing file: {}", file)));
        }
    }
    let parsed = fs::read_to_string(root.join("content.json"))
        .map_err(|e| e.to_string())
        .and_then(|body| serde_json::from_str::<Value>(&body).map_err(|e| e.to_string()));
    match parsed {
        Ok(data) => findings.extend(check_content(&data)),
        Err(e) => findings.push(Finding::error(format!("content.json parse error: {}", e))),
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn errors(findings: &[Finding]) -> Vec<String> {
        findings
            .iter()
            .filter(|f| f.is_error())
            .map(|f| f.message.clone())
            .collect()
    }

    fn complete() -> Value {
        json!({
            "teamName": "Gearheads",
            "heroTitle": "Hello",
            "heroDescription": "We build <em>robots</em>",
            "footer": { "copy": "©" },
            "contact": {},
        })
    }

    #[test]
    fn complete_document_passes() {
        assert!(check_content(&complete()).is_empty());
    }

    #[test]
    fn reports_missing_keys_and_bad_arrays() {
        let data = json!({ "teamName": "x", "outreach": { "cards": {} } });
        let found = errors(&check_content(&data));
        assert!(found.contains(&"content.json: missing key heroTitle".to_string()));
        assert!(found.contains(&"content.json: missing key footer".to_string()));
        assert!(found.contains(&"outreach.cards should be an array".to_string()));
        assert!(!found.iter().any(|m| m.contains("teamName")));
    }

    #[test]
    fn finds_script_like_strings_with_paths() {
        let mut data = complete();
        data["about"] = json!({ "cards": [{ "text": "<img src=x OnError=alert(1)>" }] });
        data["heroTitle"] = json!("<SCRIPT>alert(1)</SCRIPT>");
        let found = errors(&check_content(&data));
        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|m| m.starts_with("Unsafe content at content.json/about/cards[0]/text")));
        assert!(found.iter().any(|m| m.starts_with("Unsafe content at content.json/heroTitle")));
    }

    #[test]
    fn unstable_section_anchors_are_warnings() {
        let mut data = complete();
        data["sections"] = json!([
            { "title": "チーム" },
            { "title": "Team", "cards": [] },
            { "key": "crew" },
            { "title": 2024 },
            { "key": { "name": "crew" } },
        ]);
        let findings = check_content(&data);
        assert!(errors(&findings).is_empty());
        let warned: Vec<_> = findings
            .iter()
            .filter(|f| !f.is_error())
            .map(|f| f.message.split(' ').next().unwrap_or_default())
            .collect();
        assert_eq!(warned, vec!["sections[0]", "sections[4]"]);
    }

    #[test]
    fn non_object_top_level_is_an_error() {
        let found = errors(&check_content(&json!([1, 2])));
        assert_eq!(found, vec!["content.json: top-level should be an object".to_string()]);
    }

    #[test]
    fn site_directory_checks_files_and_content() {
        let dir = tempfile::tempdir().expect("create tempdir");
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::write(dir.path().join("content.json"), "{ broken").unwrap();

        let found = errors(&verify_site(dir.path()));
        assert!(found.contains(&"Missing file: styles.css".to_string()));
        assert!(found.iter().any(|m| m.starts_with("content.json parse error")));

        fs::write(dir.path().join("styles.css"), "body {}").unwrap();
        fs::write(dir.path().join("content.json"), complete().to_string()).unwrap();
        assert!(verify_site(dir.path()).is_empty());
    }
}
