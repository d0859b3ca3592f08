/// Where the page looks for its editable content, relative to the page URL.
pub fn get_content_url() -> &'static str {
    "content.json"
}

/// Element identifiers shared with the page markup. Renaming any of these
/// breaks the binding with `index.html`.
pub mod ids {
    pub const TEAM_NUMBER: &str = "team-number";
    pub const TEAM_NAME: &str = "team-name";
    pub const HERO_TITLE: &str = "hero-title-text";
    pub const HERO_SUBTITLE: &str = "hero-subtitle";
    pub const HERO_DESCRIPTION: &str = "hero-description";

    pub const ABOUT_TITLE: &str = "about-title";
    pub const ABOUT_MISSION_TITLE: &str = "about-mission-title";
    pub const ABOUT_MISSION_TEXT: &str = "about-mission-text";
    pub const ABOUT_VALUES_TITLE: &str = "about-values-title";
    pub const ABOUT_VALUES_TEXT: &str = "about-values-text";
    pub const ABOUT_GOALS_TITLE: &str = "about-goals-title";
    pub const ABOUT_GOALS_TEXT: &str = "about-goals-text";
    pub const ABOUT_CONTENT: &str = "about-content";

    pub const OUTREACH_GRID: &str = "outreach-grid";
    pub const SECTIONS_ROOT: &str = "sections-root";

    pub const CONTACT_EMAIL_TITLE: &str = "contact-email-title";
    pub const CONTACT_EMAIL_TEXT: &str = "contact-email-text";
    pub const CONTACT_SOCIAL_TITLE: &str = "contact-social-title";
    pub const CONTACT_SOCIAL_TEXT: &str = "contact-social-text";
    pub const CONTACT_TEAM_TITLE: &str = "contact-team-title";
    pub const CONTACT_TEAM_TEXT: &str = "contact-team-text";

    pub const FOOTER_TEAM: &str = "footer-team";
    pub const FOOTER_COPY: &str = "footer-copy";
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavbarStyle {
    pub background: String,
    pub box_shadow: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavbarConfig {
    /// Vertical scroll offset above which the navbar switches to `scrolled`.
    pub threshold: f64,
    pub scrolled: NavbarStyle,
    pub resting: NavbarStyle,
}

/// Options for the one-shot reveal of statically present cards.
#[derive(Debug, Clone, PartialEq)]
pub struct FadeInConfig {
    pub selectors: Vec<String>,
    pub threshold: f64,
    pub root_margin: String,
    pub hidden_transform: String,
    pub transition: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub content_url: String,
    /// Distance kept between the viewport top and an anchor's target.
    pub scroll_offset: f64,
    pub navbar_selector: String,
    pub nav_menu_selector: String,
    pub navbar: NavbarConfig,
    pub fade_in: FadeInConfig,
    /// Nav label for sections without a title.
    pub section_nav_fallback: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            content_url: get_content_url().to_string(),
            scroll_offset: 80.0,
            navbar_selector: ".navbar".to_string(),
            nav_menu_selector: ".nav-menu".to_string(),
            navbar: NavbarConfig {
                threshold: 50.0,
                scrolled: NavbarStyle {
                    background: "rgba(255, 255, 255, 0.98)".to_string(),
                    box_shadow: "0 2px 30px rgba(0, 0, 0, 0.15)".to_string(),
                },
                resting: NavbarStyle {
                    background: "rgba(255, 255, 255, 0.95)".to_string(),
                    box_shadow: "0 2px 20px rgba(0, 0, 0, 0.1)".to_string(),
                },
            },
            fade_in: FadeInConfig {
                selectors: [".about-card", ".outreach-card", ".robot-info", ".contact-item"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                threshold: 0.1,
                root_margin: "0px 0px -50px 0px".to_string(),
                hidden_transform: "translateY(30px)".to_string(),
                transition: "opacity 0.6s ease, transform 0.6s ease".to_string(),
            },
            section_nav_fallback: "セクション".to_string(),
        }
    }
}
