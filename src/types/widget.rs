//! Embed configuration of a customer site and the lookup tables the widget
//! script uses to turn it into inline styles.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "kebab-case")]
pub enum WidgetPosition {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl WidgetPosition {
    pub const ALL: [Self; 4] = [
        Self::BottomRight,
        Self::BottomLeft,
        Self::TopRight,
        Self::TopLeft,
    ];

    /// Unknown names fall back to `bottom-right`.
    pub fn lookup(raw: &str) -> Self {
        match raw.trim() {
            "bottom-left" => Self::BottomLeft,
            "top-right" => Self::TopRight,
            "top-left" => Self::TopLeft,
            _ => Self::BottomRight,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
            Self::TopRight => "top-right",
            Self::TopLeft => "top-left",
        }
    }

    /// `top`, `right`, `bottom`, `left` offsets of the floating badge.
    pub fn offsets(self) -> [(&'static str, &'static str); 4] {
        match self {
            Self::BottomRight => [
                ("top", "auto"),
                ("right", "20px"),
                ("bottom", "20px"),
                ("left", "auto"),
            ],
            Self::BottomLeft => [
                ("top", "auto"),
                ("right", "auto"),
                ("bottom", "20px"),
                ("left", "20px"),
            ],
            Self::TopRight => [
                ("top", "20px"),
                ("right", "20px"),
                ("bottom", "auto"),
                ("left", "auto"),
            ],
            Self::TopLeft => [
                ("top", "20px"),
                ("right", "auto"),
                ("bottom", "auto"),
                ("left", "20px"),
            ],
        }
    }

    pub fn inline_style(self) -> String {
        self.offsets()
            .iter()
            .map(|(property, value)| format!("{property}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<String> for WidgetPosition {
    fn from(raw: String) -> Self {
        Self::lookup(&raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum WidgetTheme {
    #[default]
    Purple,
    Blue,
    Green,
    Orange,
}

impl WidgetTheme {
    pub const ALL: [Self; 4] = [Self::Purple, Self::Blue, Self::Green, Self::Orange];

    /// Unknown names fall back to `purple`.
    pub fn lookup(raw: &str) -> Self {
        match raw.trim() {
            "blue" => Self::Blue,
            "green" => Self::Green,
            "orange" => Self::Orange,
            _ => Self::Purple,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Purple => "purple",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Orange => "orange",
        }
    }

    pub fn gradient(self) -> &'static str {
        match self {
            Self::Purple => "linear-gradient(135deg, #8b5cf6, #ec4899)",
            Self::Blue => "linear-gradient(135deg, #3b82f6, #06b6d4)",
            Self::Green => "linear-gradient(135deg, #10b981, #34d399)",
            Self::Orange => "linear-gradient(135deg, #f59e0b, #ef4444)",
        }
    }

    pub fn primary(self) -> &'static str {
        match self {
            Self::Purple => "#8b5cf6",
            Self::Blue => "#3b82f6",
            Self::Green => "#10b981",
            Self::Orange => "#f59e0b",
        }
    }
}

impl From<String> for WidgetTheme {
    fn from(raw: String) -> Self {
        Self::lookup(&raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum WidgetAnimation {
    #[default]
    Slide,
    Fade,
    Bounce,
}

impl WidgetAnimation {
    pub const ALL: [Self; 3] = [Self::Slide, Self::Fade, Self::Bounce];

    /// Unknown names fall back to `slide`.
    pub fn lookup(raw: &str) -> Self {
        match raw.trim() {
            "fade" => Self::Fade,
            "bounce" => Self::Bounce,
            _ => Self::Slide,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slide => "slide",
            Self::Fade => "fade",
            Self::Bounce => "bounce",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Slide => "slide-in",
            Self::Fade => "fade-in",
            Self::Bounce => "bounce-in",
        }
    }
}

impl From<String> for WidgetAnimation {
    fn from(raw: String) -> Self {
        Self::lookup(&raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSettings {
    #[serde(default)]
    pub position: WidgetPosition,
    #[serde(default)]
    pub theme: WidgetTheme,
    #[serde(default)]
    pub animation: WidgetAnimation,
    #[serde(default)]
    pub auto_close: bool,
    #[serde(default = "default_show_badge")]
    pub show_badge: bool,
}

fn default_show_badge() -> bool {
    true
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            position: WidgetPosition::default(),
            theme: WidgetTheme::default(),
            animation: WidgetAnimation::default(),
            auto_close: false,
            show_badge: default_show_badge(),
        }
    }
}

/// Partial settings update. Missing fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSettingsPatch {
    pub position: Option<WidgetPosition>,
    pub theme: Option<WidgetTheme>,
    pub animation: Option<WidgetAnimation>,
    pub auto_close: Option<bool>,
    pub show_badge: Option<bool>,
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub user_id: String,
    pub token: String,
    pub domain: Option<String>,
    pub settings: WidgetSettings,
}

impl Widget {
    pub fn apply(&mut self, patch: WidgetSettingsPatch) {
        if let Some(position) = patch.position {
            self.settings.position = position;
        }
        if let Some(theme) = patch.theme {
            self.settings.theme = theme;
        }
        if let Some(animation) = patch.animation {
            self.settings.animation = animation;
        }
        if let Some(auto_close) = patch.auto_close {
            self.settings.auto_close = auto_close;
        }
        if let Some(show_badge) = patch.show_badge {
            self.settings.show_badge = show_badge;
        }
        if let Some(domain) = patch.domain {
            let domain = domain.trim();
            self.domain = (!domain.is_empty()).then(|| domain.to_string());
        }
    }

    /// Whether a `Referer` header plausibly comes from the configured site.
    /// Widgets without a domain accept every referer.
    pub fn matches_referer(&self, referer: &str) -> bool {
        let Some(domain) = self.domain.as_deref() else {
            return true;
        };
        let host = domain
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        referer.contains(host)
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn lookup__should_fall_back_to_defaults_for_unknown_values() {
        // Then
        assert_eq!(WidgetPosition::lookup("center"), WidgetPosition::BottomRight);
        assert_eq!(WidgetTheme::lookup("magenta"), WidgetTheme::Purple);
        assert_eq!(WidgetAnimation::lookup("slide-in"), WidgetAnimation::Slide);
    }

    #[test]
    fn position_inline_style__should_pin_opposite_edges_to_auto() {
        // When
        let style = WidgetPosition::TopLeft.inline_style();

        // Then
        assert_eq!(style, "top: 20px; right: auto; bottom: auto; left: 20px;");
    }

    #[test]
    fn settings__should_deserialize_unknown_names_as_defaults() {
        // Given
        let raw = r#"{"position":"middle","theme":"blue","animation":"spin"}"#;

        // When
        let settings: WidgetSettings = serde_json::from_str(raw).expect("parse settings");

        // Then
        assert_eq!(settings.position, WidgetPosition::BottomRight);
        assert_eq!(settings.theme, WidgetTheme::Blue);
        assert_eq!(settings.animation, WidgetAnimation::Slide);
        assert!(settings.show_badge);
        assert!(!settings.auto_close);
    }

    #[test]
    fn settings__should_serialize_kebab_case_positions() {
        // Given
        let settings = WidgetSettings {
            position: WidgetPosition::TopRight,
            ..Default::default()
        };

        // When
        let json = serde_json::to_value(&settings).expect("serialize settings");

        // Then
        assert_eq!(json["position"], "top-right");
        assert_eq!(json["theme"], "purple");
        assert_eq!(json["animation"], "slide");
        assert_eq!(json["showBadge"], true);
    }

    #[test]
    fn matches_referer__should_ignore_scheme_of_configured_domain() {
        // Given
        let widget = Widget {
            user_id: "user1".to_string(),
            token: "fp_demo".to_string(),
            domain: Some("https://example.com".to_string()),
            settings: WidgetSettings::default(),
        };

        // Then
        assert!(widget.matches_referer("https://example.com/pricing"));
        assert!(!widget.matches_referer("https://other.test/"));
    }
}
