use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static COLOR_SCHEME_META: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta name="color-scheme"[^>]*>\s*"#).expect("valid regex"));
static SUPPORTED_SCHEMES_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta name="supported-color-schemes"[^>]*>\s*"#).expect("valid regex")
});
static DARK_MODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)/\* DARK MODE START \*/.*?/\* DARK MODE END \*/\s*").expect("valid regex")
});

/// Removes color-scheme meta tags and the marked dark-mode CSS block.
pub fn strip_dark_mode_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let html = COLOR_SCHEME_META.replace_all(html, "");
    let html = SUPPORTED_SCHEMES_META.replace_all(&html, "");
    DARK_MODE_BLOCK.replace_all(&html, "").into_owned()
}

/// Color scheme forced onto the dashboard preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

const DARK_PREVIEW_CSS: &str = ":root { color-scheme: dark !important; } \
body, .body-bg, .container-bg { background-color: #121212 !important; color: #f1f1f1 !important; } \
h1,h2,h3,h4,p,li,div { color: #f1f1f1 !important; }";

const LIGHT_PREVIEW_CSS: &str = ":root { color-scheme: light !important; } \
body, .body-bg, .container-bg { background-color: #ffffff !important; color: #1a1a1a !important; } \
h1,h2,h3,h4,p,li,div { color: #1a1a1a !important; } \
@media (prefers-color-scheme: dark) { * { color-scheme: light !important; } }";

/// Injects a preview-only style override before `</head>`, or prepends it
/// when the document has no head.
pub fn apply_preview_overrides(html: &str, theme: ThemeMode) -> String {
    if html.is_empty() {
        return String::new();
    }
    let css = match theme {
        ThemeMode::Dark => DARK_PREVIEW_CSS,
        ThemeMode::Light => LIGHT_PREVIEW_CSS,
    };
    let style = format!("<style id='preview-theme-override'>{}</style>", css);
    if html.contains("</head>") {
        html.replacen("</head>", &format!("{}</head>", style), 1)
    } else {
        format!("{}{}", style, html)
    }
}
