//! Logo and favicon stamping for generated HTML.
//!
//! DESIGN
//! ======
//! Textual pattern substitution over the markup, not HTML parsing. Candidate
//! logo `<img>` tags are matched by class/id naming, by known placeholder
//! image hosts, or by bare/placeholder `src` values inside `<header>`/`<nav>`
//! sections. Replaced tags carry the `generated-logo` sentinel class and a
//! data-URI `src`, both of which exclude them from any later pass. Markup
//! that matches none of the patterns passes through unchanged.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::logo::{
    DEFAULT_LOGO_SIZE, extract_site_name_from_html, generate_favicon_svg, generate_svg_logo, svg_to_data_url,
};

/// Sentinel class marking an `<img>` this module already rewrote.
pub const GENERATED_LOGO_CLASS: &str = "generated-logo";

static LOGO_CLASS_IMG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img[^>]*class="[^"]*\b(?:logo|brand|site-logo|header-logo|navbar-brand-img)\b[^"]*"[^>]*>"#)
        .unwrap()
});
static LOGO_ID_IMG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<img[^>]*id="[^"]*\b(?:logo|brand|site-logo|header-logo)\b[^"]*"[^>]*>"#).unwrap());
static IMG_WITH_SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)<img[^>]*src="([^"]*)"[^>]*>"#).unwrap());
static ALT_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)alt="([^"]*)""#).unwrap());
static HEADER_SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<header[^>]*>.*?</header>").unwrap());
static NAV_SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<nav[^>]*>.*?</nav>").unwrap());

/// `src` URLs pointing at stock placeholder-image services.
static PLACEHOLDER_SRC_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)src="https?://[^"]*logo[^"]*\.(?:png|jpg|jpeg|gif)""#,
        r#"(?i)src="https?://via\.placeholder\.com[^"]*""#,
        r#"(?i)src="https?://placehold\.it[^"]*""#,
        r#"(?i)src="https?://picsum\.photos[^"]*""#,
        r#"(?i)src="https?://unsplash\.it[^"]*""#,
        r#"(?i)src="https?://loremflickr\.com[^"]*""#,
        r#"(?i)src="https?://dummyimage\.com[^"]*""#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

// =============================================================================
// LOGO REPLACEMENT
// =============================================================================

/// Replace candidate logo images with a freshly synthesized SVG data URI.
#[must_use]
pub fn process_html_with_svg_logos(html: &str) -> String {
    let site_name = extract_site_name_from_html(html);
    let logo_url = svg_to_data_url(&generate_svg_logo(Some(&site_name), DEFAULT_LOGO_SIZE));

    let mut processed = html.to_string();

    for pattern in [&*LOGO_CLASS_IMG, &*LOGO_ID_IMG] {
        processed = pattern
            .replace_all(&processed, |caps: &Captures| {
                let tag = &caps[0];
                // Existing SVG or data-URI images are kept as-is.
                if tag.contains(".svg") || tag.contains("data:image") {
                    return tag.to_string();
                }
                let alt = ALT_ATTR
                    .captures(tag)
                    .map_or_else(|| site_name.clone(), |c| c[1].to_string());
                format!(r#"<img src="{logo_url}" alt="{alt}" class="{GENERATED_LOGO_CLASS}" />"#)
            })
            .into_owned();
    }

    let replacement = format!(r#"src="{logo_url}""#);
    for pattern in PLACEHOLDER_SRC_PATTERNS.iter() {
        processed = pattern
            .replace_all(&processed, replacement.as_str())
            .into_owned();
    }

    processed = patch_section_logo(&processed, &HEADER_SECTION, &logo_url, &site_name);
    processed = patch_section_logo(&processed, &NAV_SECTION, &logo_url, &site_name);

    processed
}

/// Rewrite at most one bare/placeholder logo image per matched section.
fn patch_section_logo(html: &str, section: &Regex, logo_url: &str, site_name: &str) -> String {
    section
        .replace_all(html, |caps: &Captures| {
            let segment = &caps[0];
            let mut patched = false;
            IMG_WITH_SRC
                .replace_all(segment, |img: &Captures| {
                    let tag = &img[0];
                    if patched || tag.contains(GENERATED_LOGO_CLASS) {
                        return tag.to_string();
                    }
                    let src = &img[1];
                    if src.contains("logo") || src.contains("placeholder") || src.contains("dummy") || src == "#" || src.is_empty() {
                        patched = true;
                        format!(r#"<img src="{logo_url}" alt="{site_name} logo" class="{GENERATED_LOGO_CLASS}" />"#)
                    } else {
                        tag.to_string()
                    }
                })
                .into_owned()
        })
        .into_owned()
}

// =============================================================================
// FAVICON
// =============================================================================

/// Insert a synthesized SVG favicon before `</head>` when no icon link
/// exists. Idempotent: a second pass sees the inserted link and returns the
/// input unchanged.
#[must_use]
pub fn add_favicon_if_missing(html: &str) -> String {
    if html.contains(r#"<link rel="icon""#)
        || html.contains(r#"<link rel="shortcut icon""#)
        || html.contains(r#"<link rel="apple-touch-icon""#)
    {
        return html.to_string();
    }

    let site_name = extract_site_name_from_html(html);
    let favicon_url = generate_favicon_svg(&site_name);
    let link = format!(r#"<link rel="icon" href="{favicon_url}" type="image/svg+xml">"#);

    html.replacen("</head>", &format!("  {link}\n</head>"), 1)
}

/// Full decoration pass: logos, then favicon. Empty input passes through.
#[must_use]
pub fn process_generated_html(html: &str) -> String {
    if html.is_empty() {
        return html.to_string();
    }
    add_favicon_if_missing(&process_html_with_svg_logos(html))
}

#[cfg(test)]
#[path = "htmlpatch_test.rs"]
mod tests;
