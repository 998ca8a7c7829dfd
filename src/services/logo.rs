//! SVG logo and favicon synthesis.
//!
//! DESIGN
//! ======
//! Five rendering styles and five color palettes, picked at random on every
//! call. Repeated calls over the same markup may produce different visuals;
//! downstream code treats the result as an opaque data URI. The site token
//! comes from the document `<title>` or first `<h1>`, falling back to two
//! random letters.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

pub const DEFAULT_LOGO_SIZE: u32 = 64;

/// Nine shades per palette, darkest first: blue, green, purple, red, orange.
const COLOR_PALETTES: [[&str; 9]; 5] = [
    ["#1a365d", "#2a4365", "#2c5282", "#2b6cb0", "#3182ce", "#4299e1", "#63b3ed", "#90cdf4", "#bee3f8"],
    ["#1c4532", "#22543d", "#276749", "#2f855a", "#38a169", "#48bb78", "#68d391", "#9ae6b4", "#c6f6d5"],
    ["#322659", "#44337a", "#553c9a", "#6b46c1", "#805ad5", "#9f7aea", "#b794f4", "#d6bcfa", "#e9d8fd"],
    ["#742a2a", "#9b2c2c", "#c53030", "#e53e3e", "#f56565", "#fc8181", "#feb2b2", "#fed7d7", "#fff5f5"],
    ["#652b19", "#7b341e", "#9c4221", "#c05621", "#dd6b20", "#ed8936", "#f6ad55", "#fbd38d", "#feebc8"],
];

#[derive(Debug, Clone, Copy)]
enum LogoStyle {
    Geometric,
    Abstract,
    Lettermark,
    Minimalist,
    Gradient,
}

const LOGO_STYLES: [LogoStyle; 5] = [
    LogoStyle::Geometric,
    LogoStyle::Abstract,
    LogoStyle::Lettermark,
    LogoStyle::Minimalist,
    LogoStyle::Gradient,
];

// =============================================================================
// LOGO GENERATION
// =============================================================================

/// Generate an SVG logo with a random style and palette.
///
/// `text` is the display token (1-3 characters); two random uppercase
/// letters are used when absent or empty.
#[must_use]
pub fn generate_svg_logo(text: Option<&str>, size: u32) -> String {
    let mut rng = rand::rng();
    let style = LOGO_STYLES[rng.random_range(0..LOGO_STYLES.len())];
    let palette = COLOR_PALETTES[rng.random_range(0..COLOR_PALETTES.len())];
    let primary = palette[rng.random_range(0..4)];
    let secondary = palette[rng.random_range(0..4) + 5];

    let logo_text = match text {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => random_letters(2),
    };

    match style {
        LogoStyle::Geometric => geometric_logo(&logo_text, primary, secondary, size),
        LogoStyle::Abstract => abstract_logo(&logo_text, primary, secondary, size),
        LogoStyle::Lettermark => lettermark_logo(&logo_text, primary, secondary, size),
        LogoStyle::Minimalist => minimalist_logo(primary, secondary, size),
        LogoStyle::Gradient => gradient_logo(&logo_text, primary, secondary, size),
    }
}

/// Geometric: one solid shape (square, circle, or triangle) behind the text.
fn geometric_logo(text: &str, primary: &str, secondary: &str, size: u32) -> String {
    let s = f64::from(size);
    let mut rng = rand::rng();
    let shapes = [
        format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{primary}" />"#,
            s * 0.2,
            s * 0.2,
            s * 0.6,
            s * 0.6
        ),
        format!(r#"<circle cx="{}" cy="{}" r="{}" fill="{primary}" />"#, s / 2.0, s / 2.0, s * 0.3),
        format!(
            r#"<polygon points="{},{} {},{} {},{}" fill="{primary}" />"#,
            s / 2.0,
            s * 0.2,
            s * 0.2,
            s * 0.8,
            s * 0.8,
            s * 0.8
        ),
    ];
    let shape = &shapes[rng.random_range(0..shapes.len())];

    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {size} {size}\" width=\"{size}\" height=\"{size}\">\n    \
         {shape}\n    \
         <text x=\"{}\" y=\"{}\" font-family=\"Arial, sans-serif\" font-size=\"{}\" font-weight=\"bold\" fill=\"{secondary}\" text-anchor=\"middle\">{text}</text>\n  </svg>",
        s / 2.0,
        s / 2.0 + s * 0.1,
        s * 0.3
    )
}

/// Abstract: two overlapping shapes with white text on top.
fn abstract_logo(text: &str, primary: &str, secondary: &str, size: u32) -> String {
    let s = f64::from(size);
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {size} {size}\" width=\"{size}\" height=\"{size}\">\n    \
         <circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{primary}\" />\n    \
         <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{secondary}\" opacity=\"0.8\" />\n    \
         <text x=\"{}\" y=\"{}\" font-family=\"Arial, sans-serif\" font-size=\"{}\" font-weight=\"bold\" fill=\"#fff\" text-anchor=\"middle\">{text}</text>\n  </svg>",
        s * 0.3,
        s * 0.3,
        s * 0.2,
        s * 0.4,
        s * 0.4,
        s * 0.4,
        s * 0.4,
        s / 2.0,
        s / 2.0,
        s * 0.25
    )
}

/// Lettermark: single uppercase letter in a circle.
fn lettermark_logo(text: &str, primary: &str, secondary: &str, size: u32) -> String {
    let s = f64::from(size);
    let letter: String = text.chars().take(1).collect::<String>().to_uppercase();
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {size} {size}\" width=\"{size}\" height=\"{size}\">\n    \
         <circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{primary}\" />\n    \
         <text x=\"{}\" y=\"{}\" font-family=\"Arial, sans-serif\" font-size=\"{}\" font-weight=\"bold\" fill=\"{secondary}\" text-anchor=\"middle\">{letter}</text>\n  </svg>",
        s / 2.0,
        s / 2.0,
        s * 0.4,
        s / 2.0,
        s / 2.0 + s * 0.15,
        s * 0.4
    )
}

/// Minimalist: three horizontal strokes on a tinted field, no text.
fn minimalist_logo(primary: &str, secondary: &str, size: u32) -> String {
    let s = f64::from(size);
    let lines: Vec<String> = (0..3)
        .map(|i| {
            let y = s * (0.3 + f64::from(i) * 0.2);
            format!(
                r#"<line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="{primary}" stroke-width="{}" />"#,
                s * 0.2,
                s * 0.8,
                s * 0.05
            )
        })
        .collect();

    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {size} {size}\" width=\"{size}\" height=\"{size}\">\n    \
         <rect x=\"0\" y=\"0\" width=\"{size}\" height=\"{size}\" fill=\"{secondary}\" opacity=\"0.1\" />\n    {}\n  </svg>",
        lines.join("\n    ")
    )
}

/// Gradient: full-bleed diagonal gradient with white text.
fn gradient_logo(text: &str, primary: &str, secondary: &str, size: u32) -> String {
    let s = f64::from(size);
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {size} {size}\" width=\"{size}\" height=\"{size}\">\n    \
         <defs>\n      <linearGradient id=\"grad\" x1=\"0%\" y1=\"0%\" x2=\"100%\" y2=\"100%\">\n        \
         <stop offset=\"0%\" stop-color=\"{primary}\" />\n        \
         <stop offset=\"100%\" stop-color=\"{secondary}\" />\n      </linearGradient>\n    </defs>\n    \
         <rect x=\"0\" y=\"0\" width=\"{size}\" height=\"{size}\" fill=\"url(#grad)\" />\n    \
         <text x=\"{}\" y=\"{}\" font-family=\"Arial, sans-serif\" font-size=\"{}\" font-weight=\"bold\" fill=\"white\" text-anchor=\"middle\">{text}</text>\n  </svg>",
        s / 2.0,
        s / 2.0 + s * 0.1,
        s * 0.3
    )
}

/// Random uppercase ASCII letters for fallback logo text.
#[must_use]
pub fn random_letters(count: usize) -> String {
    const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut rng = rand::rng();
    (0..count)
        .map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char)
        .collect()
}

// =============================================================================
// FAVICON
// =============================================================================

/// 32x32 colored square with 1-2 letter initials, as a data URL.
#[must_use]
pub fn generate_favicon_svg(text: &str) -> String {
    let initials = text.chars().take(2).collect::<String>().to_uppercase();
    let svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 32 32\" width=\"32\" height=\"32\">\n    \
         <rect x=\"0\" y=\"0\" width=\"32\" height=\"32\" fill=\"#3182ce\" />\n    \
         <text x=\"16\" y=\"20\" font-family=\"Arial, sans-serif\" font-size=\"16\" font-weight=\"bold\" fill=\"white\" text-anchor=\"middle\">{initials}</text>\n  </svg>"
    );
    svg_to_data_url(&svg)
}

// =============================================================================
// DATA URLS AND SITE NAME
// =============================================================================

/// Percent-encoded `data:image/svg+xml` URI for use in `src`/`href`.
#[must_use]
pub fn svg_to_data_url(svg: &str) -> String {
    format!("data:image/svg+xml;charset=utf-8,{}", urlencoding::encode(svg))
}

static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<title>(.*?)</title>").unwrap());
static H1_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<h1[^>]*>(.*?)</h1>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Derive a 1-3 character display token from the document `<title>` or
/// first `<h1>`; two random letters when neither yields one.
#[must_use]
pub fn extract_site_name_from_html(html: &str) -> String {
    if let Some(caps) = TITLE_RE.captures(html) {
        if let Some(token) = short_token(caps[1].trim()) {
            return token;
        }
    }

    if let Some(caps) = H1_RE.captures(html) {
        let heading = TAG_RE.replace_all(&caps[1], "");
        if let Some(token) = short_token(heading.trim()) {
            return token;
        }
    }

    random_letters(2)
}

/// First word, whole if at most three characters, otherwise its first two.
fn short_token(text: &str) -> Option<String> {
    let first_word = text.split_whitespace().next()?;
    if first_word.chars().count() <= 3 {
        Some(first_word.to_uppercase())
    } else {
        Some(first_word.chars().take(2).collect::<String>().to_uppercase())
    }
}

#[cfg(test)]
#[path = "logo_test.rs"]
mod tests;
