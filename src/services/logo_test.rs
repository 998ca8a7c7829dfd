use super::*;

// =========================================================================
// extract_site_name_from_html
// =========================================================================

#[test]
fn site_name_short_title_used_whole() {
    let html = "<html><head><title>Zed Editor</title></head></html>";
    assert_eq!(extract_site_name_from_html(html), "ZED");
}

#[test]
fn site_name_long_title_truncated_to_two() {
    let html = "<html><head><title>Fantastic Bakery</title></head></html>";
    assert_eq!(extract_site_name_from_html(html), "FA");
}

#[test]
fn site_name_falls_back_to_h1() {
    let html = "<body><h1 class=\"hero\">Acme <span>Corp</span></h1></body>";
    assert_eq!(extract_site_name_from_html(html), "AC");
}

#[test]
fn site_name_random_letters_when_unparseable() {
    let name = extract_site_name_from_html("<body><p>no title here</p></body>");
    assert_eq!(name.chars().count(), 2);
    assert!(name.chars().all(|c| c.is_ascii_uppercase()));
}

// =========================================================================
// generate_svg_logo
// =========================================================================

#[test]
fn logo_is_svg_markup_at_requested_size() {
    let svg = generate_svg_logo(Some("AB"), 64);
    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(svg.contains("viewBox=\"0 0 64 64\""));
    assert!(svg.contains("width=\"64\""));
    assert!(svg.trim_end().ends_with("</svg>"));
}

#[test]
fn logo_text_defaults_to_random_letters() {
    // No text supplied: the minimalist style renders no text at all, every
    // other style embeds a letter. Either way the markup must be an SVG.
    let svg = generate_svg_logo(None, 48);
    assert!(svg.contains("viewBox=\"0 0 48 48\""));
}

#[test]
fn random_letters_are_uppercase_ascii() {
    let letters = random_letters(3);
    assert_eq!(letters.chars().count(), 3);
    assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
}

// =========================================================================
// data URLs
// =========================================================================

#[test]
fn data_url_is_percent_encoded() {
    let url = svg_to_data_url("<svg></svg>");
    assert!(url.starts_with("data:image/svg+xml;charset=utf-8,"));
    assert!(url.contains("%3Csvg%3E"));
    assert!(!url.contains('<'));
}

// =========================================================================
// generate_favicon_svg
// =========================================================================

#[test]
fn favicon_uses_two_letter_uppercase_initials() {
    let url = generate_favicon_svg("acme");
    assert!(url.starts_with("data:image/svg+xml;charset=utf-8,"));
    let decoded = urlencoding::decode(&url).unwrap();
    assert!(decoded.contains(">AC</text>"));
    assert!(decoded.contains("width=\"32\""));
    assert!(decoded.contains("#3182ce"));
}

#[test]
fn favicon_handles_single_character() {
    let url = generate_favicon_svg("x");
    let decoded = urlencoding::decode(&url).unwrap();
    assert!(decoded.contains(">X</text>"));
}
