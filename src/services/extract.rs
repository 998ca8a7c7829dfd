//! Fenced-code extraction from LLM chat replies.
//!
//! DESIGN
//! ======
//! Heuristic first-match-wins scanning over markdown fences. A block only
//! counts as code when its content passes a shape check (tag pair for HTML,
//! brace pair for CSS, a declaration keyword for JS), which keeps prose-only
//! fences from being misread as code. Known limitations, kept on purpose for
//! compatibility with the upstream prompt contract: nested or unbalanced
//! fences confuse the scan, and only the first HTML-shaped block is used.

use once_cell::sync::Lazy;
use regex::Regex;

/// Substituted when a reply contains code but no surrounding prose.
pub const DEFAULT_EXPLANATION: &str = "Here's the modified code as requested.";

static HTML_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(?:html)?\n?(.*?)```").unwrap());
static CSS_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```css\n?(.*?)```").unwrap());
static JS_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(?:js|javascript)\n?(.*?)```").unwrap());
static ANY_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(.*?)```").unwrap());
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(?:html|css|js|javascript)?\n?.*?```").unwrap());

const JS_KEYWORDS: [&str; 4] = ["function", "const", "let", "var"];

/// Code fragments recovered from one LLM reply, plus the remaining prose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedCode {
    pub html: Option<String>,
    pub css: Option<String>,
    pub js: Option<String>,
    pub explanation: Option<String>,
}

impl ExtractedCode {
    /// Whether any code fragment was recovered.
    #[must_use]
    pub fn has_code(&self) -> bool {
        self.html.is_some() || self.css.is_some() || self.js.is_some()
    }
}

/// Recover labeled code fragments and explanation prose from one reply.
///
/// Pure function of the input: no side effects, no I/O, deterministic.
#[must_use]
pub fn extract_code_from_response(response: &str) -> ExtractedCode {
    let mut result = ExtractedCode::default();
    if response.is_empty() {
        return result;
    }

    if let Some(caps) = HTML_BLOCK.captures(response) {
        let code = caps[1].trim();
        if code.contains('<') && code.contains('>') {
            result.html = Some(code.to_string());
        }
    }

    if let Some(caps) = CSS_BLOCK.captures(response) {
        let code = caps[1].trim();
        if code.contains('{') && code.contains('}') {
            result.css = Some(code.to_string());
        }
    }

    if let Some(caps) = JS_BLOCK.captures(response) {
        let code = caps[1].trim();
        if JS_KEYWORDS.iter().any(|kw| code.contains(kw)) {
            result.js = Some(code.to_string());
        }
    }

    // Second pass: an HTML document may hide in a block tagged with some
    // other label. Take the first block whose content is HTML-shaped.
    if result.html.is_none() {
        for caps in ANY_BLOCK.captures_iter(response) {
            let content = caps[1].trim();
            if looks_like_html(content) {
                result.html = Some(content.to_string());
                break;
            }
        }
    }

    let explanation = FENCED_BLOCK
        .split(response)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    if explanation.is_empty() {
        if result.has_code() {
            result.explanation = Some(DEFAULT_EXPLANATION.to_string());
        }
    } else {
        result.explanation = Some(explanation);
    }

    result
}

fn looks_like_html(content: &str) -> bool {
    content.contains("<html")
        || content.contains("<!DOCTYPE html")
        || (content.contains('<') && content.contains("</") && content.contains('>'))
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
