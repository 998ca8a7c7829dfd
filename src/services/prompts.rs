//! Prompt assembly for the chat and generation pipelines.
//!
//! DESIGN
//! ======
//! The chat system prompt has three variants, picked from the request
//! context: active-file editing, whole-document editing (generated HTML),
//! and the generic web-development assistant. Each variant appends the
//! saved-snapshot listing when snapshots exist, plus the modification rules
//! that make replies parseable by the code extractor (complete code, fenced
//! blocks, explanation).

use std::fmt::Write;

use serde::Deserialize;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::llm::types::{Content, ContentPart, ImageUrl, Message};
use crate::services::workspace::FileRelationship;

// =============================================================================
// REQUEST CONTEXT
// =============================================================================

/// Project context shipped alongside a chat request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatContext {
    pub current_file: Option<CurrentFile>,
    #[serde(default)]
    pub project_files: Vec<ProjectFileInfo>,
    #[serde(default)]
    pub file_relationships: Vec<FileRelationship>,
    #[serde(default)]
    pub saved_contexts: Vec<SavedContextInfo>,
    pub generated_html: Option<String>,
}

/// The file open in the editor when the user asked the question.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentFile {
    pub name: String,
    pub language: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectFileInfo {
    pub name: String,
    pub language: String,
    #[serde(default)]
    pub is_active: bool,
}

/// Summary line for one saved snapshot, shown to the model.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedContextInfo {
    pub name: String,
    pub timestamp: i64,
    pub file_count: usize,
}

// =============================================================================
// CHAT SYSTEM PROMPT
// =============================================================================

const MODIFICATION_RULES: &str = "When the user asks for modifications:\n\
    1. Provide the COMPLETE modified code, not just snippets\n\
    2. Include ALL the original code with your changes\n\
    3. Wrap HTML, CSS, or JS code in appropriate code blocks like ```html, ```css, or ```js\n\
    4. Explain what changes you made\n\n\
    You can help the user understand, modify, or improve any of these files, or assist with any other questions.";

const GENERIC_ASSISTANT: &str = "You are a helpful AI assistant specialized in web development and HTML/CSS. \
    You can help with code generation, modifications, explanations, and general web development questions. \
    When providing HTML code, always wrap it in ```html code blocks.";

/// Build the system prompt for one chat request.
#[must_use]
pub fn chat_system_prompt(context: Option<&ChatContext>) -> String {
    let Some(context) = context else {
        return GENERIC_ASSISTANT.to_string();
    };

    if let Some(file) = &context.current_file {
        return current_file_prompt(file, context);
    }
    if let Some(html) = &context.generated_html {
        return generated_html_prompt(html, context);
    }

    let mut prompt = GENERIC_ASSISTANT.to_string();
    push_saved_contexts(&mut prompt, &context.saved_contexts);
    prompt
}

fn current_file_prompt(file: &CurrentFile, context: &ChatContext) -> String {
    let mut prompt = String::from(
        "You are a helpful AI assistant specialized in web development. \
         The user is working on a web project with the following files:\n\n",
    );

    let _ = writeln!(prompt, "CURRENT ACTIVE FILE: {} ({})", file.name, file.language.to_uppercase());
    let _ = writeln!(prompt, "```{}\n{}\n```\n", file.language, file.content);

    let others: Vec<&ProjectFileInfo> = context
        .project_files
        .iter()
        .filter(|f| !f.is_active)
        .collect();
    if !others.is_empty() {
        prompt.push_str("OTHER PROJECT FILES:\n");
        for other in others {
            let _ = writeln!(prompt, "- {} ({})", other.name, other.language.to_uppercase());
        }
        prompt.push('\n');
    }

    if !context.file_relationships.is_empty() {
        prompt.push_str("FILE RELATIONSHIPS:\n");
        for rel in &context.file_relationships {
            let _ = write!(prompt, "- {} links to ", rel.html_file);
            if !rel.linked_css_files.is_empty() {
                let _ = write!(prompt, "CSS: {} ", rel.linked_css_files.join(", "));
            }
            if !rel.linked_js_files.is_empty() {
                let _ = write!(prompt, "JS: {}", rel.linked_js_files.join(", "));
            }
            prompt.push('\n');
        }
        prompt.push('\n');
    }

    push_saved_contexts(&mut prompt, &context.saved_contexts);
    prompt.push_str(MODIFICATION_RULES);
    prompt
}

fn generated_html_prompt(html: &str, context: &ChatContext) -> String {
    let mut prompt = format!(
        "You are a helpful AI assistant specialized in web development. The user has previously \
         generated HTML code from an image. Here is the current HTML code for reference:\n\n{html}\n\n"
    );

    push_saved_contexts(&mut prompt, &context.saved_contexts);
    prompt.push_str(
        "When the user asks for modifications:\n\
         1. Provide the COMPLETE modified HTML code, not just snippets\n\
         2. Include ALL the original code with your changes\n\
         3. Wrap the HTML in a code block with ```html and ```\n\
         4. Explain what changes you made\n\n\
         You can help the user understand, modify, or improve this code, or assist with any other questions.",
    );
    prompt
}

fn push_saved_contexts(prompt: &mut String, saved: &[SavedContextInfo]) {
    if saved.is_empty() {
        return;
    }
    prompt.push_str("SAVED CONTEXTS:\n");
    for ctx in saved {
        let _ = writeln!(prompt, "- {} ({}, {} files)", ctx.name, format_timestamp(ctx.timestamp), ctx.file_count);
    }
    prompt.push_str(
        "\nThe user can save the current state of their project as a \"context\" and restore it later.\n\
         If the user asks about saving the current context, tell them they can use the \"Save Context\" \
         button at the top of the IDE.\n\
         If they ask about restoring a context, tell them they can use the \"Load Context\" button.\n\n",
    );
}

fn format_timestamp(ms: i64) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute] UTC");
    OffsetDateTime::from_unix_timestamp(ms / 1000)
        .ok()
        .and_then(|dt| dt.format(format).ok())
        .unwrap_or_else(|| ms.to_string())
}

// =============================================================================
// CODE MODIFICATION PROMPTS
// =============================================================================

/// User-message wrapper that asks for a complete modified document.
#[must_use]
pub fn modification_prompt(original_code: &str, request: &str, language: &str) -> String {
    format!(
        "I want you to modify the following {} code according to this request: \"{request}\"\n\n\
         Here's the original code:\n\n\
         ```{language}\n{original_code}\n```\n\n\
         Please provide the complete modified code wrapped in a ```{language} code block, followed by \
         a brief explanation of the changes you made.\n\
         Make sure to include ALL of the original code with your changes, not just the modified parts.\n\
         If you're unsure about any aspect, maintain the original structure and only make the specific \
         changes requested.",
        language.to_uppercase()
    )
}

/// System prompt for focused code-modification turns.
#[must_use]
pub fn modification_system_prompt(language: &str) -> String {
    format!(
        "You are an expert web developer specializing in {} modifications.\n\
         When modifying code:\n\
         1. ALWAYS return the COMPLETE code with your changes, not just snippets\n\
         2. Wrap your code in ```{language} code blocks\n\
         3. Preserve the overall structure of the original code\n\
         4. Only make the specific changes requested\n\
         5. Provide a brief explanation of what you changed and why\n\
         6. If the request is unclear, ask clarifying questions\n\n\
         For HTML modifications specifically:\n\
         - Maintain correct HTML structure\n\
         - Keep existing CSS classes unless explicitly asked to change them\n\
         - Preserve any JavaScript event handlers\n\
         - Ensure the document remains valid HTML\n\n\
         For CSS modifications:\n\
         - Keep the existing style structure\n\
         - Only modify the specific styles mentioned\n\
         - Use the same naming conventions as the original\n\n\
         For JavaScript modifications:\n\
         - Maintain the existing code structure\n\
         - Preserve variable names and function signatures\n\
         - Add clear comments for new functionality",
        language.to_uppercase()
    )
}

// =============================================================================
// GENERATION PIPELINE PROMPTS
// =============================================================================

/// Stage 1: vision analysis of the uploaded screenshot.
#[must_use]
pub fn analysis_messages(image_data_url: &str) -> Vec<Message> {
    vec![
        Message {
            role: "system".into(),
            content: Content::Text(
                "You are an expert web designer and analyst. Analyze the provided website screenshot \
                 carefully and describe its layout, components, design elements, colors, typography, \
                 and overall structure in detail."
                    .into(),
            ),
        },
        Message {
            role: "user".into(),
            content: Content::Parts(vec![
                ContentPart::Text {
                    text: "Please analyze this website screenshot and describe its design, layout, \
                           components, and visual elements in detail."
                        .into(),
                },
                ContentPart::ImageUrl { image_url: ImageUrl { url: image_data_url.to_string() } },
            ]),
        },
    ]
}

/// Stage 2: code generation from the stage-1 analysis text.
#[must_use]
pub fn code_generation_messages(analysis: &str) -> Vec<Message> {
    let code_prompt = format!(
        "Based on this detailed image analysis, generate a complete, responsive HTML page with \
         inline CSS that exactly matches the design:\n\n\
         ANALYSIS:\n{analysis}\n\n\
         REQUIREMENTS:\n\
         - Generate a complete HTML document with DOCTYPE, head, and body\n\
         - Include Tailwind CSS via CDN for styling\n\
         - Make it responsive and mobile-friendly\n\
         - Match the exact colors, layout, typography, and content from the image\n\
         - Include all text content, buttons, forms, and interactive elements seen in the image\n\
         - Use semantic HTML5 elements\n\
         - Ensure clean, professional code structure\n\
         - Make it pixel-perfect to match the original design\n\n\
         OUTPUT FORMAT:\n\
         Return ONLY the complete HTML code, nothing else. No explanations, no markdown code blocks, \
         just the raw HTML.\n\n\
         Generate the HTML now:"
    );

    vec![
        Message {
            role: "system".into(),
            content: Content::Text(
                "You are an expert front-end developer who creates pixel-perfect HTML/CSS code from \
                 design specifications. Always output clean, semantic HTML with proper styling."
                    .into(),
            ),
        },
        Message { role: "user".into(), content: Content::Text(code_prompt) },
    ]
}

#[cfg(test)]
#[path = "prompts_test.rs"]
mod tests;
