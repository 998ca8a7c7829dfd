//! Chat proxy route.
//!
//! Forwards the conversation to the LLM with a context-aware system prompt,
//! extracts any HTML fragment from the reply, and degrades to demo-mode
//! payloads on every upstream failure. Nothing here returns a 5xx for an
//! LLM problem: the worst case is an apologetic message in the transcript.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::llm::types::{Content, Message};
use crate::services::extract::extract_code_from_response;
use crate::services::prompts::{ChatContext, chat_system_prompt, modification_prompt, modification_system_prompt};
use crate::services::workspace::now_ms;
use crate::state::AppState;

const CHAT_MAX_TOKENS: u32 = 2048;
const CHAT_TEMPERATURE: f32 = 0.7;

const DEMO_MESSAGE: &str = "I'm currently in demo mode. In production, I can help you modify the \
    generated HTML, answer questions about web development, or assist with any other requests!";
const AUTH_FAILURE_MESSAGE: &str = "API key issue detected. I'm in demo mode - in production, I could \
    help you modify HTML, answer questions, or assist with web development!";
const ERROR_FALLBACK_MESSAGE: &str = "I encountered an error but I'm here to help! What would you like \
    to know about web development or the generated HTML?";

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
    pub context: Option<ChatContext>,
    /// Focused code-modification turn: the final user message is treated as
    /// the change request against this code.
    pub modification: Option<ModificationTarget>,
}

#[derive(Deserialize)]
pub struct IncomingMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ModificationTarget {
    pub original_code: String,
    pub language: String,
}

#[derive(Serialize)]
pub struct ChatApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo: Option<bool>,
    pub timestamp: i64,
}

// =============================================================================
// HANDLER
// =============================================================================

/// `POST /api/chat` — forward a conversation turn to the LLM.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatApiResponse>, (StatusCode, Json<Value>)> {
    if body.messages.is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "error": "No messages provided" }))));
    }

    let Some(llm) = state.llm.clone() else {
        info!("chat: no LLM configured, returning demo response");
        return Ok(Json(demo_reply(DEMO_MESSAGE, None)));
    };

    info!(message_count = body.messages.len(), modification = body.modification.is_some(), "chat: processing request");

    let system = match &body.modification {
        Some(target) => modification_system_prompt(&target.language),
        None => chat_system_prompt(body.context.as_ref()),
    };
    let mut messages = vec![Message { role: "system".into(), content: Content::Text(system) }];
    messages.extend(
        body.messages
            .iter()
            .map(|m| Message { role: m.role.clone(), content: Content::Text(m.content.clone()) }),
    );

    // In modification mode the final user message becomes the change request
    // wrapped around the target code.
    if let Some(target) = &body.modification {
        if let Some(last) = messages.iter_mut().rev().find(|m| m.role == "user") {
            if let Content::Text(request) = &last.content {
                let wrapped = modification_prompt(&target.original_code, request, &target.language);
                last.content = Content::Text(wrapped);
            }
        }
    }

    match llm
        .chat(llm.default_model(), CHAT_MAX_TOKENS, CHAT_TEMPERATURE, &messages)
        .await
    {
        Ok(response) => {
            let extracted = extract_code_from_response(&response.text);
            if extracted.html.is_some() {
                info!("chat: HTML code detected in response");
            }
            Ok(Json(ChatApiResponse {
                success: true,
                message: response.text,
                generated_html: extracted.html,
                error: None,
                demo: None,
                timestamp: now_ms(),
            }))
        }
        Err(e) => {
            warn!(error = %e, "chat: upstream call failed");
            if e.is_auth_failure() {
                Ok(Json(demo_reply(AUTH_FAILURE_MESSAGE, Some("API authentication failed".to_string()))))
            } else {
                Ok(Json(demo_reply(ERROR_FALLBACK_MESSAGE, Some(e.to_string()))))
            }
        }
    }
}

fn demo_reply(message: &str, error: Option<String>) -> ChatApiResponse {
    ChatApiResponse {
        success: error.is_none(),
        message: message.to_string(),
        generated_html: None,
        error,
        demo: Some(true),
        timestamp: now_ms(),
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
