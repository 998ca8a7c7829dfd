//! LLM types — provider-neutral message types and errors.
//!
//! Shared by the Llama client and every caller that builds prompts. The
//! `LlmChat` trait is the seam that keeps route handlers mockable.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The LLM provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl LlmError {
    /// Authentication failures get a distinct user-facing fallback message.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::ApiResponse { status: 401 | 403, .. })
    }

    /// HTTP status of the provider response, when one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiResponse { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// =============================================================================
// MESSAGE CONTENT
// =============================================================================

/// A single part of a multi-part user message (vision requests).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    /// A plain text segment.
    #[serde(rename = "text")]
    Text { text: String },

    /// An inline image, passed as a data URL or remote URL.
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

/// Image reference wrapper matching the provider wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Message content — either plain text or structured parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// A simple string payload.
    Text(String),
    /// A sequence of typed parts (text plus image attachments).
    Parts(Vec<ContentPart>),
}

// =============================================================================
// MESSAGE TYPES
// =============================================================================

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Content,
}

/// Response from an LLM chat call, flattened to the assistant text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
    pub model: String,
    pub stop_reason: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// =============================================================================
// LLM CHAT TRAIT
// =============================================================================

/// Provider-neutral async trait for LLM chat. Enables mocking in tests.
///
/// `model` is explicit on every call so the diagnostics endpoint can probe
/// arbitrary model identifiers; regular callers pass `default_model()`.
#[async_trait::async_trait]
pub trait LlmChat: Send + Sync {
    /// Send a chat request to the LLM provider.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails, the response is
    /// malformed or empty, or the provider rejects the credential.
    async fn chat(
        &self,
        model: &str,
        max_tokens: u32,
        temperature: f32,
        messages: &[Message],
    ) -> Result<ChatResponse, LlmError>;

    /// The model used when the caller has no reason to pick one.
    fn default_model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_matches_401_and_403() {
        assert!(LlmError::ApiResponse { status: 401, body: String::new() }.is_auth_failure());
        assert!(LlmError::ApiResponse { status: 403, body: String::new() }.is_auth_failure());
        assert!(!LlmError::ApiResponse { status: 500, body: String::new() }.is_auth_failure());
        assert!(!LlmError::ApiRequest("timeout".into()).is_auth_failure());
    }

    #[test]
    fn content_text_serializes_as_plain_string() {
        let msg = Message { role: "user".into(), content: Content::Text("hi".into()) };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["content"], "hi");
    }

    #[test]
    fn content_parts_serialize_with_type_tags() {
        let msg = Message {
            role: "user".into(),
            content: Content::Parts(vec![
                ContentPart::Text { text: "look".into() },
                ContentPart::ImageUrl { image_url: ImageUrl { url: "data:image/png;base64,AA==".into() } },
            ]),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert_eq!(json["content"][1]["image_url"]["url"], "data:image/png;base64,AA==");
    }
}
