//! Llama chat-completions API client.
//!
//! Thin HTTP wrapper over the provider's `/chat/completions` endpoint.
//! Pure parsing in `parse_response` for testability. The native response
//! shape carries the assistant reply under `completion_message`, with
//! `content` being either a plain string or a `{type: "text", text}` object.

use serde_json::Value;
use std::time::Duration;

use super::config::LlmTimeouts;
use super::types::{ChatResponse, LlmError, Message};

// =============================================================================
// CLIENT
// =============================================================================

pub struct LlamaClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl LlamaClient {
    /// Build the HTTP client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::HttpClientBuild`] if the reqwest client fails.
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url })
    }

    /// Send one chat-completions request and parse the reply.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] on transport failure, non-200 status, or an
    /// unparseable/empty completion.
    pub async fn chat(
        &self,
        model: &str,
        max_tokens: u32,
        temperature: f32,
        messages: &[Message],
    ) -> Result<ChatResponse, LlmError> {
        let body = ApiRequest { model, max_completion_tokens: max_tokens, temperature, messages };
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }

        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_completion_tokens: u32,
    temperature: f32,
    messages: &'a [Message],
}

// =============================================================================
// PARSING
// =============================================================================

pub(crate) fn parse_response(json_text: &str) -> Result<ChatResponse, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let Some(completion) = root.get("completion_message") else {
        return Err(LlmError::ApiParse("missing completion_message".to_string()));
    };

    let text = completion_text(completion);
    if text.trim().is_empty() {
        return Err(LlmError::ApiParse("empty completion content".to_string()));
    }

    let model = root
        .get("model")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default();
    let stop_reason = completion
        .get("stop_reason")
        .and_then(Value::as_str)
        .unwrap_or("stop")
        .to_string();
    let (input_tokens, output_tokens) = parse_token_usage(&root);

    Ok(ChatResponse { text, model, stop_reason, input_tokens, output_tokens })
}

/// `content` is a bare string in some responses and `{type, text}` in others.
fn completion_text(completion: &Value) -> String {
    match completion.get("content") {
        Some(Value::String(s)) => s.clone(),
        Some(obj) => obj
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        None => String::new(),
    }
}

/// Token counts arrive either as a `usage` object or a `metrics` array of
/// `{metric, value}` entries. Missing counts default to zero.
fn parse_token_usage(root: &Value) -> (u64, u64) {
    if let Some(usage) = root.get("usage") {
        let input = usage
            .get("prompt_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let output = usage
            .get("completion_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        return (input, output);
    }

    let mut input = 0;
    let mut output = 0;
    if let Some(metrics) = root.get("metrics").and_then(Value::as_array) {
        for entry in metrics {
            let value = entry
                .get("value")
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
                .max(0.0) as u64;
            match entry.get("metric").and_then(Value::as_str) {
                Some("num_prompt_tokens") => input = value,
                Some("num_completion_tokens") => output = value,
                _ => {}
            }
        }
    }
    (input, output)
}
