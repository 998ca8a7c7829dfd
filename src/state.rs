//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Both collaborators are dependency-injected at startup: the LLM client
//! (absent when no credential is configured, which switches every
//! LLM-backed endpoint to its demo fallback) and the snapshot store.

use std::sync::Arc;

use crate::llm::LlmChat;
use crate::services::store::ContextStore;

/// Shared application state. Clone is required by Axum; all inner fields
/// are Arc-backed or clone-cheap.
#[derive(Clone)]
pub struct AppState {
    /// Optional LLM client. `None` when `LLAMA_API_KEY` is not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
    /// Snapshot and live-state persistence.
    pub store: ContextStore,
}

impl AppState {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmChat>>, store: ContextStore) -> Self {
        Self { llm, store }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::llm::types::{ChatResponse, LlmChat, LlmError, Message};
    use std::sync::Mutex;

    /// App state without an LLM, backed by a throwaway data directory.
    /// Keep the returned `TempDir` alive for the duration of the test.
    #[must_use]
    pub fn test_app_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ContextStore::open(dir.path()).expect("store open");
        (AppState::new(None, store), dir)
    }

    /// App state with a mock LLM.
    #[must_use]
    pub fn test_app_state_with_llm(llm: Arc<dyn LlmChat>) -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ContextStore::open(dir.path()).expect("store open");
        (AppState::new(Some(llm), store), dir)
    }

    /// Scripted mock: pops queued results in order, then falls back to a
    /// fixed "done" reply.
    pub struct MockLlm {
        responses: Mutex<Vec<Result<ChatResponse, LlmError>>>,
    }

    impl MockLlm {
        #[must_use]
        pub fn new(responses: Vec<Result<ChatResponse, LlmError>>) -> Self {
            Self { responses: Mutex::new(responses) }
        }

        /// Queue plain-text replies.
        #[must_use]
        pub fn with_texts(texts: &[&str]) -> Self {
            Self::new(texts.iter().map(|t| Ok(text_response(t))).collect())
        }
    }

    #[must_use]
    pub fn text_response(text: &str) -> ChatResponse {
        ChatResponse {
            text: text.to_string(),
            model: "mock".into(),
            stop_reason: "stop".into(),
            input_tokens: 10,
            output_tokens: 5,
        }
    }

    #[async_trait::async_trait]
    impl LlmChat for MockLlm {
        async fn chat(
            &self,
            _model: &str,
            _max_tokens: u32,
            _temperature: f32,
            _messages: &[Message],
        ) -> Result<ChatResponse, LlmError> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(text_response("done"))
            } else {
                responses.remove(0)
            }
        }

        fn default_model(&self) -> &str {
            "mock"
        }
    }
}
