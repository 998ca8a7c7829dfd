use super::*;
use crate::state::test_helpers::{MockLlm, test_app_state, test_app_state_with_llm};
use std::sync::Arc;

// =========================================================================
// /api/test-key
// =========================================================================

#[tokio::test]
async fn test_key_without_credential_reports_error() {
    let (state, _dir) = test_app_state();
    let response = test_key(State(state)).await;
    assert_eq!(response.0["status"], "error");
    assert!(
        response.0["message"]
            .as_str()
            .unwrap()
            .contains("LLAMA_API_KEY")
    );
    assert!(response.0["solution"].as_str().is_some());
}

#[tokio::test]
async fn test_key_probes_every_candidate_model() {
    // Every probe (text + vision) succeeds against the scripted mock.
    let mock = Arc::new(MockLlm::with_texts(&[]));
    let (state, _dir) = test_app_state_with_llm(mock);
    let response = test_key(State(state)).await;

    assert_eq!(response.0["status"], "completed");
    let results = response.0["results"].as_array().unwrap();
    assert_eq!(results.len(), CANDIDATE_MODELS.len());
    assert!(results.iter().all(|r| r["status"] == "success"));

    let working = response.0["working_models"].as_array().unwrap();
    assert_eq!(working.len(), CANDIDATE_MODELS.len());

    let vision = response.0["vision_results"].as_array().unwrap();
    assert_eq!(vision.len(), CANDIDATE_MODELS.len());
    assert!(vision.iter().all(|v| v["vision_support"] == true));
}

#[tokio::test]
async fn test_key_reports_failing_models() {
    use crate::llm::types::LlmError;
    // First probe fails, the rest succeed.
    let mut responses: Vec<Result<_, LlmError>> =
        vec![Err(LlmError::ApiResponse { status: 400, body: "no such model".into() })];
    responses.extend((1..CANDIDATE_MODELS.len()).map(|_| Ok(crate::state::test_helpers::text_response("OK"))));
    let mock = Arc::new(MockLlm::new(responses));
    let (state, _dir) = test_app_state_with_llm(mock);

    let response = test_key(State(state)).await;
    let results = response.0["results"].as_array().unwrap();
    assert_eq!(results[0]["status"], "error");
    assert!(results[0]["error"].as_str().is_some());
    let working = response.0["working_models"].as_array().unwrap();
    assert_eq!(working.len(), CANDIDATE_MODELS.len() - 1);
}

// =========================================================================
// /api/test-svg
// =========================================================================

#[tokio::test]
async fn test_svg_renders_a_preview_page() {
    let page = test_svg(Query(TestSvgParams { text: Some("AB".into()) })).await;
    assert!(page.0.starts_with("<!DOCTYPE html>"));
    assert!(page.0.contains("SVG Logo Generator Test"));
    assert!(page.0.contains("data:image/svg+xml"));
    assert!(page.0.contains("value=\"AB\""));
    // The raw SVG source is shown escaped.
    assert!(page.0.contains("&lt;svg"));
    // The page itself gets the favicon pass.
    assert!(page.0.contains("<link rel=\"icon\""));
}

#[tokio::test]
async fn test_svg_defaults_text_to_test() {
    let page = test_svg(Query(TestSvgParams { text: None })).await;
    assert!(page.0.contains("value=\"TEST\""));
}

#[tokio::test]
async fn test_svg_shows_processed_sample_without_placeholder_host() {
    let page = test_svg(Query(TestSvgParams { text: None })).await;
    let processed_section = page.0.split("Processed HTML:").nth(1).unwrap();
    assert!(processed_section.contains("generated-logo"));
}

// =========================================================================
// escape_html
// =========================================================================

#[test]
fn escape_html_neutralizes_angle_brackets() {
    assert_eq!(escape_html("<svg viewBox=\"0 0 1 1\"></svg>"), "&lt;svg viewBox=\"0 0 1 1\"&gt;&lt;/svg&gt;");
}
