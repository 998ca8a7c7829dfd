//! Diagnostic endpoints for the upstream credential and the SVG pipeline.
//!
//! `/api/test-key` probes a fixed list of candidate model identifiers to
//! report which are callable and which accept image input. `/api/test-svg`
//! renders a preview page exercising the logo generator and the HTML
//! decoration pass. Both are operator tools, not product surface.

use axum::extract::{Query, State};
use axum::response::{Html, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::llm::config::key_preview;
use crate::llm::types::{Content, ContentPart, ImageUrl, Message};
use crate::services::htmlpatch::{add_favicon_if_missing, process_html_with_svg_logos};
use crate::services::logo::{DEFAULT_LOGO_SIZE, generate_svg_logo, svg_to_data_url};
use crate::services::workspace::now_ms;
use crate::state::AppState;

const PROBE_MAX_TOKENS: u32 = 64;
const PROBE_TEMPERATURE: f32 = 0.0;

/// Candidate upstream models: vision-capable first, then text-only.
const CANDIDATE_MODELS: [&str; 8] = [
    "Llama-4-Maverick-17B-128E-Instruct-FP8",
    "Llama-4-Scout-17B-16E-Instruct-FP8",
    "meta/llama-3.2-11b-vision-instruct",
    "meta/llama-3.2-90b-vision-instruct",
    "llama-3.2-11b-vision-instruct",
    "meta/llama-3.1-8b-instruct",
    "meta/llama-3.1-70b-instruct",
    "llama-3.1-8b-instruct",
];

/// 1x1 red pixel PNG used as the vision probe payload.
const RED_PIXEL_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8/5+hHgAHggJ/PchI7wAAAABJRU5ErkJggg==";

// =============================================================================
// /api/test-key
// =============================================================================

#[derive(Serialize)]
struct ModelProbe {
    model: &'static str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct VisionProbe {
    model: &'static str,
    vision_support: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// `GET /api/test-key` — probe which candidate models the credential can call.
pub async fn test_key(State(state): State<AppState>) -> Json<Value> {
    let Some(llm) = state.llm.clone() else {
        return Json(json!({
            "status": "error",
            "message": "LLAMA_API_KEY not found in environment variables",
            "solution": "Add LLAMA_API_KEY to your .env file",
        }));
    };

    let preview = std::env::var("LLAMA_API_KEY")
        .map(|key| key_preview(&key))
        .unwrap_or_else(|_| "****".to_string());

    let mut results = Vec::with_capacity(CANDIDATE_MODELS.len());
    let mut working_models = Vec::new();

    for model in CANDIDATE_MODELS {
        info!(model, "test-key: probing model");
        let messages =
            [Message { role: "user".into(), content: Content::Text("Hello, respond with just \"OK\"".into()) }];
        match llm
            .chat(model, PROBE_MAX_TOKENS, PROBE_TEMPERATURE, &messages)
            .await
        {
            Ok(response) => {
                working_models.push(model);
                results.push(ModelProbe { model, status: "success", response: Some(response.text), error: None });
            }
            Err(e) => {
                results.push(ModelProbe { model, status: "error", response: None, error: Some(e.to_string()) });
            }
        }
    }

    let mut vision_results = Vec::with_capacity(working_models.len());
    for model in working_models.iter().copied() {
        info!(model, "test-key: probing vision support");
        let messages = [Message {
            role: "user".into(),
            content: Content::Parts(vec![
                ContentPart::Text { text: "What color is this image? Answer with just the color name.".into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: format!("data:image/png;base64,{RED_PIXEL_PNG_BASE64}") },
                },
            ]),
        }];
        match llm
            .chat(model, PROBE_MAX_TOKENS, PROBE_TEMPERATURE, &messages)
            .await
        {
            Ok(response) => {
                vision_results.push(VisionProbe {
                    model,
                    vision_support: true,
                    response: Some(response.text),
                    error: None,
                });
            }
            Err(e) => {
                vision_results.push(VisionProbe {
                    model,
                    vision_support: false,
                    response: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    Json(json!({
        "status": "completed",
        "message": "Model testing completed",
        "key_preview": preview,
        "results": results,
        "working_models": working_models,
        "vision_results": vision_results,
        "timestamp": now_ms(),
    }))
}

// =============================================================================
// /api/test-svg
// =============================================================================

#[derive(Deserialize)]
pub struct TestSvgParams {
    pub text: Option<String>,
}

/// `GET /api/test-svg?text=` — HTML preview of the logo generator output.
pub async fn test_svg(Query(params): Query<TestSvgParams>) -> Html<String> {
    let text = params.text.unwrap_or_else(|| "TEST".to_string());
    let svg = generate_svg_logo(Some(&text), DEFAULT_LOGO_SIZE);
    let data_url = svg_to_data_url(&svg);

    let sample = r#"
            <img src="https://via.placeholder.com/150" alt="Placeholder" class="logo" />
            <h4>Company Name</h4>
          "#;
    let processed_sample = process_html_with_svg_logos(sample);

    let page = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>SVG Logo Test</title>
  <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-100 min-h-screen flex flex-col items-center justify-center p-4">
  <div class="max-w-3xl w-full bg-white p-8 rounded-lg shadow-md">
    <h1 class="text-3xl font-bold text-center mb-8">SVG Logo Generator Test</h1>

    <div class="grid grid-cols-1 md:grid-cols-2 gap-8">
      <div class="flex flex-col items-center">
        <h2 class="text-xl font-semibold mb-4">Raw SVG (64px)</h2>
        <div class="bg-gray-200 p-4 rounded-lg flex items-center justify-center" style="min-height: 150px;">
          {svg}
        </div>
        <div class="mt-4 bg-gray-100 p-4 rounded-lg w-full overflow-auto">
          <pre class="text-xs">{escaped_svg}</pre>
        </div>
      </div>

      <div class="flex flex-col items-center">
        <h2 class="text-xl font-semibold mb-4">As Image (data URL)</h2>
        <div class="bg-gray-200 p-4 rounded-lg flex items-center justify-center" style="min-height: 150px;">
          <img src="{data_url}" alt="Generated Logo" class="w-32 h-32" />
        </div>

        <div class="mt-8">
          <h3 class="text-lg font-medium mb-2">Different Sizes:</h3>
          <div class="flex items-center justify-center gap-4">
            <img src="{data_url}" alt="Logo" class="w-16 h-16" />
            <img src="{data_url}" alt="Logo" class="w-32 h-32" />
            <img src="{data_url}" alt="Logo" class="w-48 h-48" />
          </div>
        </div>
      </div>
    </div>

    <div class="mt-12">
      <h2 class="text-xl font-semibold mb-4">Try with different text:</h2>
      <form class="flex gap-2">
        <input type="text" name="text" value="{text}"
               class="flex-1 px-4 py-2 border border-gray-300 rounded-lg" />
        <button type="submit"
                class="px-4 py-2 bg-blue-600 text-white rounded-lg hover:bg-blue-700">
          Generate
        </button>
      </form>
    </div>
  </div>

  <div class="mt-8 max-w-3xl w-full bg-white p-8 rounded-lg shadow-md">
    <h2 class="text-xl font-semibold mb-4">HTML with logo and favicon processing:</h2>
    <p class="mb-4">Original HTML header has placeholder logo, processed version uses SVG:</p>

    <div class="flex gap-4 overflow-x-auto">
      <div class="bg-gray-100 p-4 rounded flex-1 min-w-[300px]">
        <h3 class="font-medium mb-2">Original HTML:</h3>
        <div class="bg-gray-200 p-4 rounded">{sample}</div>
      </div>

      <div class="bg-gray-100 p-4 rounded flex-1 min-w-[300px]">
        <h3 class="font-medium mb-2">Processed HTML:</h3>
        <div class="bg-gray-200 p-4 rounded">{processed_sample}</div>
      </div>
    </div>
  </div>
</body>
</html>"#,
        escaped_svg = escape_html(&svg),
    );

    Html(add_favicon_if_missing(&page))
}

fn escape_html(markup: &str) -> String {
    markup.replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
#[path = "diagnostics_test.rs"]
mod tests;
