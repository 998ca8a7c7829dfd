//! Screenshot-to-HTML generation route.
//!
//! DESIGN
//! ======
//! Two-stage upstream pipeline: a vision call describes the uploaded
//! screenshot, then a text call turns that analysis into a full HTML
//! document. Any upstream failure at either stage collapses into the demo
//! document with the failure reason carried in `message` — the endpoint
//! never surfaces an LLM error as a 5xx. The final document gets the logo
//! and favicon decoration pass before it is returned.

use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::llm::types::LlmError;
use crate::services::htmlpatch::process_generated_html;
use crate::services::prompts::{analysis_messages, code_generation_messages};
use crate::services::workspace::now_ms;
use crate::state::AppState;

const VALID_IMAGE_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// Anything shorter than this cannot be a usable document; treated as a
/// soft failure that triggers the demo fallback.
const MIN_GENERATED_HTML_LEN: usize = 100;

const ANALYSIS_MAX_TOKENS: u32 = 2048;
const ANALYSIS_TEMPERATURE: f32 = 0.1;
const CODE_MAX_TOKENS: u32 = 4096;
const CODE_TEMPERATURE: f32 = 0.7;

static FENCE_HTML: Lazy<Regex> = Lazy::new(|| Regex::new("```html\n?").unwrap());
static FENCE: Lazy<Regex> = Lazy::new(|| Regex::new("```\n?").unwrap());

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub html: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing: Option<ProcessingTimes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: i64,
}

#[derive(Serialize)]
pub struct ProcessingTimes {
    pub analysis_time_ms: u128,
    pub code_time_ms: u128,
    pub total_time_ms: u128,
}

struct UploadedImage {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

// =============================================================================
// HANDLER
// =============================================================================

/// `POST /api/generate-html` — generate a website from an uploaded screenshot.
pub async fn generate_html(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, (StatusCode, Json<Value>)> {
    let started = Instant::now();

    let Some(image) = read_image_field(multipart).await? else {
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "error": "No image uploaded" }))));
    };
    if !VALID_IMAGE_TYPES.contains(&image.content_type.as_str()) {
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "error": "Please upload a PNG or JPG image" }))));
    }

    let Some(llm) = state.llm.clone() else {
        info!(filename = %image.filename, "generate: no LLM configured, returning demo HTML");
        return Ok(Json(demo_response(&image.filename, None)));
    };

    info!(filename = %image.filename, size = image.bytes.len(), "generate: processing image");
    let encoded = BASE64.encode(&image.bytes);
    let data_url = format!("data:{};base64,{}", image.content_type, encoded);

    // Stage 1: vision analysis of the screenshot.
    let analysis_started = Instant::now();
    let analysis = match llm
        .chat(llm.default_model(), ANALYSIS_MAX_TOKENS, ANALYSIS_TEMPERATURE, &analysis_messages(&data_url))
        .await
    {
        Ok(response) => response.text,
        Err(e) => {
            warn!(error = %e, "generate: image analysis failed");
            return Ok(Json(demo_response(&image.filename, Some(demo_reason(&e)))));
        }
    };
    let analysis_time_ms = analysis_started.elapsed().as_millis();
    info!(analysis_time_ms, "generate: image analysis completed");

    // Stage 2: HTML generation from the analysis text.
    let code_started = Instant::now();
    let generated = match llm
        .chat(llm.default_model(), CODE_MAX_TOKENS, CODE_TEMPERATURE, &code_generation_messages(&analysis))
        .await
    {
        Ok(response) => strip_code_fences(&response.text),
        Err(e) => {
            warn!(error = %e, "generate: code generation failed");
            return Ok(Json(demo_response(&image.filename, Some("Code generation failed - using demo mode".into()))));
        }
    };
    let code_time_ms = code_started.elapsed().as_millis();

    if generated.len() < MIN_GENERATED_HTML_LEN {
        warn!(len = generated.len(), "generate: generated HTML too short, falling back to demo");
        return Ok(Json(demo_response(
            &image.filename,
            Some("Generated HTML validation failed - using demo mode".into()),
        )));
    }

    let html = process_generated_html(&generated);
    let total_time_ms = started.elapsed().as_millis();
    info!(total_time_ms, "generate: website generation completed");

    Ok(Json(GenerateResponse {
        success: true,
        html,
        filename: image.filename,
        file_size: Some(image.bytes.len()),
        analysis: Some(analysis),
        processing: Some(ProcessingTimes { analysis_time_ms, code_time_ms, total_time_ms }),
        demo: None,
        message: None,
        timestamp: now_ms(),
    }))
}

async fn read_image_field(mut multipart: Multipart) -> Result<Option<UploadedImage>, (StatusCode, Json<Value>)> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))))?;
        let Some(field) = field else {
            return Ok(None);
        };
        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().unwrap_or("unknown.jpg").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))))?;
        return Ok(Some(UploadedImage { filename, content_type, bytes: bytes.to_vec() }));
    }
}

// =============================================================================
// FALLBACK MAPPING
// =============================================================================

/// Strip stray markdown fences some replies wrap around the document.
fn strip_code_fences(text: &str) -> String {
    let without_html = FENCE_HTML.replace_all(text, "");
    FENCE.replace_all(&without_html, "").trim().to_string()
}

/// User-facing reason string for a stage-1 failure.
fn demo_reason(error: &LlmError) -> String {
    match error.status() {
        Some(500..=599) => "Llama API server error - using demo mode".to_string(),
        Some(401 | 403) => "API key authentication failed - check your LLAMA_API_KEY".to_string(),
        Some(400) => "API request error - using demo mode".to_string(),
        _ => "API error - using demo mode".to_string(),
    }
}

fn demo_response(filename: &str, message: Option<String>) -> GenerateResponse {
    let message = message.unwrap_or_else(|| "Demo response - Configure LLAMA_API_KEY for AI generation".to_string());
    GenerateResponse {
        success: true,
        html: demo_html(filename, &message),
        filename: filename.to_string(),
        file_size: None,
        analysis: None,
        processing: None,
        demo: Some(true),
        message: Some(message),
        timestamp: now_ms(),
    }
}

/// Canned document returned when the upstream pipeline is unavailable.
fn demo_html(filename: &str, message: &str) -> String {
    DEMO_HTML_TEMPLATE
        .replace("__DEMO_MESSAGE__", message)
        .replace("__FILENAME__", filename)
}

const DEMO_HTML_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Generated Website - Demo</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <script>
        tailwind.config = {
            theme: {
                extend: {
                    colors: {
                        primary: '#3B82F6',
                        secondary: '#8B5CF6'
                    }
                }
            }
        }
    </script>
</head>
<body class="bg-gray-50 font-sans">
    <!-- Demo Notice -->
    <div class="bg-amber-100 border-l-4 border-amber-500 text-amber-700 p-4">
        <div class="flex">
            <div class="py-1">
                <svg class="fill-current h-6 w-6 text-amber-500 mr-4" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 20 20"><path d="M2.93 17.07A10 10 0 1 1 17.07 2.93 10 10 0 0 1 2.93 17.07zm12.73-1.41A8 8 0 1 0 4.34 4.34a8 8 0 0 0 11.32 11.32zM9 11V9h2v6H9v-4zm0-6h2v2H9V5z"/></svg>
            </div>
            <div>
                <p class="font-bold">Demo Mode Active</p>
                <p class="text-sm">__DEMO_MESSAGE__ Generated from: <strong>__FILENAME__</strong></p>
            </div>
        </div>
    </div>

    <!-- Header -->
    <header class="bg-white shadow-lg">
        <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8">
            <div class="flex justify-between items-center py-6 md:justify-start md:space-x-10">
                <div class="flex justify-start lg:w-0 lg:flex-1">
                    <span class="text-2xl font-bold text-gray-900">WebsiteGen</span>
                </div>
                <nav class="hidden md:flex space-x-10">
                    <a href="#" class="text-base font-medium text-gray-500 hover:text-gray-900">Home</a>
                    <a href="#" class="text-base font-medium text-gray-500 hover:text-gray-900">Features</a>
                    <a href="#" class="text-base font-medium text-gray-500 hover:text-gray-900">About</a>
                    <a href="#" class="text-base font-medium text-gray-500 hover:text-gray-900">Contact</a>
                </nav>
                <div class="hidden md:flex items-center justify-end md:flex-1 lg:w-0">
                    <button class="bg-primary text-white px-6 py-2 rounded-lg hover:bg-blue-700 transition-colors">
                        Get Started
                    </button>
                </div>
            </div>
        </div>
    </header>

    <!-- Hero Section -->
    <main class="flex-1">
        <div class="bg-gradient-to-r from-primary to-secondary">
            <div class="max-w-7xl mx-auto py-16 px-4 sm:py-24 sm:px-6 lg:px-8">
                <div class="text-center">
                    <h1 class="text-4xl font-extrabold text-white sm:text-5xl md:text-6xl">
                        AI-Powered Website Generation
                    </h1>
                    <p class="mt-3 max-w-md mx-auto text-base text-blue-100 sm:text-lg md:mt-5 md:text-xl md:max-w-3xl">
                        Transform your design images into fully functional, responsive websites using advanced AI technology.
                    </p>
                    <div class="mt-5 max-w-md mx-auto sm:flex sm:justify-center md:mt-8">
                        <button class="bg-white text-primary px-8 py-3 rounded-lg font-semibold hover:bg-gray-100 transition-colors shadow-lg">
                            Upload Your Design
                        </button>
                    </div>
                </div>
            </div>
        </div>

        <!-- Features Section -->
        <div class="py-16 bg-white">
            <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8">
                <div class="lg:text-center">
                    <h2 class="text-base text-primary font-semibold tracking-wide uppercase">Features</h2>
                    <p class="mt-2 text-3xl leading-8 font-extrabold tracking-tight text-gray-900 sm:text-4xl">
                        Everything you need to generate websites
                    </p>
                </div>

                <div class="mt-10">
                    <div class="space-y-10 md:space-y-0 md:grid md:grid-cols-3 md:gap-x-8 md:gap-y-10">
                        <div class="relative">
                            <div class="absolute flex items-center justify-center h-12 w-12 rounded-md bg-primary text-white">
                                <svg class="h-6 w-6" fill="none" viewBox="0 0 24 24" stroke="currentColor">
                                    <path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M4 16l4.586-4.586a2 2 0 012.828 0L16 16m-2-2l1.586-1.586a2 2 0 012.828 0L20 14m-6-6h.01M6 20h12a2 2 0 002-2V6a2 2 0 00-2-2H6a2 2 0 00-2 2v12a2 2 0 002 2z" />
                                </svg>
                            </div>
                            <p class="ml-16 text-lg leading-6 font-medium text-gray-900">AI Image Analysis</p>
                            <p class="mt-2 ml-16 text-base text-gray-500">
                                Advanced computer vision to understand your design layouts, colors, and components.
                            </p>
                        </div>

                        <div class="relative">
                            <div class="absolute flex items-center justify-center h-12 w-12 rounded-md bg-primary text-white">
                                <svg class="h-6 w-6" fill="none" viewBox="0 0 24 24" stroke="currentColor">
                                    <path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M10 20l4-16m4 4l4 4-4 4M6 16l-4-4 4-4" />
                                </svg>
                            </div>
                            <p class="ml-16 text-lg leading-6 font-medium text-gray-900">Clean Code Generation</p>
                            <p class="mt-2 ml-16 text-base text-gray-500">
                                Generates semantic HTML with modern CSS and responsive design principles.
                            </p>
                        </div>

                        <div class="relative">
                            <div class="absolute flex items-center justify-center h-12 w-12 rounded-md bg-primary text-white">
                                <svg class="h-6 w-6" fill="none" viewBox="0 0 24 24" stroke="currentColor">
                                    <path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M12 18h.01M8 21h8a2 2 0 002-2V5a2 2 0 00-2-2H8a2 2 0 00-2 2v14a2 2 0 002 2z" />
                                </svg>
                            </div>
                            <p class="ml-16 text-lg leading-6 font-medium text-gray-900">Mobile Responsive</p>
                            <p class="mt-2 ml-16 text-base text-gray-500">
                                Every generated website is fully responsive and optimized for all devices.
                            </p>
                        </div>
                    </div>
                </div>
            </div>
        </div>

        <!-- CTA Section -->
        <div class="bg-gray-50">
            <div class="max-w-7xl mx-auto py-12 px-4 sm:px-6 lg:py-16 lg:px-8 lg:flex lg:items-center lg:justify-between">
                <h2 class="text-3xl font-extrabold tracking-tight text-gray-900 sm:text-4xl">
                    <span class="block">Ready to generate your website?</span>
                    <span class="block text-primary">Configure your API key to get started.</span>
                </h2>
                <div class="mt-8 flex lg:mt-0 lg:flex-shrink-0">
                    <div class="inline-flex rounded-md shadow">
                        <button class="inline-flex items-center justify-center px-5 py-3 border border-transparent text-base font-medium rounded-md text-white bg-primary hover:bg-blue-700 transition-colors">
                            Upload Image
                        </button>
                    </div>
                </div>
            </div>
        </div>
    </main>

    <!-- Footer -->
    <footer class="bg-white">
        <div class="max-w-7xl mx-auto py-12 px-4 sm:px-6 md:flex md:items-center md:justify-between lg:px-8">
            <div class="mt-8 md:mt-0 md:order-1">
                <p class="text-center text-base text-gray-400">
                    &copy; 2024 AI Website Generator. Demo mode - Configure LLAMA_API_KEY for full functionality.
                </p>
            </div>
        </div>
    </footer>

    <script>
        // Demo interactions
        document.addEventListener('DOMContentLoaded', function() {
            const buttons = document.querySelectorAll('button');
            buttons.forEach(button => {
                button.addEventListener('click', function() {
                    alert('Demo Mode: Configure LLAMA_API_KEY to enable full AI-powered website generation!');
                });
            });
        });
    </script>
</body>
</html>"##;

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
