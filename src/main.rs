mod llm;
mod routes;
mod services;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use llm::LlmChat;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");
    let data_dir = std::env::var("SNAPSITE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));

    // Initialize LLM client (non-fatal: demo mode serves fixed fallbacks
    // when the credential is missing).
    let llm: Option<Arc<dyn LlmChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.default_model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured, demo mode active");
            None
        }
    };

    let store = services::store::ContextStore::open(&data_dir).expect("store init failed");
    tracing::info!(dir = %data_dir.display(), "context store opened");

    let state = state::AppState::new(llm, store);
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "snapsite listening");
    axum::serve(listener, app).await.expect("server failed");
}
