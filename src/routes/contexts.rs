//! Snapshot and live-state routes.
//!
//! REST surface over the context store: named snapshots are a capped list
//! with CRUD, the live state is a single slot used for one-step revert,
//! and `/api/export` streams the flattened project as JSONL.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::services::store::{ContextUpdate, LiveState, ProjectContext, StoreError};
use crate::services::workspace::{
    ChatMessage, ExportFile, FileNode, FileRelationship, file_relationships, flatten_files, now_ms,
};
use crate::state::AppState;

// =============================================================================
// SNAPSHOTS
// =============================================================================

#[derive(Deserialize)]
pub struct CreateContextBody {
    #[serde(default)]
    pub files: Vec<FileNode>,
    pub active_file_id: Option<Uuid>,
    pub name: Option<String>,
}

/// `POST /api/contexts` — checkpoint the current project.
pub async fn create_context(
    State(state): State<AppState>,
    Json(body): Json<CreateContextBody>,
) -> Result<(StatusCode, Json<ProjectContext>), StatusCode> {
    let context = state
        .store
        .save(body.files, body.active_file_id, body.name.as_deref())
        .map_err(store_error_to_status)?;
    Ok((StatusCode::CREATED, Json(context)))
}

/// `GET /api/contexts` — list snapshots, most recent first.
pub async fn list_contexts(State(state): State<AppState>) -> Json<Vec<ProjectContext>> {
    Json(state.store.list())
}

/// `GET /api/contexts/:id` — fetch one snapshot.
pub async fn get_context(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectContext>, StatusCode> {
    state
        .store
        .get_by_id(id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// `PATCH /api/contexts/:id` — edit snapshot metadata.
pub async fn update_context(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ContextUpdate>,
) -> Result<Json<Value>, StatusCode> {
    let matched = state
        .store
        .update(id, &body)
        .map_err(store_error_to_status)?;
    if !matched {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({ "ok": true })))
}

/// `DELETE /api/contexts/:id` — remove one snapshot.
pub async fn delete_context(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, StatusCode> {
    let removed = state.store.delete(id).map_err(store_error_to_status)?;
    Ok(Json(json!({ "removed": removed })))
}

/// `DELETE /api/contexts` — drop the whole snapshot list.
pub async fn clear_contexts(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    state.store.clear_all().map_err(store_error_to_status)?;
    Ok(Json(json!({ "ok": true })))
}

// =============================================================================
// LIVE STATE
// =============================================================================

#[derive(Deserialize)]
pub struct SaveLiveStateBody {
    #[serde(default)]
    pub files: Vec<FileNode>,
    pub active_file_id: Option<Uuid>,
    #[serde(default)]
    pub chat_messages: Vec<ChatMessage>,
}

/// `PUT /api/live-state` — auto-persist the working state.
pub async fn put_live_state(
    State(state): State<AppState>,
    Json(body): Json<SaveLiveStateBody>,
) -> Result<Json<LiveState>, StatusCode> {
    let saved = state
        .store
        .save_live_state(body.files, body.active_file_id, body.chat_messages)
        .map_err(store_error_to_status)?;
    Ok(Json(saved))
}

/// `GET /api/live-state` — the last auto-persisted state, `null` when none.
pub async fn get_live_state(State(state): State<AppState>) -> Json<Option<LiveState>> {
    Json(state.store.get_live_state())
}

pub(crate) fn store_error_to_status(err: StoreError) -> StatusCode {
    match err {
        StoreError::InvalidActiveFile(_) => StatusCode::BAD_REQUEST,
        StoreError::Io(_) | StoreError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// EXPORT
// =============================================================================

#[derive(Deserialize)]
pub struct ExportBody {
    #[serde(default)]
    pub files: Vec<FileNode>,
}

#[derive(Serialize)]
struct ExportMetaLine {
    #[serde(rename = "type")]
    line_type: &'static str,
    version: u8,
    exported_at_ms: i64,
    file_count: usize,
}

#[derive(Serialize)]
struct ExportFileLine {
    #[serde(rename = "type")]
    line_type: &'static str,
    #[serde(flatten)]
    file: ExportFile,
}

#[derive(Serialize)]
struct ExportRelationshipLine {
    #[serde(rename = "type")]
    line_type: &'static str,
    #[serde(flatten)]
    relationship: FileRelationship,
}

/// `POST /api/export` — download the flattened project as NDJSON/JSONL.
///
/// One meta line, one line per file, then one line per HTML document that
/// links to project CSS/JS files.
pub async fn export_files(Json(body): Json<ExportBody>) -> Result<Response, StatusCode> {
    let files = flatten_files(&body.files);
    let relationships = file_relationships(&body.files);

    let mut lines = Vec::with_capacity(files.len() + relationships.len() + 1);
    let meta =
        ExportMetaLine { line_type: "project_export_meta", version: 1, exported_at_ms: now_ms(), file_count: files.len() };
    let meta_line = serde_json::to_string(&meta).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    lines.push(format!("{meta_line}\n"));

    for file in files {
        let line = ExportFileLine { line_type: "file", file };
        let serialized = serde_json::to_string(&line).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        lines.push(format!("{serialized}\n"));
    }

    for relationship in relationships {
        let line = ExportRelationshipLine { line_type: "relationship", relationship };
        let serialized = serde_json::to_string(&line).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        lines.push(format!("{serialized}\n"));
    }

    let stream = futures::stream::iter(
        lines
            .into_iter()
            .map(|line| Ok::<axum::body::Bytes, std::convert::Infallible>(axum::body::Bytes::from(line))),
    );
    let response_body = axum::body::Body::from_stream(stream);

    Ok((
        [
            (CONTENT_TYPE, "application/x-ndjson; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"project-export.jsonl\""),
        ],
        response_body,
    )
        .into_response())
}

#[cfg(test)]
#[path = "contexts_test.rs"]
mod tests;
