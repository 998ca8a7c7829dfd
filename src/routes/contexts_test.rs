use super::*;
use crate::services::store::MAX_CONTEXTS;
use crate::services::workspace::MessageRole;
use crate::services::workspace::test_helpers::{file, folder};
use crate::state::test_helpers::test_app_state;

fn sample_files() -> Vec<FileNode> {
    vec![file("index.html", "<html></html>"), folder("assets", vec![file("style.css", "body {}")])]
}

fn message(content: &str) -> ChatMessage {
    ChatMessage {
        id: Uuid::new_v4(),
        content: content.to_string(),
        role: MessageRole::Assistant,
        timestamp: 1_700_000_000_000,
        html_suggestion: None,
    }
}

// =========================================================================
// Snapshot CRUD
// =========================================================================

#[tokio::test]
async fn create_then_get_round_trips() {
    let (state, _dir) = test_app_state();
    let files = sample_files();
    let active = files[0].id;

    let (status, created) = create_context(
        State(state.clone()),
        Json(CreateContextBody { files, active_file_id: Some(active), name: Some("v1".into()) }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let fetched = get_context(State(state), Path(created.0.id)).await.unwrap();
    assert_eq!(fetched.0.name, "v1");
    assert_eq!(fetched.0.active_file_id, Some(active));
    assert_eq!(fetched.0.files.len(), 2);
}

#[tokio::test]
async fn get_unknown_context_is_404() {
    let (state, _dir) = test_app_state();
    let result = get_context(State(state), Path(Uuid::new_v4())).await;
    assert_eq!(result.err(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn dangling_active_file_is_rejected() {
    let (state, _dir) = test_app_state();
    let result = create_context(
        State(state),
        Json(CreateContextBody { files: sample_files(), active_file_id: Some(Uuid::new_v4()), name: None }),
    )
    .await;
    assert_eq!(result.err(), Some(StatusCode::BAD_REQUEST));
}

#[tokio::test]
async fn list_caps_at_ten_snapshots() {
    let (state, _dir) = test_app_state();
    for n in 0..12 {
        create_context(
            State(state.clone()),
            Json(CreateContextBody { files: sample_files(), active_file_id: None, name: Some(format!("ctx {n}")) }),
        )
        .await
        .unwrap();
    }
    let listed = list_contexts(State(state)).await;
    assert_eq!(listed.0.len(), MAX_CONTEXTS);
    assert_eq!(listed.0[0].name, "ctx 11");
    assert!(listed.0.iter().all(|ctx| ctx.name != "ctx 0"));
}

#[tokio::test]
async fn update_edits_and_missing_id_is_404() {
    let (state, _dir) = test_app_state();
    let (_, created) = create_context(
        State(state.clone()),
        Json(CreateContextBody { files: sample_files(), active_file_id: None, name: Some("old".into()) }),
    )
    .await
    .unwrap();

    update_context(
        State(state.clone()),
        Path(created.0.id),
        Json(ContextUpdate { name: Some("new".into()), description: None }),
    )
    .await
    .unwrap();
    let fetched = get_context(State(state.clone()), Path(created.0.id))
        .await
        .unwrap();
    assert_eq!(fetched.0.name, "new");

    let missing = update_context(State(state), Path(Uuid::new_v4()), Json(ContextUpdate::default())).await;
    assert_eq!(missing.err(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn delete_reports_removed_flag() {
    let (state, _dir) = test_app_state();
    let (_, created) = create_context(
        State(state.clone()),
        Json(CreateContextBody { files: sample_files(), active_file_id: None, name: None }),
    )
    .await
    .unwrap();

    let first = delete_context(State(state.clone()), Path(created.0.id))
        .await
        .unwrap();
    assert_eq!(first.0["removed"], true);
    let second = delete_context(State(state), Path(created.0.id)).await.unwrap();
    assert_eq!(second.0["removed"], false);
}

#[tokio::test]
async fn clear_removes_everything() {
    let (state, _dir) = test_app_state();
    for _ in 0..3 {
        create_context(
            State(state.clone()),
            Json(CreateContextBody { files: sample_files(), active_file_id: None, name: None }),
        )
        .await
        .unwrap();
    }
    clear_contexts(State(state.clone())).await.unwrap();
    assert!(list_contexts(State(state)).await.0.is_empty());
}

// =========================================================================
// Live state
// =========================================================================

#[tokio::test]
async fn live_state_round_trips_through_routes() {
    let (state, _dir) = test_app_state();
    let files = sample_files();
    let active = files[0].id;

    put_live_state(
        State(state.clone()),
        Json(SaveLiveStateBody {
            files,
            active_file_id: Some(active),
            chat_messages: vec![message("hello"), message("world")],
        }),
    )
    .await
    .unwrap();

    let restored = get_live_state(State(state)).await;
    let restored = restored.0.expect("live state should exist");
    assert_eq!(restored.active_file_id, Some(active));
    assert_eq!(restored.chat_messages.len(), 2);
}

#[tokio::test]
async fn live_state_on_empty_store_is_null() {
    let (state, _dir) = test_app_state();
    let response = get_live_state(State(state)).await;
    assert!(response.0.is_none());
    assert_eq!(serde_json::to_value(&response.0).unwrap(), serde_json::Value::Null);
}

// =========================================================================
// Export
// =========================================================================

#[tokio::test]
async fn export_streams_meta_and_file_lines() {
    let files = vec![file("index.html", "<html></html>"), folder("assets", vec![file("style.css", "body {}")])];
    let response = export_files(Json(ExportBody { files })).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/x-ndjson; charset=utf-8")
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);

    let meta: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(meta["type"], "project_export_meta");
    assert_eq!(meta["file_count"], 2);

    let first: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(first["type"], "file");
    assert_eq!(first["name"], "index.html");
    let second: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
    assert_eq!(second["name"], "assets/style.css");
}

#[tokio::test]
async fn export_includes_relationship_lines() {
    let html = r#"<html><head><link rel="stylesheet" href="style.css"></head></html>"#;
    let files = vec![file("index.html", html), file("style.css", "body {}")];
    let response = export_files(Json(ExportBody { files })).await.unwrap();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let last: serde_json::Value = serde_json::from_str(text.lines().last().unwrap()).unwrap();
    assert_eq!(last["type"], "relationship");
    assert_eq!(last["html_file"], "index.html");
    assert_eq!(last["linked_css_files"][0], "style.css");
}
