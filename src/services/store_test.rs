use super::*;
use crate::services::workspace::MessageRole;
use crate::services::workspace::test_helpers::{file, folder};

fn open_store() -> (ContextStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ContextStore::open(dir.path()).expect("store open");
    (store, dir)
}

fn sample_files() -> Vec<FileNode> {
    vec![file("index.html", "<html></html>"), folder("assets", vec![file("style.css", "body {}")])]
}

fn message(n: usize) -> ChatMessage {
    ChatMessage {
        id: Uuid::new_v4(),
        content: format!("message {n}"),
        role: MessageRole::User,
        timestamp: 1_700_000_000_000 + i64::try_from(n).unwrap(),
        html_suggestion: None,
    }
}

// =========================================================================
// Named snapshots
// =========================================================================

#[test]
fn save_then_get_round_trips() {
    let (store, _dir) = open_store();
    let files = sample_files();
    let active = files[0].id;

    let saved = store.save(files.clone(), Some(active), Some("checkpoint")).unwrap();
    let fetched = store.get_by_id(saved.id).expect("snapshot should exist");

    assert_eq!(fetched.name, "checkpoint");
    assert_eq!(fetched.active_file_id, Some(active));
    assert_eq!(fetched.files.len(), files.len());
    assert_eq!(fetched.files[0].id, files[0].id);
    assert_eq!(fetched.files[1].children.as_ref().unwrap().len(), 1);
}

#[test]
fn save_defaults_name_when_absent() {
    let (store, _dir) = open_store();
    let saved = store.save(sample_files(), None, None).unwrap();
    assert!(saved.name.starts_with("Saved Context "));
}

#[test]
fn list_is_most_recent_first() {
    let (store, _dir) = open_store();
    let a = store.save(sample_files(), None, Some("a")).unwrap();
    let b = store.save(sample_files(), None, Some("b")).unwrap();
    let listed = store.list();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, b.id);
    assert_eq!(listed[1].id, a.id);
}

#[test]
fn eleventh_save_evicts_the_oldest() {
    let (store, _dir) = open_store();
    let first = store.save(sample_files(), None, Some("oldest")).unwrap();
    for n in 1..=10 {
        store
            .save(sample_files(), None, Some(&format!("ctx {n}")))
            .unwrap();
    }
    let listed = store.list();
    assert_eq!(listed.len(), MAX_CONTEXTS);
    assert!(listed.iter().all(|ctx| ctx.id != first.id));
    assert_eq!(listed[0].name, "ctx 10");
}

#[test]
fn save_rejects_dangling_active_id() {
    let (store, _dir) = open_store();
    let result = store.save(sample_files(), Some(Uuid::new_v4()), None);
    assert!(matches!(result, Err(StoreError::InvalidActiveFile(_))));
    assert!(store.list().is_empty());
}

#[test]
fn delete_reports_whether_a_removal_occurred() {
    let (store, _dir) = open_store();
    let saved = store.save(sample_files(), None, None).unwrap();
    assert!(store.delete(saved.id).unwrap());
    assert!(!store.delete(saved.id).unwrap());
    assert!(store.get_by_id(saved.id).is_none());
}

#[test]
fn update_edits_metadata_in_place() {
    let (store, _dir) = open_store();
    let saved = store.save(sample_files(), None, Some("before")).unwrap();

    let matched = store
        .update(saved.id, &ContextUpdate { name: Some("after".into()), description: Some("notes".into()) })
        .unwrap();
    assert!(matched);

    let fetched = store.get_by_id(saved.id).unwrap();
    assert_eq!(fetched.name, "after");
    assert_eq!(fetched.description.as_deref(), Some("notes"));
}

#[test]
fn update_unknown_id_matches_nothing() {
    let (store, _dir) = open_store();
    store.save(sample_files(), None, None).unwrap();
    assert!(!store.update(Uuid::new_v4(), &ContextUpdate::default()).unwrap());
}

#[test]
fn clear_all_removes_every_snapshot() {
    let (store, _dir) = open_store();
    store.save(sample_files(), None, None).unwrap();
    store.save(sample_files(), None, None).unwrap();
    store.clear_all().unwrap();
    assert!(store.list().is_empty());
    // Clearing an already-empty store is fine.
    store.clear_all().unwrap();
}

#[test]
fn corrupt_contexts_file_degrades_to_empty_list() {
    let (store, dir) = open_store();
    std::fs::write(dir.path().join("contexts.json"), "{ not json").unwrap();
    assert!(store.list().is_empty());
    // The next save overwrites the corrupt record.
    store.save(sample_files(), None, None).unwrap();
    assert_eq!(store.list().len(), 1);
}

// =========================================================================
// Live state
// =========================================================================

#[test]
fn live_state_empty_store_returns_none() {
    let (store, _dir) = open_store();
    assert!(store.get_live_state().is_none());
}

#[test]
fn live_state_round_trips() {
    let (store, _dir) = open_store();
    let files = sample_files();
    let active = files[0].id;
    let messages = vec![message(1), message(2)];

    store
        .save_live_state(files.clone(), Some(active), messages)
        .unwrap();
    let restored = store.get_live_state().expect("live state should exist");

    assert_eq!(restored.active_file_id, Some(active));
    assert_eq!(restored.files.len(), files.len());
    assert_eq!(restored.chat_messages.len(), 2);
    assert_eq!(restored.chat_messages[1].content, "message 2");
}

#[test]
fn live_state_caps_chat_history_at_fifty() {
    let (store, _dir) = open_store();
    let messages: Vec<ChatMessage> = (0..60).map(message).collect();

    let saved = store.save_live_state(sample_files(), None, messages).unwrap();
    assert_eq!(saved.chat_messages.len(), MAX_LIVE_CHAT_MESSAGES);
    // The most recent tail survives, not the head.
    assert_eq!(saved.chat_messages[0].content, "message 10");
    assert_eq!(saved.chat_messages.last().unwrap().content, "message 59");
}

#[test]
fn live_state_is_last_write_wins() {
    let (store, _dir) = open_store();
    store
        .save_live_state(sample_files(), None, vec![message(1)])
        .unwrap();
    store
        .save_live_state(sample_files(), None, vec![message(2), message(3)])
        .unwrap();
    let restored = store.get_live_state().unwrap();
    assert_eq!(restored.chat_messages.len(), 2);
    assert_eq!(restored.chat_messages[0].content, "message 2");
}

#[test]
fn corrupt_live_state_returns_none() {
    let (store, dir) = open_store();
    std::fs::write(dir.path().join("live_state.json"), "junk").unwrap();
    assert!(store.get_live_state().is_none());
}
