use super::*;
use crate::doc::{Cursor, Note};
use serde_json::json;

fn owner() -> Identity {
    Identity::new("owner-1").with_display_name("Olive").with_email("olive@example.com")
}

async fn seeded() -> (MemoryStore, String) {
    let store = MemoryStore::new();
    let id = store
        .create_workspace(NewWorkspace { name: "Roadmap".into(), owner: owner(), invites: vec!["x@example.com".into()] })
        .await
        .unwrap();
    (store, id)
}

fn note(id: &str) -> Note {
    Note { id: id.into(), x: 1.0, y: 2.0, text: "hi".into(), color: "#fff6a3".into() }
}

// =============================================================================
// create_workspace
// =============================================================================

#[tokio::test]
async fn create_workspace_seeds_owner_and_empty_board() {
    let (store, id) = seeded().await;
    assert!(Uuid::parse_str(&id).is_ok());

    let doc = store.get(&id).await.unwrap().unwrap();
    assert_eq!(doc.name, "Roadmap");
    assert_eq!(doc.owner_id, "owner-1");
    assert_eq!(doc.owner_name, "Olive");
    assert_eq!(doc.owner_email, "olive@example.com");
    assert_eq!(doc.members, ["owner-1"]);
    assert_eq!(doc.member_profiles[0].uid, "owner-1");
    assert_eq!(doc.invites, ["x@example.com"]);
    assert_eq!(doc.updated_by.as_deref(), Some("owner-1"));
    assert!(doc.created_at.is_some());
    assert_eq!(doc.board, Some(BoardState::new()));
}

#[tokio::test]
async fn workspace_ids_are_unique() {
    let store = MemoryStore::new();
    let new = || NewWorkspace { name: "w".into(), owner: owner(), invites: Vec::new() };
    let a = store.create_workspace(new()).await.unwrap();
    let b = store.create_workspace(new()).await.unwrap();
    assert_ne!(a, b);
}

// =============================================================================
// subscribe
// =============================================================================

#[tokio::test]
async fn subscribe_delivers_current_value_immediately() {
    let (store, id) = seeded().await;
    let mut sub = store.subscribe(&id).await.unwrap();
    let first = sub.next().await.unwrap().unwrap().unwrap();
    assert_eq!(first.name, "Roadmap");
}

#[tokio::test]
async fn subscribe_to_missing_workspace_yields_none() {
    let store = MemoryStore::new();
    let mut sub = store.subscribe("nope").await.unwrap();
    assert_eq!(sub.next().await.unwrap(), Ok(None));
}

#[tokio::test]
async fn every_write_is_delivered_to_every_subscriber() {
    let (store, id) = seeded().await;
    let mut a = store.subscribe(&id).await.unwrap();
    let mut b = store.subscribe(&id).await.unwrap();
    a.next().await.unwrap().unwrap();
    b.next().await.unwrap().unwrap();

    let mut board = BoardState::new();
    board.notes.push(note("n1"));
    store.write_board(&id, &board, "editor-a").await.unwrap();

    for sub in [&mut a, &mut b] {
        let doc = sub.next().await.unwrap().unwrap().unwrap();
        assert_eq!(doc.board.unwrap().notes, board.notes);
        assert_eq!(doc.updated_by.as_deref(), Some("editor-a"));
    }
}

#[tokio::test]
async fn slow_subscriber_still_ends_on_latest_write() {
    let (store, id) = seeded().await;
    let mut sub = store.subscribe(&id).await.unwrap();
    sub.next().await.unwrap().unwrap();

    // Far more writes than any queue would hold, none of them read.
    for i in 0..200 {
        let mut board = BoardState::new();
        board.notes.push(note(&format!("n{i}")));
        store.write_board(&id, &board, "writer").await.unwrap();
    }

    let doc = sub.next().await.unwrap().unwrap().unwrap();
    assert_eq!(doc.board.unwrap().notes[0].id, "n199");
    let idle = tokio::time::timeout(std::time::Duration::from_millis(20), sub.next()).await;
    assert!(idle.is_err(), "no stale snapshots queued behind the latest");
}

#[tokio::test]
async fn malformed_document_is_reported_not_dropped() {
    let store = MemoryStore::new();
    store.put_raw("w", json!({"name": 42})).await;
    let mut sub = store.subscribe("w").await.unwrap();
    let err = sub.next().await.unwrap().unwrap_err();
    assert_eq!(err.error_code(), "E_MALFORMED_DOCUMENT");
}

#[tokio::test]
async fn missing_sub_collections_decode_empty() {
    let store = MemoryStore::new();
    store.put_raw("w", json!({"board": {"notes": [{"id": "n", "x": 0, "y": 0, "text": "", "color": "#fff"}]}})).await;
    let doc = store.get("w").await.unwrap().unwrap();
    let board = doc.board.unwrap();
    assert_eq!(board.notes.len(), 1);
    assert!(board.paths.is_empty() && board.cursors.is_empty());
}

#[tokio::test]
async fn document_without_board_decodes_to_none() {
    let store = MemoryStore::new();
    store.put_raw("w", json!({"name": "bare"})).await;
    let doc = store.get("w").await.unwrap().unwrap();
    assert!(doc.board.is_none());
}

// =============================================================================
// writes
// =============================================================================

#[tokio::test]
async fn write_cursors_leaves_collections_alone() {
    let (store, id) = seeded().await;
    let mut board = BoardState::new();
    board.notes.push(note("n1"));
    store.write_board(&id, &board, "a").await.unwrap();

    let cursors: CursorSet =
        [Cursor { id: "b".into(), name: "B".into(), color: "#3f7cff".into(), x: 5.0, y: 6.0 }].into_iter().collect();
    store.write_cursors(&id, &cursors, "b").await.unwrap();

    let doc = store.get(&id).await.unwrap().unwrap();
    let stored = doc.board.unwrap();
    assert_eq!(stored.notes.len(), 1);
    assert_eq!(stored.cursors, cursors);
    assert_eq!(doc.updated_by.as_deref(), Some("b"));
}

#[tokio::test]
async fn write_cursors_creates_board_object_when_absent() {
    let store = MemoryStore::new();
    store.put_raw("w", json!({"name": "bare"})).await;
    store.write_cursors("w", &CursorSet::new(), "u").await.unwrap();
    assert_eq!(store.get("w").await.unwrap().unwrap().board, Some(BoardState::new()));
}

#[tokio::test]
async fn writes_to_missing_workspace_fail() {
    let store = MemoryStore::new();
    let err = store.write_board("ghost", &BoardState::new(), "u").await.unwrap_err();
    assert_eq!(err, StoreError::NotFound("ghost".into()));
}

#[tokio::test]
async fn injected_write_failure_is_backend_error() {
    let (store, id) = seeded().await;
    store.fail_writes(true);
    let err = store.write_board(&id, &BoardState::new(), "u").await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));
    store.fail_writes(false);
    assert!(store.write_board(&id, &BoardState::new(), "u").await.is_ok());
}

#[tokio::test]
async fn last_write_wins() {
    let (store, id) = seeded().await;
    let mut first = BoardState::new();
    first.notes.push(note("from-a"));
    let mut second = BoardState::new();
    second.notes.push(note("from-b"));
    store.write_board(&id, &first, "a").await.unwrap();
    store.write_board(&id, &second, "b").await.unwrap();
    let board = store.get(&id).await.unwrap().unwrap().board.unwrap();
    assert_eq!(board.notes, second.notes);
}

#[test]
fn error_codes_are_stable() {
    assert_eq!(StoreError::NotConfigured.error_code(), "E_NOT_CONFIGURED");
    assert_eq!(StoreError::Closed.error_code(), "E_CLOSED");
    assert_eq!(StoreError::NotFound("w".into()).to_string(), "workspace not found: w");
}
