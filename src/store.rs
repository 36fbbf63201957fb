//! Document store — the passive shared document every client syncs through.
//!
//! DESIGN
//! ======
//! One document per workspace. Clients never talk to each other; they write
//! whole-board or cursor-only updates into the document and receive the full
//! document back through a subscription after every write, their own included.
//! The store does no merging: the last write wins.
//!
//! `DocumentStore` is the seam a real backend plugs into. `MemoryStore` keeps
//! documents as raw JSON values in process, which is enough for tests, demos
//! and single-process embedding, and lets callers seed malformed documents.
//!
//! ERROR HANDLING
//! ==============
//! A document that fails to decode is delivered to subscribers as
//! `StoreError::Malformed` instead of being dropped, so the session can log it
//! and carry on with its local state.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{RwLock, watch};
use tracing::info;
use uuid::Uuid;

use crate::doc::{BoardState, CursorSet};
use crate::identity::Identity;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No backing store is configured for this client.
    #[error("document store not configured")]
    NotConfigured,

    #[error("workspace not found: {0}")]
    NotFound(String),

    /// The stored document does not decode as a workspace.
    #[error("malformed workspace document: {0}")]
    Malformed(String),

    /// The backend rejected or failed the request.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The subscription or backend connection is gone.
    #[error("store connection closed")]
    Closed,
}

impl StoreError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_NOT_CONFIGURED",
            Self::NotFound(_) => "E_WORKSPACE_NOT_FOUND",
            Self::Malformed(_) => "E_MALFORMED_DOCUMENT",
            Self::Backend(_) => "E_BACKEND",
            Self::Closed => "E_CLOSED",
        }
    }
}

/// Public profile of a workspace member.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberProfile {
    pub uid: String,
    pub name: String,
    pub photo_url: String,
}

/// The workspace document as stored.
///
/// Every field defaults when missing. `board` stays `None` when the document
/// has no board object at all, which subscribers treat as "nothing to apply".
/// Timestamps are unix milliseconds stamped by the store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceDoc {
    pub name: String,
    pub owner_id: String,
    pub owner_name: String,
    pub owner_email: String,
    pub members: Vec<String>,
    pub member_profiles: Vec<MemberProfile>,
    pub invites: Vec<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub updated_by: Option<String>,
    pub board: Option<BoardState>,
}

/// Request to create a workspace owned by `owner`.
#[derive(Debug, Clone)]
pub struct NewWorkspace {
    pub name: String,
    pub owner: Identity,
    pub invites: Vec<String>,
}

/// One delivery on a subscription: the decoded document, `None` if the
/// workspace does not exist, or the reason it could not be read.
pub type Snapshot = Result<Option<WorkspaceDoc>, StoreError>;

/// Stream of snapshots for one workspace. Dropping it unsubscribes.
///
/// Latest-value semantics: a reader that falls behind skips straight to the
/// newest document rather than queueing every intermediate one.
#[derive(Debug)]
pub struct Subscription {
    rx: watch::Receiver<Snapshot>,
}

impl Subscription {
    /// Wrap a receiver. Its current value is delivered by the first
    /// [`Subscription::next`].
    #[must_use]
    pub fn new(mut rx: watch::Receiver<Snapshot>) -> Self {
        rx.mark_changed();
        Self { rx }
    }

    /// Next snapshot, or `None` once the store has hung up.
    pub async fn next(&mut self) -> Option<Snapshot> {
        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().clone()),
            Err(_) => None,
        }
    }
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Backend-neutral document store. Enables mocking in tests.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Subscribe to a workspace document. The current value is delivered
    /// immediately, then again after every write; a reader that falls behind
    /// sees only the newest.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend cannot open the subscription.
    async fn subscribe(&self, workspace_id: &str) -> Result<Subscription, StoreError>;

    /// Overwrite the whole board and stamp `updatedAt` / `updatedBy`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the workspace does not exist, or a
    /// backend error if the write fails.
    async fn write_board(&self, workspace_id: &str, board: &BoardState, editor_id: &str) -> Result<(), StoreError>;

    /// Overwrite only `board.cursors` and stamp `updatedAt` / `updatedBy`.
    ///
    /// # Errors
    ///
    /// Same as [`DocumentStore::write_board`].
    async fn write_cursors(&self, workspace_id: &str, cursors: &CursorSet, editor_id: &str) -> Result<(), StoreError>;

    /// Create a workspace with an empty board and the owner as sole member.
    /// Returns the new workspace id.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the document cannot be written.
    async fn create_workspace(&self, new: NewWorkspace) -> Result<String, StoreError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Default)]
struct StoredWorkspace {
    /// `Value::Null` until the workspace document exists.
    doc: Value,
    subscribers: Vec<watch::Sender<Snapshot>>,
}

impl StoredWorkspace {
    fn snapshot(&self) -> Snapshot {
        if self.doc.is_null() {
            return Ok(None);
        }
        serde_json::from_value::<WorkspaceDoc>(self.doc.clone())
            .map(Some)
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }

    /// Replace the value every live subscriber sees next.
    fn notify(&mut self) {
        let snapshot = self.snapshot();
        self.subscribers.retain(|tx| !tx.is_closed());
        for tx in &self.subscribers {
            tx.send_replace(snapshot.clone());
        }
    }

    fn stamp(&mut self, editor_id: &str) -> Result<&mut serde_json::Map<String, Value>, StoreError> {
        let Value::Object(fields) = &mut self.doc else {
            return Err(StoreError::Malformed("workspace document is not an object".into()));
        };
        fields.insert("updatedAt".into(), Value::from(now_millis()));
        fields.insert("updatedBy".into(), Value::from(editor_id));
        Ok(fields)
    }
}

/// In-process document store.
///
/// Cheap to clone; clones share the same documents.
#[derive(Clone, Default)]
pub struct MemoryStore {
    workspaces: Arc<RwLock<HashMap<String, StoredWorkspace>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `doc` verbatim as the workspace document and notify subscribers.
    pub async fn put_raw(&self, workspace_id: &str, doc: Value) {
        let mut workspaces = self.workspaces.write().await;
        let entry = workspaces.entry(workspace_id.to_owned()).or_default();
        entry.doc = doc;
        entry.notify();
    }

    /// Current decoded document, if the workspace exists and decodes.
    pub async fn get(&self, workspace_id: &str) -> Snapshot {
        let workspaces = self.workspaces.read().await;
        workspaces.get(workspace_id).map_or(Ok(None), StoredWorkspace::snapshot)
    }

    /// Make every subsequent write fail with a backend error (or stop doing so).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    async fn update<F>(&self, workspace_id: &str, editor_id: &str, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut serde_json::Map<String, Value>) -> Result<(), StoreError>,
    {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Backend("write rejected".into()));
        }
        let mut workspaces = self.workspaces.write().await;
        let Some(entry) = workspaces.get_mut(workspace_id).filter(|w| !w.doc.is_null()) else {
            return Err(StoreError::NotFound(workspace_id.to_owned()));
        };
        apply(entry.stamp(editor_id)?)?;
        entry.notify();
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn subscribe(&self, workspace_id: &str) -> Result<Subscription, StoreError> {
        let mut workspaces = self.workspaces.write().await;
        let entry = workspaces.entry(workspace_id.to_owned()).or_default();
        let (tx, rx) = watch::channel(entry.snapshot());
        entry.subscribers.push(tx);
        Ok(Subscription::new(rx))
    }

    async fn write_board(&self, workspace_id: &str, board: &BoardState, editor_id: &str) -> Result<(), StoreError> {
        let board = to_value(board)?;
        self.update(workspace_id, editor_id, |fields| {
            fields.insert("board".into(), board);
            Ok(())
        })
        .await
    }

    async fn write_cursors(&self, workspace_id: &str, cursors: &CursorSet, editor_id: &str) -> Result<(), StoreError> {
        let cursors = to_value(cursors)?;
        self.update(workspace_id, editor_id, |fields| {
            // Updating a nested path creates (or replaces) the parent object.
            let board = fields.entry("board").or_insert(Value::Null);
            if !board.is_object() {
                *board = Value::Object(serde_json::Map::new());
            }
            if let Value::Object(board) = board {
                board.insert("cursors".into(), cursors);
            }
            Ok(())
        })
        .await
    }

    async fn create_workspace(&self, new: NewWorkspace) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = now_millis();
        let owner = &new.owner;
        let owner_name = owner.cursor_name().to_owned();
        let doc = WorkspaceDoc {
            name: new.name,
            owner_id: owner.id.clone(),
            owner_name: owner_name.clone(),
            owner_email: owner.email.clone().unwrap_or_default(),
            members: vec![owner.id.clone()],
            member_profiles: vec![MemberProfile {
                uid: owner.id.clone(),
                name: owner_name,
                photo_url: owner.photo_url.clone().unwrap_or_default(),
            }],
            invites: new.invites,
            created_at: Some(now),
            updated_at: Some(now),
            updated_by: Some(owner.id.clone()),
            board: Some(BoardState::new()),
        };
        self.put_raw(&id, to_value(&doc)?).await;
        info!(workspace_id = %id, owner_id = %owner.id, "workspace created");
        Ok(id)
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Malformed(e.to_string()))
}

fn now_millis() -> i64 {
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(nanos).unwrap_or(i64::MAX)
}
